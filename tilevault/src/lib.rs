//! TileVault - offline map region management
//!
//! This library implements the client side of the offline-region lifecycle
//! protocol: defining a tile-pyramid region from a map viewport, asking an
//! offline engine to create and download it, observing download progress
//! as an ordered event stream, and listing, re-centering on, and deleting
//! previously downloaded regions.
//!
//! The engine performing the actual tile fetch and storage is an external
//! collaborator behind the [`engine::OfflineEngine`] trait; the in-process
//! [`engine::memory::MemoryEngine`] simulates one for tests and demos.
//!
//! # Overview
//!
//! ```text
//! RegionRequest ──build──► RegionDefinition
//!        │                        │
//!        ▼                        ▼
//! RegionManager ──create/activate──► OfflineEngine
//!        │                        │
//!        ▼                        ▼
//! DownloadObserver ◄──RegionEvent stream── (per region, ordered)
//! ```

pub mod client;
pub mod config;
pub mod engine;
pub mod geo;
pub mod logging;
pub mod progress;
pub mod region;
pub mod request;

pub use client::{ClientError, ClientResult, RegionDownload, RegionManager, RegionSummary};
pub use engine::{EngineError, OfflineEngine, OfflineRegion, RegionEvent, RegionEvents};
pub use geo::{CameraTarget, LatLng, LatLngBounds};
pub use progress::{DownloadObserver, DownloadOutcome};
pub use region::{DownloadState, RegionDefinition, RegionId, RegionMetadata, RegionStatus};
pub use request::{RegionRequest, RequestError};
