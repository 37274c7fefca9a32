//! Offline region data model.
//!
//! This module provides the core data structures of the region lifecycle
//! protocol:
//!
//! - **RegionDefinition**: what tiles belong to a region (style, bounds,
//!   zoom range, pixel ratio). Immutable once created.
//! - **RegionId**: opaque, engine-assigned handle. Stable across listing,
//!   unlike a positional index into a region array.
//! - **DownloadState**: whether the engine is allowed to move tiles for a
//!   region. Regions are created `Inactive` and never download until a
//!   client explicitly activates them.
//! - **RegionStatus**: engine-reported download progress, read-only to the
//!   client.
//! - **RegionMetadata**: opaque bytes attached to a region, conventionally
//!   a UTF-8 JSON object carrying the region's display name.
//!
//! # Type Hierarchy
//!
//! ```text
//! RegionDefinition              RegionStatus
//! ├── style_url: String         ├── completed_resources: u64
//! ├── bounds: LatLngBounds      ├── required_resources: Option<u64>
//! ├── min_zoom: f64             ├── precise: bool
//! ├── max_zoom: f64             └── complete: bool
//! └── pixel_ratio: f32
//! ```

mod definition;
mod metadata;
mod status;

pub use definition::{RegionDefinition, RegionId};
pub use metadata::{RegionMetadata, FIELD_REGION_NAME};
pub use status::{DownloadState, RegionStatus};
