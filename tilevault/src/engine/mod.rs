//! Offline engine boundary.
//!
//! The [`OfflineEngine`] trait is the only interface the client touches.
//! The real engine (the tile downloader, its disk database, network retry)
//! lives behind this boundary and owns all persisted region state; the
//! client holds nothing but transient [`OfflineRegion`] handles.
//!
//! # Request model
//!
//! Every operation is an asynchronous request with exactly one terminal
//! outcome, success or an engine-supplied error. Requests cannot be
//! cancelled once issued and are never retried by this crate. Progress for
//! a downloading region arrives as a stream of tagged [`RegionEvent`]s
//! over a per-region channel:
//!
//! ```text
//! client ──create_region──► engine
//! client ──set_download_state(Active)──► engine
//! client ◄──Progress... ◄──[LimitExceeded]... ◄──Complete│Error── engine
//! ```
//!
//! Events for a single region arrive in non-decreasing progress order and
//! end with exactly one terminal event. No ordering is guaranteed across
//! different regions.
//!
//! # Dyn Compatibility
//!
//! The trait uses `Pin<Box<dyn Future>>` for async methods so clients can
//! hold an `Arc<dyn OfflineEngine>` and swap engines (the in-process
//! [`memory::MemoryEngine`] in tests and demos, a real engine in an
//! application).

pub mod memory;
pub mod store;

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;
use tokio::sync::mpsc;

use crate::region::{DownloadState, RegionDefinition, RegionId, RegionMetadata, RegionStatus};

/// Boxed future type for dyn-compatible async methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Errors reported by the offline engine.
///
/// Engine errors are terminal for the specific request that produced them
/// and are surfaced to the user as-is; nothing in this crate retries them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Region creation failed.
    #[error("engine failed to create region: {0}")]
    CreateFailed(String),

    /// Region listing failed.
    #[error("engine failed to list regions: {0}")]
    ListFailed(String),

    /// Region deletion failed; the region remains in engine storage.
    #[error("engine failed to delete region: {0}")]
    DeleteFailed(String),

    /// The region id does not exist in engine storage.
    #[error("unknown region {0}")]
    UnknownRegion(RegionId),
}

/// One event on a region's download stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionEvent {
    /// Progress update. Non-terminal; progress never decreases.
    Progress(RegionStatus),

    /// The region exceeds the engine's tile-count limit. A warning, not a
    /// terminal error: the download keeps going.
    LimitExceeded(u64),

    /// The download attempt failed. Terminal for this stream; the region
    /// itself stays in engine storage untouched.
    Error(String),

    /// Every required resource is downloaded. Terminal.
    Complete(RegionStatus),
}

impl RegionEvent {
    /// Whether this event ends the stream for its region.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Error(_) | Self::Complete(_))
    }
}

/// Receiving end of one region's ordered event stream.
pub type RegionEvents = mpsc::UnboundedReceiver<RegionEvent>;

/// Transient client-side handle to a stored region.
///
/// The engine owns the region; this handle only carries the identity and
/// the immutable facts a client needs without another round trip.
#[derive(Debug, Clone, PartialEq)]
pub struct OfflineRegion {
    /// Engine-assigned stable identifier.
    pub id: RegionId,
    /// What tiles the region covers.
    pub definition: RegionDefinition,
    /// Application metadata attached at creation, if any.
    pub metadata: Option<RegionMetadata>,
}

/// Asynchronous offline-tile engine interface.
///
/// All implementations must be `Send + Sync`; callbacks are replaced by
/// request futures and per-region event channels.
pub trait OfflineEngine: Send + Sync {
    /// Create a region for `definition`, attaching optional metadata.
    ///
    /// The new region is `Inactive`: no download traffic moves until the
    /// caller explicitly activates it via [`set_download_state`].
    ///
    /// [`set_download_state`]: OfflineEngine::set_download_state
    fn create_region(
        &self,
        definition: RegionDefinition,
        metadata: Option<RegionMetadata>,
    ) -> BoxFuture<'_, Result<OfflineRegion, EngineError>>;

    /// List every region currently in engine storage.
    ///
    /// An empty vector is the valid "no regions yet" outcome, distinct
    /// from `Err`.
    fn list_regions(&self) -> BoxFuture<'_, Result<Vec<OfflineRegion>, EngineError>>;

    /// Allow or suspend download traffic for a region.
    fn set_download_state(
        &self,
        id: RegionId,
        state: DownloadState,
    ) -> BoxFuture<'_, Result<(), EngineError>>;

    /// Subscribe to a region's ordered event stream.
    fn subscribe(&self, id: RegionId) -> BoxFuture<'_, Result<RegionEvents, EngineError>>;

    /// Permanently remove a region from engine storage.
    ///
    /// On failure the region remains stored; the caller decides whether to
    /// try again.
    fn delete_region(&self, id: RegionId) -> BoxFuture<'_, Result<(), EngineError>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_events() {
        assert!(RegionEvent::Error("boom".to_string()).is_terminal());
        assert!(RegionEvent::Complete(RegionStatus::empty()).is_terminal());
        assert!(!RegionEvent::Progress(RegionStatus::empty()).is_terminal());
        assert!(!RegionEvent::LimitExceeded(6000).is_terminal());
    }

    #[test]
    fn test_engine_error_display() {
        let err = EngineError::CreateFailed("storage full".to_string());
        assert_eq!(
            err.to_string(),
            "engine failed to create region: storage full"
        );
        assert_eq!(
            EngineError::UnknownRegion(RegionId(7)).to_string(),
            "unknown region #7"
        );
    }
}
