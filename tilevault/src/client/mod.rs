//! Region manager client.
//!
//! [`RegionManager`] sits between a UI layer and an [`OfflineEngine`] and
//! implements the client side of the region lifecycle protocol:
//!
//! ```text
//! download_region:  build ──► create ──► subscribe ──► activate
//! list_regions:     list ──► decode metadata names
//! delete_region:    delete (fire-and-forget, one terminal outcome)
//! select_region:    bounds centroid + min zoom (pure)
//! ```
//!
//! The state machine per region, engine-owned and client-observed:
//!
//! ```text
//! Created ──► Active ──► { Downloading ──► Complete | Error }
//! Active | Complete | Error ──► Deleted   (terminal)
//! ```
//!
//! The manager never transitions a region out of `Deleted` and never
//! re-activates a `Complete` region. Engine failures surface as
//! [`ClientError`] with no retry.

mod error;

pub use error::{ClientError, ClientResult};

use std::sync::Arc;

use tracing::{info, warn};

use crate::engine::{OfflineEngine, OfflineRegion, RegionEvents};
use crate::geo::CameraTarget;
use crate::region::{DownloadState, RegionDefinition, RegionId, RegionMetadata};
use crate::request::RegionRequest;

/// An in-flight region download: the stored handle plus its event stream.
pub struct RegionDownload {
    /// Handle to the newly created region.
    pub region: OfflineRegion,
    /// Ordered event stream for this download attempt.
    pub events: RegionEvents,
}

/// A listed region with its decoded display name.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionSummary {
    /// Stable engine-assigned identifier.
    pub id: RegionId,
    /// Display name decoded from stored metadata; `None` for nameless
    /// regions or metadata that does not follow the name convention.
    pub name: Option<String>,
    /// What the region covers.
    pub definition: RegionDefinition,
}

/// Client for managing offline regions against an engine.
pub struct RegionManager {
    engine: Arc<dyn OfflineEngine>,
}

impl RegionManager {
    /// Create a manager over the given engine.
    pub fn new(engine: Arc<dyn OfflineEngine>) -> Self {
        Self { engine }
    }

    /// Create a named region and start downloading it.
    ///
    /// Builds and validates the definition from `request`, encodes the
    /// name metadata (an encoding failure degrades to a nameless region
    /// rather than aborting), creates the region, subscribes to its event
    /// stream and then activates it. Created regions never download until
    /// this activation step, so the caller is guaranteed a subscription
    /// that starts before the first progress event.
    ///
    /// # Errors
    ///
    /// [`ClientError::InvalidRequest`] for degenerate input (never
    /// forwarded to the engine), [`ClientError::CreateFailed`] when the
    /// engine rejects the request. No retry is attempted either way.
    pub async fn download_region(
        &self,
        request: RegionRequest,
        name: &str,
    ) -> ClientResult<RegionDownload> {
        let definition = request.build()?;

        let metadata = RegionMetadata::for_name(name);
        if metadata.is_none() {
            warn!("region will be created without metadata");
        }

        let region = self.engine.create_region(definition, metadata).await?;
        info!("created region {} ({})", region.id, name);

        let events = self.engine.subscribe(region.id).await?;
        self.engine
            .set_download_state(region.id, DownloadState::Active)
            .await?;

        Ok(RegionDownload { region, events })
    }

    /// List stored regions with their decoded names.
    ///
    /// An empty list is the valid "no regions yet" outcome, distinct from
    /// [`ClientError::ListFailed`].
    pub async fn list_regions(&self) -> ClientResult<Vec<RegionSummary>> {
        let regions = self.engine.list_regions().await?;
        Ok(regions
            .into_iter()
            .map(|region| RegionSummary {
                id: region.id,
                name: region.metadata.as_ref().and_then(|m| m.region_name()),
                definition: region.definition,
            })
            .collect())
    }

    /// Permanently delete a region from engine storage.
    ///
    /// On failure the region remains stored and the error is surfaced; no
    /// automatic retry.
    pub async fn delete_region(&self, id: RegionId) -> ClientResult<()> {
        self.engine.delete_region(id).await?;
        info!("deleted region {}", id);
        Ok(())
    }

    /// Derive a camera target that re-points the viewport at a region.
    ///
    /// Pure: centers on the bounds centroid at the region's minimum cached
    /// zoom (the widest view the region has tiles for).
    pub fn select_region(&self, summary: &RegionSummary) -> CameraTarget {
        CameraTarget {
            center: summary.definition.bounds.center(),
            zoom: summary.definition.min_zoom,
        }
    }
}
