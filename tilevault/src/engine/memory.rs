//! In-process offline engine.
//!
//! `MemoryEngine` implements the [`OfflineEngine`] contract without any
//! network or tile storage: downloads are simulated by a per-region tokio
//! task that walks a resource counter to completion at a configurable tick
//! rate. It exists so the CLI and the integration tests can exercise the
//! region lifecycle end to end with the exact event ordering a real
//! engine guarantees:
//!
//! - events for one region are emitted in non-decreasing progress order;
//! - at most one terminal event (`Complete` or `Error`) per stream;
//! - a tile-count limit produces a `LimitExceeded` warning and the
//!   download keeps going;
//! - regions never download until explicitly activated.
//!
//! Failure injection (`fail_creates`, `fail_downloads`) makes the error
//! paths testable without a misbehaving backend.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::store::{load_snapshot, save_snapshot, EngineSnapshot, RegionRecord, StoreError};
use super::{BoxFuture, EngineError, OfflineEngine, OfflineRegion, RegionEvent, RegionEvents};
use crate::region::{DownloadState, RegionDefinition, RegionId, RegionMetadata, RegionStatus};

/// Tuning knobs for the simulated engine.
#[derive(Debug, Clone)]
pub struct MemoryEngineConfig {
    /// Interval between progress ticks.
    pub tick: Duration,

    /// Number of progress steps a download takes.
    pub steps: u64,

    /// Simulated total resource count per region.
    pub required_resources: u64,

    /// Tile-count limit; regions requiring more resources trigger a
    /// `LimitExceeded` warning (non-fatal).
    pub tile_limit: Option<u64>,

    /// Fail every create request with an engine error.
    pub fail_creates: bool,

    /// Abort every download with a terminal `Error` event after a few
    /// progress ticks.
    pub fail_downloads: bool,
}

impl Default for MemoryEngineConfig {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(100),
            steps: 20,
            required_resources: 200,
            tile_limit: None,
            fail_creates: false,
            fail_downloads: false,
        }
    }
}

struct StoredRegion {
    definition: RegionDefinition,
    metadata: Option<RegionMetadata>,
    state: DownloadState,
    status: RegionStatus,
    subscribers: Vec<mpsc::UnboundedSender<RegionEvent>>,
    // True while a download task is alive for this region; reactivation
    // must not spawn a second one.
    downloading: bool,
    // Terminal event of the last download attempt, replayed to late
    // subscribers.
    terminal: Option<RegionEvent>,
}

impl StoredRegion {
    fn handle(&self, id: RegionId) -> OfflineRegion {
        OfflineRegion {
            id,
            definition: self.definition.clone(),
            metadata: self.metadata.clone(),
        }
    }

    /// Send an event to every live subscriber, pruning closed channels.
    fn broadcast(&mut self, event: RegionEvent) {
        self.subscribers
            .retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// Broadcast a terminal event and close every subscriber channel.
    ///
    /// Dropping the senders is what ends the streams; a receiver's next
    /// `recv()` returns `None` instead of pending forever.
    fn finish(&mut self, event: RegionEvent) {
        self.downloading = false;
        self.terminal = Some(event.clone());
        self.broadcast(event);
        self.subscribers.clear();
    }
}

struct Inner {
    config: MemoryEngineConfig,
    regions: DashMap<RegionId, StoredRegion>,
    next_id: AtomicU64,
    snapshot_path: Option<PathBuf>,
    // Serializes snapshot writes; ticks from different regions race otherwise.
    snapshot_lock: Mutex<()>,
}

/// In-process implementation of [`OfflineEngine`].
///
/// Cheap to clone; all clones share the same region store.
#[derive(Clone)]
pub struct MemoryEngine {
    inner: Arc<Inner>,
}

impl MemoryEngine {
    /// Create an engine with default tuning and no persistence.
    pub fn new() -> Self {
        Self::with_config(MemoryEngineConfig::default())
    }

    /// Create an engine with the given tuning and no persistence.
    pub fn with_config(config: MemoryEngineConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                regions: DashMap::new(),
                next_id: AtomicU64::new(1),
                snapshot_path: None,
                snapshot_lock: Mutex::new(()),
            }),
        }
    }

    /// Create an engine whose bookkeeping persists as a JSON snapshot.
    ///
    /// A missing snapshot file starts an empty store. Completed regions
    /// from an earlier run are listed as complete; a region that was
    /// mid-download when the process exited comes back `Inactive` with its
    /// partial status.
    pub fn with_snapshot(
        path: impl Into<PathBuf>,
        config: MemoryEngineConfig,
    ) -> Result<Self, StoreError> {
        let path = path.into();
        let snapshot = load_snapshot(&path)?;

        let regions = DashMap::new();
        for record in snapshot.regions {
            regions.insert(
                record.id,
                StoredRegion {
                    definition: record.definition,
                    metadata: record.metadata,
                    state: DownloadState::Inactive,
                    status: record.status,
                    subscribers: Vec::new(),
                    downloading: false,
                    terminal: record
                        .status
                        .complete
                        .then(|| RegionEvent::Complete(record.status)),
                },
            );
        }

        Ok(Self {
            inner: Arc::new(Inner {
                config,
                regions,
                next_id: AtomicU64::new(snapshot.next_id.max(1)),
                snapshot_path: Some(path),
                snapshot_lock: Mutex::new(()),
            }),
        })
    }

    /// Number of regions currently stored.
    pub fn region_count(&self) -> usize {
        self.inner.regions.len()
    }

    fn persist(&self) {
        let Some(path) = &self.inner.snapshot_path else {
            return;
        };

        let _guard = self.inner.snapshot_lock.lock();
        let mut records: Vec<RegionRecord> = self
            .inner
            .regions
            .iter()
            .map(|entry| RegionRecord {
                id: *entry.key(),
                definition: entry.definition.clone(),
                metadata: entry.metadata.clone(),
                status: entry.status,
            })
            .collect();
        records.sort_by_key(|record| record.id);

        let snapshot = EngineSnapshot {
            next_id: self.inner.next_id.load(Ordering::SeqCst),
            regions: records,
        };
        if let Err(err) = save_snapshot(path, &snapshot) {
            warn!("failed to persist engine snapshot: {}", err);
        }
    }

    /// Drive one region's download to its terminal event.
    async fn run_download(self, id: RegionId) {
        let config = &self.inner.config;
        let required = config.required_resources;
        let steps = config.steps.max(1);
        let chunk = required.div_ceil(steps).max(1);

        // Sizing phase: the total is not known until the first tick. A
        // resumed download re-announces its partial status instead of an
        // empty one so progress stays non-decreasing across suspensions.
        if let Some(mut entry) = self.inner.regions.get_mut(&id) {
            let first_run = entry.status.required_resources.is_none();
            let status = entry.status;
            entry.broadcast(RegionEvent::Progress(status));
            if first_run {
                if let Some(limit) = config.tile_limit {
                    if required > limit {
                        warn!("region {} exceeds tile limit {}", id, limit);
                        entry.broadcast(RegionEvent::LimitExceeded(limit));
                    }
                }
            }
        } else {
            return;
        }

        let mut ticks: u64 = 0;
        loop {
            tokio::time::sleep(config.tick).await;
            ticks += 1;

            let terminal = {
                let Some(mut entry) = self.inner.regions.get_mut(&id) else {
                    // Deleted mid-download; stream already closed with the entry.
                    return;
                };

                if entry.state == DownloadState::Inactive {
                    // Suspended. Exit the task; reactivation spawns a fresh
                    // one that picks up from the stored status.
                    debug!("region {} download suspended", id);
                    entry.downloading = false;
                    return;
                }

                if config.fail_downloads && ticks >= 3 {
                    entry.finish(RegionEvent::Error(
                        "simulated download failure".to_string(),
                    ));
                    true
                } else {
                    let completed =
                        (entry.status.completed_resources + chunk).min(required);
                    let status = RegionStatus {
                        completed_resources: completed,
                        required_resources: Some(required),
                        precise: true,
                        complete: completed == required,
                    };
                    entry.status = status;

                    if status.complete {
                        debug!("region {} download complete", id);
                        entry.finish(RegionEvent::Complete(status));
                        true
                    } else {
                        entry.broadcast(RegionEvent::Progress(status));
                        false
                    }
                }
            };

            if terminal {
                self.persist();
                return;
            }
        }
    }
}

impl Default for MemoryEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl OfflineEngine for MemoryEngine {
    fn create_region(
        &self,
        definition: RegionDefinition,
        metadata: Option<RegionMetadata>,
    ) -> BoxFuture<'_, Result<OfflineRegion, EngineError>> {
        Box::pin(async move {
            if self.inner.config.fail_creates {
                return Err(EngineError::CreateFailed(
                    "simulated create failure".to_string(),
                ));
            }

            let id = RegionId(self.inner.next_id.fetch_add(1, Ordering::SeqCst));
            let stored = StoredRegion {
                definition,
                metadata,
                state: DownloadState::Inactive,
                status: RegionStatus::empty(),
                subscribers: Vec::new(),
                downloading: false,
                terminal: None,
            };
            let handle = stored.handle(id);
            self.inner.regions.insert(id, stored);
            debug!("created region {}", id);

            self.persist();
            Ok(handle)
        })
    }

    fn list_regions(&self) -> BoxFuture<'_, Result<Vec<OfflineRegion>, EngineError>> {
        Box::pin(async move {
            let mut regions: Vec<OfflineRegion> = self
                .inner
                .regions
                .iter()
                .map(|entry| entry.handle(*entry.key()))
                .collect();
            regions.sort_by_key(|region| region.id);
            Ok(regions)
        })
    }

    fn set_download_state(
        &self,
        id: RegionId,
        state: DownloadState,
    ) -> BoxFuture<'_, Result<(), EngineError>> {
        Box::pin(async move {
            let start_download = {
                let mut entry = self
                    .inner
                    .regions
                    .get_mut(&id)
                    .ok_or(EngineError::UnknownRegion(id))?;

                let starting = state == DownloadState::Active
                    && !entry.downloading
                    && !entry.status.complete;
                entry.state = state;
                if starting {
                    entry.downloading = true;
                    // A retry after a failed attempt starts a fresh stream.
                    entry.terminal = None;
                }
                starting
            };

            if start_download {
                debug!("region {} activated", id);
                tokio::spawn(self.clone().run_download(id));
            }
            Ok(())
        })
    }

    fn subscribe(&self, id: RegionId) -> BoxFuture<'_, Result<RegionEvents, EngineError>> {
        Box::pin(async move {
            let mut entry = self
                .inner
                .regions
                .get_mut(&id)
                .ok_or(EngineError::UnknownRegion(id))?;

            let (tx, rx) = mpsc::unbounded_channel();
            match entry.terminal.clone() {
                Some(terminal) => {
                    // Late subscriber to a finished download still gets the
                    // terminal; dropping the sender ends the stream there.
                    let _ = tx.send(terminal);
                }
                None => entry.subscribers.push(tx),
            }
            Ok(rx)
        })
    }

    fn delete_region(&self, id: RegionId) -> BoxFuture<'_, Result<(), EngineError>> {
        Box::pin(async move {
            if self.inner.regions.remove(&id).is_none() {
                return Err(EngineError::DeleteFailed(format!(
                    "region {} not found in storage",
                    id
                )));
            }
            debug!("deleted region {}", id);
            self.persist();
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::LatLngBounds;

    fn test_definition() -> RegionDefinition {
        RegionDefinition {
            style_url: "mapbox://styles/mapbox/streets-v11".to_string(),
            bounds: LatLngBounds::new(40.42, 40.40, -3.67, -3.69),
            min_zoom: 14.0,
            max_zoom: 18.0,
            pixel_ratio: 1.0,
        }
    }

    fn fast_config() -> MemoryEngineConfig {
        MemoryEngineConfig {
            tick: Duration::from_millis(1),
            steps: 4,
            required_resources: 200,
            ..MemoryEngineConfig::default()
        }
    }

    #[tokio::test]
    async fn test_created_region_is_inactive_and_empty() {
        let engine = MemoryEngine::with_config(fast_config());
        let region = engine
            .create_region(test_definition(), None)
            .await
            .unwrap();

        // No activation, no download traffic: status stays empty.
        tokio::time::sleep(Duration::from_millis(20)).await;
        let listed = engine.list_regions().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, region.id);

        let mut events = engine.subscribe(region.id).await.unwrap();
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_download_runs_to_completion_in_order() {
        let engine = MemoryEngine::with_config(fast_config());
        let region = engine
            .create_region(test_definition(), None)
            .await
            .unwrap();
        let mut events = engine.subscribe(region.id).await.unwrap();
        engine
            .set_download_state(region.id, DownloadState::Active)
            .await
            .unwrap();

        let mut last_completed = 0;
        let mut terminal = None;
        while let Some(event) = events.recv().await {
            match event {
                RegionEvent::Progress(status) => {
                    assert!(status.completed_resources >= last_completed);
                    last_completed = status.completed_resources;
                }
                other => {
                    terminal = Some(other);
                    break;
                }
            }
        }

        match terminal {
            Some(RegionEvent::Complete(status)) => {
                assert!(status.complete);
                assert_eq!(status.completed_resources, 200);
                assert_eq!(status.completion_percentage(), Some(100.0));
            }
            other => panic!("expected Complete, got {:?}", other),
        }
        // Stream ends after the terminal event.
        assert!(events.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_tile_limit_warning_is_not_terminal() {
        let engine = MemoryEngine::with_config(MemoryEngineConfig {
            tile_limit: Some(50),
            ..fast_config()
        });
        let region = engine
            .create_region(test_definition(), None)
            .await
            .unwrap();
        let mut events = engine.subscribe(region.id).await.unwrap();
        engine
            .set_download_state(region.id, DownloadState::Active)
            .await
            .unwrap();

        let mut saw_limit = false;
        let mut saw_complete = false;
        while let Some(event) = events.recv().await {
            match event {
                RegionEvent::LimitExceeded(limit) => {
                    assert_eq!(limit, 50);
                    saw_limit = true;
                }
                RegionEvent::Complete(_) => {
                    saw_complete = true;
                    break;
                }
                RegionEvent::Progress(_) => {}
                RegionEvent::Error(err) => panic!("unexpected error: {}", err),
            }
        }
        assert!(saw_limit, "limit warning should have been emitted");
        assert!(saw_complete, "download should have completed past the warning");
    }

    #[tokio::test]
    async fn test_injected_download_failure_is_terminal_and_keeps_region() {
        let engine = MemoryEngine::with_config(MemoryEngineConfig {
            fail_downloads: true,
            ..fast_config()
        });
        let region = engine
            .create_region(test_definition(), None)
            .await
            .unwrap();
        let mut events = engine.subscribe(region.id).await.unwrap();
        engine
            .set_download_state(region.id, DownloadState::Active)
            .await
            .unwrap();

        let mut terminal = None;
        while let Some(event) = events.recv().await {
            if event.is_terminal() {
                terminal = Some(event);
                break;
            }
        }
        assert!(matches!(terminal, Some(RegionEvent::Error(_))));
        // The error is terminal: the stream ends rather than pending.
        assert!(events.recv().await.is_none());

        // The failed download does not alter stored region state.
        let listed = engine.list_regions().await.unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn test_late_subscriber_after_failure_gets_replayed_error() {
        let engine = MemoryEngine::with_config(MemoryEngineConfig {
            fail_downloads: true,
            ..fast_config()
        });
        let region = engine
            .create_region(test_definition(), None)
            .await
            .unwrap();
        let mut events = engine.subscribe(region.id).await.unwrap();
        engine
            .set_download_state(region.id, DownloadState::Active)
            .await
            .unwrap();
        while let Some(event) = events.recv().await {
            if event.is_terminal() {
                break;
            }
        }

        // A subscriber attaching after the failure sees the terminal error
        // and an immediately ended stream, not a channel that never yields.
        let mut late = engine.subscribe(region.id).await.unwrap();
        assert!(matches!(late.recv().await, Some(RegionEvent::Error(_))));
        assert!(late.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_suspend_parks_download_and_resume_completes_it() {
        let engine = MemoryEngine::with_config(fast_config());
        let region = engine
            .create_region(test_definition(), None)
            .await
            .unwrap();
        let mut events = engine.subscribe(region.id).await.unwrap();
        engine
            .set_download_state(region.id, DownloadState::Active)
            .await
            .unwrap();

        // Let a little progress through, then suspend.
        let first = events.recv().await.unwrap();
        assert!(matches!(first, RegionEvent::Progress(_)));
        engine
            .set_download_state(region.id, DownloadState::Inactive)
            .await
            .unwrap();

        // Drain anything already in flight, then verify silence: the task
        // has exited instead of ticking while suspended.
        tokio::time::sleep(Duration::from_millis(20)).await;
        while events.try_recv().is_ok() {}
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(events.try_recv().is_err());

        // Reactivation spawns a fresh task that finishes the download.
        engine
            .set_download_state(region.id, DownloadState::Active)
            .await
            .unwrap();
        let mut terminal = None;
        while let Some(event) = events.recv().await {
            if event.is_terminal() {
                terminal = Some(event);
            }
        }
        match terminal {
            Some(RegionEvent::Complete(status)) => {
                assert_eq!(status.completed_resources, 200)
            }
            other => panic!("expected Complete, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_failure_injection() {
        let engine = MemoryEngine::with_config(MemoryEngineConfig {
            fail_creates: true,
            ..fast_config()
        });
        let result = engine.create_region(test_definition(), None).await;
        assert!(matches!(result, Err(EngineError::CreateFailed(_))));
        assert_eq!(engine.region_count(), 0);
    }

    #[tokio::test]
    async fn test_delete_removes_region_from_listing() {
        let engine = MemoryEngine::with_config(fast_config());
        let keep = engine
            .create_region(test_definition(), None)
            .await
            .unwrap();
        let gone = engine
            .create_region(test_definition(), None)
            .await
            .unwrap();

        engine.delete_region(gone.id).await.unwrap();

        let listed = engine.list_regions().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, keep.id);
    }

    #[tokio::test]
    async fn test_delete_unknown_region_is_an_error() {
        let engine = MemoryEngine::with_config(fast_config());
        let result = engine.delete_region(RegionId(99)).await;
        assert!(matches!(result, Err(EngineError::DeleteFailed(_))));
    }

    #[tokio::test]
    async fn test_empty_listing_is_success() {
        let engine = MemoryEngine::new();
        let listed = engine.list_regions().await.unwrap();
        assert!(listed.is_empty());
    }

    #[tokio::test]
    async fn test_reactivating_complete_region_is_a_noop() {
        let engine = MemoryEngine::with_config(fast_config());
        let region = engine
            .create_region(test_definition(), None)
            .await
            .unwrap();
        let mut events = engine.subscribe(region.id).await.unwrap();
        engine
            .set_download_state(region.id, DownloadState::Active)
            .await
            .unwrap();
        while let Some(event) = events.recv().await {
            if event.is_terminal() {
                break;
            }
        }

        // No new download task, no new events beyond the replayed terminal.
        engine
            .set_download_state(region.id, DownloadState::Active)
            .await
            .unwrap();
        let mut late = engine.subscribe(region.id).await.unwrap();
        let first = late.recv().await.unwrap();
        assert!(matches!(first, RegionEvent::Complete(_)));
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(late.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_snapshot_persists_across_engines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("regions.json");

        let engine = MemoryEngine::with_snapshot(&path, fast_config()).unwrap();
        let region = engine
            .create_region(test_definition(), RegionMetadata::for_name("Madrid"))
            .await
            .unwrap();
        let mut events = engine.subscribe(region.id).await.unwrap();
        engine
            .set_download_state(region.id, DownloadState::Active)
            .await
            .unwrap();
        while let Some(event) = events.recv().await {
            if event.is_terminal() {
                break;
            }
        }

        let reopened = MemoryEngine::with_snapshot(&path, fast_config()).unwrap();
        let listed = reopened.list_regions().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, region.id);
        assert_eq!(
            listed[0].metadata.as_ref().and_then(|m| m.region_name()),
            Some("Madrid".to_string())
        );
    }
}
