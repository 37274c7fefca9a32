//! Download progress observation.
//!
//! [`DownloadObserver`] consumes one region's ordered event stream and
//! folds it into the latest observed [`RegionStatus`]. It is deliberately
//! policy-free: a terminal `Error` does not delete the region or retry the
//! download, it is just recorded for the caller to act on. Limit warnings
//! are logged and counted, never treated as failure.
//!
//! # Example
//!
//! ```ignore
//! use tilevault::progress::{DownloadObserver, DownloadOutcome};
//!
//! let download = manager.download_region(request, "Yosemite").await?;
//! let mut observer = DownloadObserver::new(download.events);
//! while let Some(_event) = observer.next_event().await {
//!     if let Some(pct) = observer.percent_complete() {
//!         println!("{:.1}%", pct);
//!     }
//! }
//! match observer.outcome() {
//!     Some(DownloadOutcome::Completed(_)) => println!("done"),
//!     Some(DownloadOutcome::Failed(reason)) => eprintln!("failed: {reason}"),
//!     None => eprintln!("stream closed without terminal event"),
//! }
//! ```

use tracing::{debug, warn};

use crate::engine::{RegionEvent, RegionEvents};
use crate::region::RegionStatus;

/// Terminal result of one download attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum DownloadOutcome {
    /// Every required resource was downloaded.
    Completed(RegionStatus),
    /// The attempt failed with an engine-reported reason. The region
    /// itself remains in engine storage.
    Failed(String),
}

/// Observer for a single region's download.
pub struct DownloadObserver {
    events: RegionEvents,
    status: RegionStatus,
    outcome: Option<DownloadOutcome>,
    limit_warnings: u64,
}

impl DownloadObserver {
    /// Observe the given event stream.
    pub fn new(events: RegionEvents) -> Self {
        Self {
            events,
            status: RegionStatus::empty(),
            outcome: None,
            limit_warnings: 0,
        }
    }

    /// Pull the next event, folding it into the observed status.
    ///
    /// Returns `None` once the stream closes. A terminal event is
    /// returned like any other and recorded in [`outcome`].
    ///
    /// [`outcome`]: DownloadObserver::outcome
    pub async fn next_event(&mut self) -> Option<RegionEvent> {
        let event = self.events.recv().await?;
        match &event {
            RegionEvent::Progress(status) => {
                self.status = *status;
            }
            RegionEvent::LimitExceeded(limit) => {
                warn!("tile count limit exceeded: {}", limit);
                self.limit_warnings += 1;
            }
            RegionEvent::Error(reason) => {
                self.outcome = Some(DownloadOutcome::Failed(reason.clone()));
            }
            RegionEvent::Complete(status) => {
                debug!("region downloaded successfully");
                self.status = *status;
                self.outcome = Some(DownloadOutcome::Completed(*status));
            }
        }
        Some(event)
    }

    /// Latest engine-reported status.
    pub fn status(&self) -> RegionStatus {
        self.status
    }

    /// Completion percentage, when the required count is known.
    pub fn percent_complete(&self) -> Option<f64> {
        self.status.completion_percentage()
    }

    /// Number of non-fatal limit warnings seen so far.
    pub fn limit_warnings(&self) -> u64 {
        self.limit_warnings
    }

    /// Terminal outcome, once a terminal event has been observed.
    pub fn outcome(&self) -> Option<&DownloadOutcome> {
        self.outcome.as_ref()
    }

    /// Drain the stream until its terminal event.
    ///
    /// Returns `None` if the stream closes without one (the region was
    /// deleted while downloading).
    pub async fn run_to_completion(mut self) -> Option<DownloadOutcome> {
        while let Some(event) = self.next_event().await {
            if event.is_terminal() {
                break;
            }
        }
        self.outcome
    }
}
