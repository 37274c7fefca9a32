//! Download state and engine-reported progress.

use serde::{Deserialize, Serialize};

/// Whether the engine is allowed to move download traffic for a region.
///
/// A freshly created region is `Inactive`. The engine never starts
/// downloading on its own: the client must explicitly set the region
/// `Active` after creation, otherwise the region sits in storage with
/// zero completed resources forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DownloadState {
    /// Download traffic suspended.
    Inactive,
    /// Download traffic permitted.
    Active,
}

/// Point-in-time download progress for one region.
///
/// Produced exclusively by the engine and pushed to observers; the client
/// never mutates a status, only reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionStatus {
    /// Resources (tiles, style, glyphs) downloaded so far.
    pub completed_resources: u64,

    /// Total resources the region requires, when the engine knows it.
    ///
    /// `None` while the engine has not yet sized the region. The original
    /// wire protocol signals this with a negative sentinel count.
    pub required_resources: Option<u64>,

    /// Whether `required_resources` is an exact count rather than an
    /// estimate that may still grow.
    pub precise: bool,

    /// Whether every required resource has been downloaded.
    pub complete: bool,
}

impl RegionStatus {
    /// An empty status: nothing downloaded, total unknown.
    pub fn empty() -> Self {
        Self {
            completed_resources: 0,
            required_resources: None,
            precise: false,
            complete: false,
        }
    }

    /// Completion percentage in `[0, 100]`.
    ///
    /// Returns `None` while the required count is unknown or zero; a
    /// percentage over an unknown denominator is meaningless and must not
    /// be shown to the user.
    pub fn completion_percentage(&self) -> Option<f64> {
        match self.required_resources {
            Some(required) if required > 0 => {
                Some(100.0 * self.completed_resources as f64 / required as f64)
            }
            _ => None,
        }
    }
}
