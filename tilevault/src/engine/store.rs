//! Snapshot persistence for the in-process engine.
//!
//! The simulated engine keeps its region bookkeeping private, the same way
//! a real engine owns its tile database. A snapshot is a single JSON file
//! holding every stored region and the id counter, written after any
//! mutation and loaded at startup. Tile payloads are never persisted; only
//! the bookkeeping the region lifecycle needs.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::region::{RegionDefinition, RegionId, RegionMetadata, RegionStatus};

/// Errors reading or writing an engine snapshot.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem error on the snapshot path.
    #[error("snapshot I/O error: {0}")]
    Io(#[from] io::Error),

    /// The snapshot file exists but does not parse.
    #[error("malformed snapshot: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// One stored region as persisted in a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionRecord {
    pub id: RegionId,
    pub definition: RegionDefinition,
    pub metadata: Option<RegionMetadata>,
    pub status: RegionStatus,
}

/// Full persisted state of the in-process engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    /// Next region id to assign. Ids are never reused within a store.
    pub next_id: u64,
    /// Every stored region.
    pub regions: Vec<RegionRecord>,
}

/// Load a snapshot from `path`.
///
/// A missing file is the empty store, not an error; a present but
/// malformed file surfaces [`StoreError::Malformed`].
pub fn load_snapshot(path: &Path) -> Result<EngineSnapshot, StoreError> {
    match fs::read(path) {
        Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(EngineSnapshot::default()),
        Err(err) => Err(err.into()),
    }
}

/// Write a snapshot to `path`, creating parent directories as needed.
pub fn save_snapshot(path: &Path, snapshot: &EngineSnapshot) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let bytes = serde_json::to_vec_pretty(snapshot)?;
    fs::write(path, bytes)?;
    Ok(())
}
