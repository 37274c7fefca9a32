//! Opaque region metadata and the name-blob convention.
//!
//! The engine treats metadata as arbitrary bytes it stores alongside a
//! region. By convention this client writes a UTF-8 JSON object with a
//! single field carrying the region's display name:
//!
//! ```text
//! {"FIELD_REGION_NAME": "Yosemite National Park"}
//! ```
//!
//! Decoding is tolerant: bytes that are not valid UTF-8 JSON, or JSON
//! without the name field, simply yield no name. A nameless region is a
//! valid region and callers must render it as such rather than fail.

use serde::{Deserialize, Serialize};
use tracing::error;

/// JSON field holding the human-readable region name.
pub const FIELD_REGION_NAME: &str = "FIELD_REGION_NAME";

#[derive(Serialize, Deserialize)]
struct NameBlob {
    #[serde(rename = "FIELD_REGION_NAME")]
    name: String,
}

/// Opaque bytes attached to a region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionMetadata(Vec<u8>);

impl RegionMetadata {
    /// Wrap raw metadata bytes as received from the engine.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Encode a display name into the conventional JSON blob.
    ///
    /// Encoding a well-formed string cannot fail in practice. If it ever
    /// does, the failure is logged and `None` is returned: the region is
    /// created without metadata instead of the request being aborted.
    pub fn for_name(name: &str) -> Option<Self> {
        match serde_json::to_vec(&NameBlob {
            name: name.to_string(),
        }) {
            Ok(bytes) => Some(Self(bytes)),
            Err(err) => {
                error!("failed to encode region metadata: {}", err);
                None
            }
        }
    }

    /// Decode the display name back out of the blob.
    ///
    /// Returns `None` for metadata that does not follow the name-blob
    /// convention. Never panics on malformed bytes.
    pub fn region_name(&self) -> Option<String> {
        serde_json::from_slice::<NameBlob>(&self.0)
            .ok()
            .map(|blob| blob.name)
    }

    /// The raw bytes as handed to the engine.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}
