//! Region identity and tile-pyramid definition.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geo::LatLngBounds;

/// Opaque engine-assigned region identifier.
///
/// Identifiers are stable for the lifetime of a region: a handle obtained
/// from one listing remains valid until the region is deleted, regardless
/// of how the engine's internal ordering changes between listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RegionId(pub u64);

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Definition of an offline tile-pyramid region.
///
/// Describes exactly which tiles belong to a region: every tile of the
/// given style whose coordinates fall inside `bounds` at any zoom level in
/// `min_zoom..=max_zoom`, rendered at `pixel_ratio` device density.
///
/// Definitions are immutable once created. Construct them through
/// [`crate::request::RegionRequest`], which validates the input before the
/// definition can reach an engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionDefinition {
    /// Style the tiles are rendered from (e.g. a `mapbox://styles/...` URL).
    pub style_url: String,

    /// Geographic rectangle covered by the region.
    pub bounds: LatLngBounds,

    /// Lowest zoom level to cache.
    pub min_zoom: f64,

    /// Highest zoom level to cache.
    pub max_zoom: f64,

    /// Device pixel-density factor tiles are sized for.
    pub pixel_ratio: f32,
}

impl fmt::Display for RegionDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} z{:.0}-{:.0} @{}x",
            self.bounds, self.min_zoom, self.max_zoom, self.pixel_ratio
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_id_display() {
        assert_eq!(RegionId(42).to_string(), "#42");
    }

    #[test]
    fn test_definition_serde_roundtrip() {
        let definition = RegionDefinition {
            style_url: "mapbox://styles/mapbox/streets-v11".to_string(),
            bounds: LatLngBounds::new(40.42, 40.40, -3.67, -3.69),
            min_zoom: 10.0,
            max_zoom: 16.0,
            pixel_ratio: 2.0,
        };

        let json = serde_json::to_string(&definition).unwrap();
        let back: RegionDefinition = serde_json::from_str(&json).unwrap();
        assert_eq!(back, definition);
    }
}
