//! Core geographic types and their validation rules.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum latitude representable in Web Mercator (degrees).
pub const MIN_LAT: f64 = -85.05112878;

/// Maximum latitude representable in Web Mercator (degrees).
pub const MAX_LAT: f64 = 85.05112878;

/// Minimum longitude (degrees).
pub const MIN_LON: f64 = -180.0;

/// Maximum longitude (degrees).
pub const MAX_LON: f64 = 180.0;

/// Errors produced when validating geographic input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeoError {
    /// Latitude outside the Web Mercator range.
    #[error("invalid latitude: {0} (must be within ±85.05112878)")]
    InvalidLatitude(f64),

    /// Longitude outside ±180 degrees.
    #[error("invalid longitude: {0} (must be within ±180)")]
    InvalidLongitude(f64),

    /// Bounds enclose zero area.
    #[error("degenerate bounds: north {north}, south {south}, east {east}, west {west}")]
    DegenerateBounds {
        north: f64,
        south: f64,
        east: f64,
        west: f64,
    },
}

/// A geographic point in WGS84 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    /// Latitude in degrees, positive north.
    pub lat: f64,
    /// Longitude in degrees, positive east.
    pub lon: f64,
}

impl LatLng {
    /// Create a new point without validation.
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Validate that the point lies within the Web Mercator range.
    pub fn validate(&self) -> Result<(), GeoError> {
        if !(MIN_LAT..=MAX_LAT).contains(&self.lat) {
            return Err(GeoError::InvalidLatitude(self.lat));
        }
        if !(MIN_LON..=MAX_LON).contains(&self.lon) {
            return Err(GeoError::InvalidLongitude(self.lon));
        }
        Ok(())
    }
}

impl std::fmt::Display for LatLng {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.5}, {:.5})", self.lat, self.lon)
    }
}

/// A geographic bounding rectangle.
///
/// Edges are degrees: `north`/`south` are latitudes, `east`/`west` are
/// longitudes. A rectangle is well-formed when `north > south` and
/// `east > west`; anything else encloses zero area and is rejected before
/// it can reach the offline engine. Antimeridian-crossing rectangles are
/// not supported.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLngBounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl LatLngBounds {
    /// Create bounds from the four edges without validation.
    pub fn new(north: f64, south: f64, east: f64, west: f64) -> Self {
        Self {
            north,
            south,
            east,
            west,
        }
    }

    /// Returns true when the rectangle encloses zero area.
    pub fn is_degenerate(&self) -> bool {
        self.north <= self.south || self.east <= self.west
    }

    /// Validate edge ranges and non-degeneracy.
    pub fn validate(&self) -> Result<(), GeoError> {
        LatLng::new(self.north, self.east).validate()?;
        LatLng::new(self.south, self.west).validate()?;
        if self.is_degenerate() {
            return Err(GeoError::DegenerateBounds {
                north: self.north,
                south: self.south,
                east: self.east,
                west: self.west,
            });
        }
        Ok(())
    }

    /// The centroid of the rectangle.
    pub fn center(&self) -> LatLng {
        LatLng {
            lat: (self.north + self.south) / 2.0,
            lon: (self.east + self.west) / 2.0,
        }
    }

    /// Height of the rectangle in degrees of latitude.
    pub fn height_deg(&self) -> f64 {
        self.north - self.south
    }

    /// Width of the rectangle in degrees of longitude.
    pub fn width_deg(&self) -> f64 {
        self.east - self.west
    }
}

impl std::fmt::Display for LatLngBounds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[N {:.5}, S {:.5}, E {:.5}, W {:.5}]",
            self.north, self.south, self.east, self.west
        )
    }
}

/// A map camera destination: where to point the viewport and how far in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraTarget {
    /// Point the camera centers on.
    pub center: LatLng,
    /// Zoom level for the viewport.
    pub zoom: f64,
}

impl std::fmt::Display for CameraTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} @ z{:.1}", self.center, self.zoom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_is_centroid() {
        // Madrid city center region
        let bounds = LatLngBounds::new(40.42, 40.40, -3.67, -3.69);
        let center = bounds.center();
        assert!((center.lat - 40.41).abs() < 1e-9);
        assert!((center.lon - (-3.68)).abs() < 1e-9);
    }

    #[test]
    fn test_zero_area_bounds_are_degenerate() {
        let flat = LatLngBounds::new(40.0, 40.0, -3.0, -4.0);
        assert!(flat.is_degenerate());

        let inverted = LatLngBounds::new(40.0, 41.0, -3.0, -4.0);
        assert!(inverted.is_degenerate());

        let thin = LatLngBounds::new(41.0, 40.0, -4.0, -4.0);
        assert!(thin.is_degenerate());
    }

    #[test]
    fn test_validate_rejects_degenerate_bounds() {
        let flat = LatLngBounds::new(40.0, 40.0, -3.0, -4.0);
        assert!(matches!(
            flat.validate().unwrap_err(),
            GeoError::DegenerateBounds { .. }
        ));
    }

    #[test]
    fn test_validate_rejects_out_of_range_latitude() {
        let bounds = LatLngBounds::new(89.0, 40.0, -3.0, -4.0);
        assert!(matches!(
            bounds.validate().unwrap_err(),
            GeoError::InvalidLatitude(_)
        ));
    }

    #[test]
    fn test_validate_accepts_well_formed_bounds() {
        let bounds = LatLngBounds::new(40.42, 40.40, -3.67, -3.69);
        assert!(bounds.validate().is_ok());
    }

    #[test]
    fn test_bounds_extent_in_degrees() {
        let bounds = LatLngBounds::new(41.0, 40.0, -3.0, -5.0);
        assert!((bounds.height_deg() - 1.0).abs() < 1e-12);
        assert!((bounds.width_deg() - 2.0).abs() < 1e-12);
    }
}
