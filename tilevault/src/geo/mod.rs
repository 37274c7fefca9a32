//! Geographic primitives
//!
//! Provides the latitude/longitude types shared by region definitions and
//! camera targets: points, bounding rectangles and the validation rules for
//! both. Tile math itself lives inside the offline engine; this module only
//! deals in WGS84 degrees.

mod types;

pub use types::{CameraTarget, GeoError, LatLng, LatLngBounds, MAX_LAT, MAX_LON, MIN_LAT, MIN_LON};
