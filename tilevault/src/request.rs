//! Region request builder.
//!
//! Derives a [`RegionDefinition`] from the state of a map viewport: the
//! visible bounds become the region bounds, the current camera zoom becomes
//! the minimum cached zoom, and the map's maximum supported zoom caps the
//! pyramid. Validation happens here, before a definition can reach the
//! engine; a degenerate request is rejected up front rather than forwarded.
//!
//! # Example
//!
//! ```
//! use tilevault::geo::LatLngBounds;
//! use tilevault::request::RegionRequest;
//!
//! let definition = RegionRequest::new(
//!     "mapbox://styles/mapbox/streets-v11",
//!     LatLngBounds::new(37.7897, 37.6744, -119.5073, -119.6815),
//! )
//! .zoom(10.0)
//! .max_zoom(20.0)
//! .pixel_ratio(2.0)
//! .build()
//! .unwrap();
//!
//! assert!(definition.min_zoom <= definition.max_zoom);
//! ```

use thiserror::Error;

use crate::geo::{GeoError, LatLngBounds};
use crate::region::RegionDefinition;

/// Default maximum zoom when the viewport does not report one.
pub const DEFAULT_MAX_ZOOM: f64 = 20.0;

/// Default device pixel-density factor.
pub const DEFAULT_PIXEL_RATIO: f32 = 1.0;

/// Errors produced while validating a region request.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RequestError {
    /// The requested bounds are invalid or enclose zero area.
    #[error("invalid region bounds: {0}")]
    InvalidBounds(#[from] GeoError),

    /// A zoom level is not a finite non-negative number.
    #[error("invalid zoom level: {0}")]
    InvalidZoom(f64),

    /// The style reference is empty.
    #[error("empty style URL")]
    EmptyStyleUrl,
}

/// Builder for an offline region definition.
///
/// Captures the viewport inputs and validates them in [`build`]. The
/// produced definition carries the input bounds through exactly and always
/// satisfies `min_zoom <= max_zoom` (the current camera zoom is clamped to
/// the map's maximum, matching the "download from here on down" intent when
/// the camera is already at full zoom).
///
/// [`build`]: RegionRequest::build
#[derive(Debug, Clone)]
pub struct RegionRequest {
    style_url: String,
    bounds: LatLngBounds,
    zoom: f64,
    max_zoom: f64,
    pixel_ratio: f32,
}

impl RegionRequest {
    /// Start a request from a style reference and the visible bounds.
    pub fn new(style_url: impl Into<String>, bounds: LatLngBounds) -> Self {
        Self {
            style_url: style_url.into(),
            bounds,
            zoom: 0.0,
            max_zoom: DEFAULT_MAX_ZOOM,
            pixel_ratio: DEFAULT_PIXEL_RATIO,
        }
    }

    /// Set the current camera zoom (becomes the region's minimum zoom).
    pub fn zoom(mut self, zoom: f64) -> Self {
        self.zoom = zoom;
        self
    }

    /// Set the maximum supported zoom (caps the tile pyramid).
    pub fn max_zoom(mut self, max_zoom: f64) -> Self {
        self.max_zoom = max_zoom;
        self
    }

    /// Set the device pixel-density factor.
    pub fn pixel_ratio(mut self, pixel_ratio: f32) -> Self {
        self.pixel_ratio = pixel_ratio;
        self
    }

    /// Validate the request and produce an immutable definition.
    ///
    /// # Errors
    ///
    /// - [`RequestError::InvalidBounds`] for out-of-range or zero-area
    ///   bounds
    /// - [`RequestError::InvalidZoom`] for non-finite or negative zooms
    /// - [`RequestError::EmptyStyleUrl`] when no style was given
    pub fn build(self) -> Result<RegionDefinition, RequestError> {
        if self.style_url.is_empty() {
            return Err(RequestError::EmptyStyleUrl);
        }
        self.bounds.validate()?;

        for zoom in [self.zoom, self.max_zoom] {
            if !zoom.is_finite() || zoom < 0.0 {
                return Err(RequestError::InvalidZoom(zoom));
            }
        }

        Ok(RegionDefinition {
            style_url: self.style_url,
            bounds: self.bounds,
            min_zoom: self.zoom.min(self.max_zoom),
            max_zoom: self.max_zoom,
            pixel_ratio: self.pixel_ratio,
        })
    }
}
