//! # Geographic Utilities
//!
//! Geographic computations used by the loader and the viewport fitting.
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`haversine_distance`] | Great-circle distance between two GPS points |
//! | [`polyline_length`] | Total length of a GPS track in meters |
//! | [`tracks_bounds`] | Bounding box of any number of tracks |
//! | [`mercator_x`] / [`mercator_y`] | Normalized Web-Mercator world coordinates |
//! | [`mercator_center`] | Center of a bounding box in Web-Mercator space |
//! | [`fit_zoom`] | Zoom that fits a bounding box into a fixed display size |
//!
//! ## Example
//!
//! ```rust
//! use run_heatmap::{GpsPoint, ViewportConfig, geo_utils};
//!
//! let track = vec![
//!     GpsPoint::new(41.8902, 12.4922), // Colosseum
//!     GpsPoint::new(41.9029, 12.4534), // St. Peter's
//! ];
//!
//! let bounds = geo_utils::tracks_bounds([track.as_slice()]).unwrap();
//! let zoom = geo_utils::fit_zoom(&bounds, &ViewportConfig::default());
//! assert!(zoom > 10.0 && zoom < 16.0);
//! ```
//!
//! ## Web-Mercator
//!
//! Zoom levels follow the web map convention: at zoom `z` the whole world is
//! `512 * 2^z` pixels wide. Latitudes are clamped to ±85.0511° (the Mercator
//! square) before projecting.

use std::f64::consts::PI;

use geo::{BoundingRect, Distance, Haversine, MultiPoint, Point};

use crate::config::ViewportConfig;
use crate::{Bounds, GpsPoint};

/// Width of the world in pixels at zoom 0.
pub const TILE_SIZE: f64 = 512.0;

/// Latitude limit of the Web-Mercator projection.
pub const MAX_MERCATOR_LAT: f64 = 85.051_128_779_806_59;

/// Extents below this (in normalized world units) count as a single location.
const DEGENERATE_EXTENT: f64 = 1e-12;

// =============================================================================
// Distance Functions
// =============================================================================

/// Great-circle distance between two GPS points in meters.
///
/// ```rust
/// use run_heatmap::{GpsPoint, geo_utils};
///
/// let rome = GpsPoint::new(41.9028, 12.4964);
/// let oslo = GpsPoint::new(59.9139, 10.7522);
/// let distance = geo_utils::haversine_distance(&rome, &oslo);
/// assert!((distance - 2_007_000.0).abs() < 20_000.0);
/// ```
#[inline]
pub fn haversine_distance(p1: &GpsPoint, p2: &GpsPoint) -> f64 {
    let point1 = Point::new(p1.longitude, p1.latitude);
    let point2 = Point::new(p2.longitude, p2.latitude);
    Haversine::distance(point1, point2)
}

/// Total length of a GPS track in meters. Empty or single-point tracks are 0.
pub fn polyline_length(points: &[GpsPoint]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }

    points
        .windows(2)
        .map(|w| haversine_distance(&w[0], &w[1]))
        .sum()
}

// =============================================================================
// Bounding Box Functions
// =============================================================================

/// Bounding box covering every coordinate of every track.
///
/// Returns `None` when there are no coordinates at all.
pub fn tracks_bounds<'a, I>(tracks: I) -> Option<Bounds>
where
    I: IntoIterator<Item = &'a [GpsPoint]>,
{
    let points: MultiPoint<f64> = tracks
        .into_iter()
        .flat_map(|track| track.iter())
        .map(|p| Point::new(p.longitude, p.latitude))
        .collect();

    let rect = points.bounding_rect()?;
    Some(Bounds {
        min_lat: rect.min().y,
        max_lat: rect.max().y,
        min_lng: rect.min().x,
        max_lng: rect.max().x,
    })
}

// =============================================================================
// Web-Mercator
// =============================================================================

/// Normalized world x (0 at 180°W, 1 at 180°E).
#[inline]
pub fn mercator_x(longitude: f64) -> f64 {
    (longitude + 180.0) / 360.0
}

/// Normalized world y (0 at the northern edge, 1 at the southern edge).
#[inline]
pub fn mercator_y(latitude: f64) -> f64 {
    let lat = latitude.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT).to_radians();
    0.5 - (PI / 4.0 + lat / 2.0).tan().ln() / (2.0 * PI)
}

/// Inverse of [`mercator_y`].
#[inline]
pub fn mercator_latitude(y: f64) -> f64 {
    (2.0 * (PI * (1.0 - 2.0 * y)).exp().atan() - PI / 2.0).to_degrees()
}

/// Center of the bounds in Web-Mercator space.
///
/// The latitude midpoint is taken on the projected map, which is what a
/// renderer centers on.
pub fn mercator_center(bounds: &Bounds) -> GpsPoint {
    let x = (mercator_x(bounds.min_lng) + mercator_x(bounds.max_lng)) / 2.0;
    let y = (mercator_y(bounds.min_lat) + mercator_y(bounds.max_lat)) / 2.0;
    GpsPoint::new(mercator_latitude(y), x * 360.0 - 180.0)
}

/// Zoom level at which `bounds` fits the configured display size.
///
/// The usable area is the display minus `padding` on every side. The result is
/// clamped to `[0, max_zoom]`; a single-location extent gets `single_point_zoom`.
pub fn fit_zoom(bounds: &Bounds, config: &ViewportConfig) -> f64 {
    let dx = mercator_x(bounds.max_lng) - mercator_x(bounds.min_lng);
    let dy = mercator_y(bounds.min_lat) - mercator_y(bounds.max_lat);

    if dx <= DEGENERATE_EXTENT && dy <= DEGENERATE_EXTENT {
        return config.single_point_zoom.min(config.max_zoom);
    }

    let usable_width = (config.width - 2.0 * config.padding).max(1.0);
    let usable_height = (config.height - 2.0 * config.padding).max(1.0);

    let scale_x = if dx > DEGENERATE_EXTENT {
        usable_width / (dx * TILE_SIZE)
    } else {
        f64::INFINITY
    };
    let scale_y = if dy > DEGENERATE_EXTENT {
        usable_height / (dy * TILE_SIZE)
    } else {
        f64::INFINITY
    };

    scale_x.min(scale_y).log2().clamp(0.0, config.max_zoom)
}
