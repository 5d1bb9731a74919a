//! Flat-earth polygon measures on lon/lat degrees.
//!
//! These are the cheap approximations used for neighborhood-sized selections:
//! - `centroid` is the vertex mean, not the area-weighted centroid, so it drifts
//!   for strongly concave shapes.
//! - `area_m2` scales square degrees by the equatorial meters-per-degree, so it
//!   overestimates increasingly with latitude and is not a geodesic area.

use crate::bounds::GeoBounds;
use crate::lnglat::LngLat;
use crate::ring::Ring;

/// Meters per degree of arc at the equator.
pub const METERS_PER_DEGREE: f64 = 111_320.0;

/// Below this many square meters, areas are shown in m², above it in km².
pub const SQUARE_METERS_DISPLAY_LIMIT: f64 = 10_000.0;

/// Arithmetic mean of the ring's vertices.
pub fn centroid(ring: &Ring) -> LngLat {
    let pts = ring.points();
    let n = pts.len() as f64;
    let sum = pts
        .iter()
        .fold(LngLat::new(0.0, 0.0), |acc, &p| acc + p);
    LngLat::new(sum.lng / n, sum.lat / n)
}

/// Shoelace formula in square degrees.
///
/// Positive for counter-clockwise rings (lng as x, lat as y).
pub fn signed_area(ring: &Ring) -> f64 {
    let twice: f64 = ring
        .edges()
        .map(|(a, b)| a.lng * b.lat - b.lng * a.lat)
        .sum();
    0.5 * twice
}

/// Approximate area in square meters.
pub fn area_m2(ring: &Ring) -> f64 {
    signed_area(ring).abs() * METERS_PER_DEGREE * METERS_PER_DEGREE
}

/// Componentwise min/max of the ring's vertices.
pub fn bounds(ring: &Ring) -> GeoBounds {
    let pts = ring.points();
    let first = pts[0];
    let (mut sw, mut ne) = (first, first);
    for p in &pts[1..] {
        sw.lng = sw.lng.min(p.lng);
        sw.lat = sw.lat.min(p.lat);
        ne.lng = ne.lng.max(p.lng);
        ne.lat = ne.lat.max(p.lat);
    }
    GeoBounds::new(sw, ne)
}

/// Human-readable area: `"850 m²"` or `"1.23 km²"`.
pub fn format_area(area_m2: f64) -> String {
    if area_m2 < SQUARE_METERS_DISPLAY_LIMIT {
        format!("{} m²", area_m2.round())
    } else {
        format!("{:.2} km²", area_m2 / 1_000_000.0)
    }
}
