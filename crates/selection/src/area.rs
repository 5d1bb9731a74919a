use foundation::math::{area_m2, bounds, centroid, format_area};
use foundation::{GeoBounds, LngLat, Ring};
use serde::Serialize;

/// A completed area of interest: the drawn ring plus derived geometry and address.
///
/// Immutable once built; a new draw produces a new value instead of mutating this one.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaSelection {
    ring: Ring,
    center: LngLat,
    address: String,
    bounds: GeoBounds,
    area_square_meters: f64,
}

impl AreaSelection {
    /// Computes center, bounds and area for `ring` and attaches `address`.
    pub fn new(ring: Ring, address: impl Into<String>) -> Self {
        let center = centroid(&ring);
        let bounds = bounds(&ring);
        let area_square_meters = area_m2(&ring);
        Self {
            ring,
            center,
            address: address.into(),
            bounds,
            area_square_meters,
        }
    }

    pub fn ring(&self) -> &Ring {
        &self.ring
    }

    pub fn center(&self) -> LngLat {
        self.center
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn bounds(&self) -> GeoBounds {
        self.bounds
    }

    pub fn area_square_meters(&self) -> f64 {
        self.area_square_meters
    }

    pub fn point_count(&self) -> usize {
        self.ring.len()
    }

    /// One-line description for the selection badge, e.g. `"Le Marais · 1.23 km² · 5 points"`.
    pub fn summary(&self) -> String {
        format!(
            "{} · {} · {} points",
            self.address,
            format_area(self.area_square_meters),
            self.point_count()
        )
    }
}
