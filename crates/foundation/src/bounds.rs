use serde::{Deserialize, Serialize};

use crate::lnglat::LngLat;

/// Axis-aligned geographic bounds.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub southwest: LngLat,
    pub northeast: LngLat,
}

impl GeoBounds {
    pub fn new(southwest: LngLat, northeast: LngLat) -> Self {
        GeoBounds {
            southwest,
            northeast,
        }
    }

    /// Inclusive on every edge.
    pub fn contains(&self, p: LngLat) -> bool {
        p.lng >= self.southwest.lng
            && p.lng <= self.northeast.lng
            && p.lat >= self.southwest.lat
            && p.lat <= self.northeast.lat
    }
}

#[cfg(test)]
mod tests {
    use super::GeoBounds;
    use crate::lnglat::LngLat;

    #[test]
    fn contains_is_edge_inclusive() {
        let b = GeoBounds::new(LngLat::new(0.0, 0.0), LngLat::new(1.0, 2.0));
        assert!(b.contains(LngLat::new(0.0, 0.0)));
        assert!(b.contains(LngLat::new(1.0, 2.0)));
        assert!(b.contains(LngLat::new(0.5, 1.0)));
        assert!(!b.contains(LngLat::new(1.01, 1.0)));
        assert!(!b.contains(LngLat::new(0.5, -0.01)));
    }
}
