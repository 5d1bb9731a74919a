use serde::{Deserialize, Serialize};

use crate::lnglat::LngLat;

/// Minimum number of distinct vertices for a polygon ring.
pub const MIN_RING_POINTS: usize = 3;

/// Closed polygon boundary; the last vertex implicitly connects to the first.
///
/// Invariants:
/// - at least [`MIN_RING_POINTS`] vertices
/// - every vertex is finite
/// - the closing duplicate of the first vertex is never stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<LngLat>", into = "Vec<LngLat>")]
pub struct Ring {
    points: Vec<LngLat>,
}

impl Ring {
    /// Builds a ring from an open vertex list.
    ///
    /// Returns `None` when fewer than three vertices remain or a vertex is not finite.
    pub fn new(points: Vec<LngLat>) -> Option<Self> {
        if points.len() < MIN_RING_POINTS || !points.iter().all(|p| p.is_finite()) {
            return None;
        }
        Some(Self { points })
    }

    /// Builds a ring from a vertex list that may repeat its first vertex at the end,
    /// as drawing tools and GeoJSON emit it.
    pub fn from_closed(mut points: Vec<LngLat>) -> Option<Self> {
        if points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        Self::new(points)
    }

    pub fn points(&self) -> &[LngLat] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Iterates the ring's edges as `(from, to)`, wrapping the last vertex to the first.
    pub fn edges(&self) -> impl Iterator<Item = (LngLat, LngLat)> + '_ {
        let n = self.points.len();
        (0..n).map(move |i| (self.points[i], self.points[(i + 1) % n]))
    }

    /// Same polygon, starting at vertex `k`.
    pub fn rotated(&self, k: usize) -> Self {
        let mut points = self.points.clone();
        let n = points.len();
        points.rotate_left(k % n);
        Self { points }
    }
}

impl TryFrom<Vec<LngLat>> for Ring {
    type Error = String;

    fn try_from(points: Vec<LngLat>) -> Result<Self, Self::Error> {
        let n = points.len();
        Ring::from_closed(points)
            .ok_or_else(|| format!("ring needs at least {MIN_RING_POINTS} finite points, got {n}"))
    }
}

impl From<Ring> for Vec<LngLat> {
    fn from(ring: Ring) -> Self {
        ring.points
    }
}
