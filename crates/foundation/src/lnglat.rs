use serde::{Deserialize, Serialize};

/// A WGS84 position in degrees.
///
/// Serialized as `[lng, lat]`, the order used by GeoJSON and the map SDK.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    pub fn is_finite(self) -> bool {
        self.lng.is_finite() && self.lat.is_finite()
    }

    /// `"lat, lng"` with the given number of decimals.
    pub fn format_lat_lng(self, decimals: usize) -> String {
        format!("{:.*}, {:.*}", decimals, self.lat, decimals, self.lng)
    }
}

impl From<[f64; 2]> for LngLat {
    fn from(v: [f64; 2]) -> Self {
        Self::new(v[0], v[1])
    }
}

impl From<LngLat> for [f64; 2] {
    fn from(p: LngLat) -> Self {
        [p.lng, p.lat]
    }
}

impl std::ops::Add for LngLat {
    type Output = Self;

    fn add(self, other: Self) -> Self::Output {
        Self::new(self.lng + other.lng, self.lat + other.lat)
    }
}

impl std::ops::Sub for LngLat {
    type Output = Self;

    fn sub(self, other: Self) -> Self::Output {
        Self::new(self.lng - other.lng, self.lat - other.lat)
    }
}

#[cfg(test)]
mod tests {
    use super::LngLat;

    #[test]
    fn lnglat_add_sub() {
        let a = LngLat::new(1.0, 2.0);
        let b = LngLat::new(-0.5, 4.0);
        assert_eq!(a + b, LngLat::new(0.5, 6.0));
        assert_eq!(a - b, LngLat::new(1.5, -2.0));
    }

    #[test]
    fn serializes_as_lng_lat_pair() {
        let p = LngLat::new(2.3522, 48.8566);
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, "[2.3522,48.8566]");
        let back: LngLat = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn formats_latitude_first() {
        let p = LngLat::new(-74.006, 40.7128);
        assert_eq!(p.format_lat_lng(4), "40.7128, -74.0060");
    }
}
