use geo::Point;
use serde::{Deserialize, Serialize};

/// A WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    #[inline] pub fn new(lat: f64, lon: f64) -> Self { Self { lat, lon } }

    /// Both components finite and inside the WGS84 value range.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }

    /// Convert to a `geo` point (x = lon, y = lat).
    #[inline] pub fn to_point(self) -> Point<f64> { Point::new(self.lon, self.lat) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_uses_lon_as_x() {
        let point = LatLon::new(48.1, 11.5).to_point();
        assert_eq!(point.x(), 11.5);
        assert_eq!(point.y(), 48.1);
    }

    #[test]
    fn rejects_out_of_range_and_nan() {
        assert!(LatLon::new(51.0, 10.0).is_valid());
        assert!(!LatLon::new(91.0, 10.0).is_valid());
        assert!(!LatLon::new(51.0, -181.0).is_valid());
        assert!(!LatLon::new(f64::NAN, 10.0).is_valid());
    }
}
