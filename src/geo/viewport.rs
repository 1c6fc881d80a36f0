//! Visible map bounds.
//!
//! The map widget reports its viewport as a south-west / north-east corner
//! pair. Containment is inclusive on every edge.

use super::location::LatLng;
use geo_types::{Coord, Rect};

/// Geographic rectangle currently visible on the map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    rect: Rect<f64>,
}

impl Bounds {
    /// Creates bounds from two opposite corners (order does not matter).
    pub fn new(a: LatLng, b: LatLng) -> Self {
        Self {
            rect: Rect::new(a, b),
        }
    }

    /// Creates bounds from (min_lat, min_lon, max_lat, max_lon).
    pub fn from_lat_lon(min_lat: f64, min_lon: f64, max_lat: f64, max_lon: f64) -> Self {
        Self::new(
            Coord {
                x: min_lon,
                y: min_lat,
            },
            Coord {
                x: max_lon,
                y: max_lat,
            },
        )
    }

    /// Checks if a position lies inside the bounds.
    pub fn contains(&self, position: LatLng) -> bool {
        let min = self.rect.min();
        let max = self.rect.max();
        position.x >= min.x && position.x <= max.x && position.y >= min.y && position.y <= max.y
    }

    pub fn center(&self) -> LatLng {
        self.rect.center()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::lat_lng;

    #[test]
    fn test_contains() {
        let bounds = Bounds::from_lat_lon(43.6, -79.5, 43.7, -79.3);
        assert!(bounds.contains(lat_lng(43.65, -79.38)));
        assert!(bounds.contains(lat_lng(43.6, -79.5)));
        assert!(!bounds.contains(lat_lng(43.75, -79.38)));
        assert!(!bounds.contains(lat_lng(43.65, -79.2)));
    }

    #[test]
    fn test_corner_order_is_irrelevant() {
        let a = Bounds::new(lat_lng(43.7, -79.3), lat_lng(43.6, -79.5));
        assert!(a.contains(lat_lng(43.65, -79.4)));
        let center = a.center();
        assert!((center.y - 43.65).abs() < 1e-9);
        assert!((center.x + 79.4).abs() < 1e-9);
    }
}
