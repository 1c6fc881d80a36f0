//! Location key types.
//!
//! These types provide strongly-typed identifiers for the spatial index:
//! - `LocationKey`: a `"lat,lon"` string identifying one point on the map
//! - `GridKey`: what a grid is showing, either a location or the popular shelf
//!
//! ## Key Format
//!
//! Keys produced from coordinates use six decimal places (`"43.648614,-79.373849"`).
//! Keys parsed from the dataset or from a URL keep their original spelling, so
//! `"43.65,-79.38"` survives a round trip through the URL unchanged. Two keys
//! are equal when their strings are equal.

use geo_types::Coord;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Sentinel grid key for the popular photos shelf.
pub const POPULAR_KEY: &str = "pop";

/// A geographic point. `x` is longitude, `y` is latitude.
pub type LatLng = Coord<f64>;

/// Builds a position from latitude/longitude order.
pub fn lat_lng(lat: f64, lon: f64) -> LatLng {
    Coord { x: lon, y: lat }
}

/// Canonical identifier for a point on the map.
#[derive(Debug, Clone)]
pub struct LocationKey {
    raw: String,
    position: LatLng,
}

impl LocationKey {
    /// Parse a `"lat,lon"` key. Returns `None` if either half is not a
    /// finite coordinate in range.
    pub fn parse(key: &str) -> Option<Self> {
        let (lat, lon) = key.split_once(',')?;
        let lat: f64 = lat.trim().parse().ok()?;
        let lon: f64 = lon.trim().parse().ok()?;

        if !lat.is_finite() || !lon.is_finite() {
            return None;
        }
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return None;
        }

        Some(Self {
            raw: key.to_string(),
            position: lat_lng(lat, lon),
        })
    }

    /// Build the canonical six-decimal key for a position.
    pub fn from_position(position: LatLng) -> Self {
        Self {
            raw: format!("{:.6},{:.6}", position.y, position.x),
            position,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The decoded position of this key.
    pub fn position(&self) -> LatLng {
        self.position
    }

    /// Latitude and longitude halves as they appear in the key.
    pub fn lat_lon_parts(&self) -> (&str, &str) {
        self.raw.split_once(',').unwrap_or((self.raw.as_str(), ""))
    }
}

impl PartialEq for LocationKey {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for LocationKey {}

impl Hash for LocationKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl fmt::Display for LocationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// What a photo grid is showing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum GridKey {
    /// Photos taken at one map location.
    Location(LocationKey),
    /// The curated popular photos shelf. It has no map pin.
    Popular,
}

impl GridKey {
    /// Parse a grid key from its URL spelling.
    pub fn parse(key: &str) -> Option<Self> {
        if key == POPULAR_KEY {
            Some(GridKey::Popular)
        } else {
            LocationKey::parse(key).map(GridKey::Location)
        }
    }

    pub fn is_popular(&self) -> bool {
        matches!(self, GridKey::Popular)
    }

    pub fn location(&self) -> Option<&LocationKey> {
        match self {
            GridKey::Location(key) => Some(key),
            GridKey::Popular => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            GridKey::Location(key) => key.as_str(),
            GridKey::Popular => POPULAR_KEY,
        }
    }
}

impl fmt::Display for GridKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<LocationKey> for GridKey {
    fn from(key: LocationKey) -> Self {
        GridKey::Location(key)
    }
}

impl From<GridKey> for String {
    fn from(key: GridKey) -> Self {
        key.as_str().to_string()
    }
}

impl TryFrom<String> for GridKey {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        GridKey::parse(&value).ok_or_else(|| format!("invalid grid key: {value}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_key_keeps_spelling() {
        let key = LocationKey::parse("43.65,-79.38").unwrap();
        assert_eq!(key.as_str(), "43.65,-79.38");
        assert!((key.position().y - 43.65).abs() < 1e-9);
        assert!((key.position().x + 79.38).abs() < 1e-9);
        assert_eq!(key.lat_lon_parts(), ("43.65", "-79.38"));
    }

    #[test]
    fn test_location_key_from_position() {
        let key = LocationKey::from_position(lat_lng(43.6486135, -79.3738487));
        assert_eq!(key.as_str(), "43.648614,-79.373849");
    }

    #[test]
    fn test_invalid_location_keys() {
        assert!(LocationKey::parse("").is_none());
        assert!(LocationKey::parse("43.65").is_none());
        assert!(LocationKey::parse("abc,-79.38").is_none());
        assert!(LocationKey::parse("95.0,-79.38").is_none());
        assert!(LocationKey::parse("NaN,1").is_none());
    }

    #[test]
    fn test_grid_key_parse() {
        assert_eq!(GridKey::parse("pop"), Some(GridKey::Popular));
        let grid = GridKey::parse("43.65,-79.38").unwrap();
        assert_eq!(grid.as_str(), "43.65,-79.38");
        assert!(!grid.is_popular());
        assert!(GridKey::parse("popular").is_none());
    }

    #[test]
    fn test_grid_key_serde() {
        let json = serde_json::to_string(&GridKey::Popular).unwrap();
        assert_eq!(json, "\"pop\"");
        let grid: GridKey = serde_json::from_str("\"43.65,-79.38\"").unwrap();
        assert_eq!(grid, GridKey::parse("43.65,-79.38").unwrap());
        assert!(serde_json::from_str::<GridKey>("\"nowhere\"").is_err());
    }
}
