//! Photo metadata service interface.
//!
//! The service is an external collaborator. This module defines the trait the
//! engine consumes, the request URLs it uses, and parsers for its responses.
//! On WASM targets the browser implementation lives in `crate::web`; native
//! builds get an in-memory implementation for development and testing.

use super::photo_info::LocationPhotos;
use crate::config::ServiceEndpoints;
use crate::geo::{lat_lng, GridKey, LocationKey};
use serde::Deserialize;
use std::future::Future;

/// Errors that can occur while talking to the photo service.
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceError {
    /// The request could not be sent or did not complete.
    Network(String),
    /// The server answered with a non-success status.
    Status(u16),
    /// The response body was not in the expected shape.
    Parse(String),
    /// The photo exists but carries no usable location.
    NoLocation(String),
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceError::Network(msg) => write!(f, "Network error: {}", msg),
            ServiceError::Status(code) => write!(f, "Unexpected HTTP status {}", code),
            ServiceError::Parse(msg) => write!(f, "Malformed response: {}", msg),
            ServiceError::NoLocation(id) => write!(f, "Photo {} has no location", id),
        }
    }
}

impl std::error::Error for ServiceError {}

impl From<serde_json::Error> for ServiceError {
    fn from(e: serde_json::Error) -> Self {
        ServiceError::Parse(e.to_string())
    }
}

/// Source of photo metadata.
///
/// Note: This trait does not require `Send` bounds since the viewer runs on a
/// single thread and browser futures cannot be sent between threads.
pub trait PhotoService {
    /// Loads every photo shown in a grid: one map location or the popular shelf.
    fn photos_at(
        &self,
        grid: &GridKey,
    ) -> impl Future<Output = Result<LocationPhotos, ServiceError>>;

    /// Resolves the map location of a single photo.
    fn locate_photo(
        &self,
        photo_id: &str,
    ) -> impl Future<Output = Result<LocationKey, ServiceError>>;
}

/// URL for a grid's photo list.
pub fn grid_url(endpoints: &ServiceEndpoints, grid: &GridKey) -> String {
    let mut url = match grid {
        GridKey::Popular => format!("{}{}", endpoints.base_url, endpoints.popular_path),
        GridKey::Location(key) => {
            let (lat, lon) = key.lat_lon_parts();
            format!(
                "{}{}?lat={}&lng={}",
                endpoints.base_url, endpoints.by_location_path, lat, lon
            )
        }
    };

    if let Some(source) = &endpoints.source {
        url.push(if url.contains('?') { '&' } else { '?' });
        url.push_str("source=");
        url.push_str(source);
    }

    url
}

/// URL for a single photo's feature record.
pub fn photo_url(endpoints: &ServiceEndpoints, photo_id: &str) -> String {
    format!("{}{}{}", endpoints.base_url, endpoints.photo_path, photo_id)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FeatureResponse {
    Collection { features: Vec<Feature> },
    Single(Feature),
}

#[derive(Deserialize)]
struct Feature {
    geometry: Option<Geometry>,
}

#[derive(Deserialize)]
struct Geometry {
    coordinates: Vec<f64>,
}

/// Extracts a location key from a GeoJSON feature or feature collection.
///
/// Coordinates are `[lon, lat]`; the key is formatted with six decimals.
pub fn parse_photo_feature(photo_id: &str, json: &str) -> Result<LocationKey, ServiceError> {
    let response: FeatureResponse = serde_json::from_str(json)?;
    let feature = match response {
        FeatureResponse::Collection { features } => features.into_iter().next(),
        FeatureResponse::Single(feature) => Some(feature),
    };

    let coords = feature
        .and_then(|f| f.geometry)
        .map(|g| g.coordinates)
        .ok_or_else(|| ServiceError::NoLocation(photo_id.to_string()))?;

    match coords.as_slice() {
        [lon, lat, ..] if lat.is_finite() && lon.is_finite() => {
            Ok(LocationKey::from_position(lat_lng(*lat, *lon)))
        }
        _ => Err(ServiceError::NoLocation(photo_id.to_string())),
    }
}

/// Parses a by-location or popular-shelf response body.
pub fn parse_location_photos(json: &str) -> Result<LocationPhotos, ServiceError> {
    Ok(serde_json::from_str(json)?)
}

// Native in-memory implementation for development/testing
#[cfg(not(target_arch = "wasm32"))]
pub mod native {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// A photo service answering from in-memory tables.
    ///
    /// Every call is counted so callers can verify how many requests a
    /// sequence of operations issued.
    #[derive(Default)]
    pub struct MemoryPhotoService {
        grids: HashMap<GridKey, LocationPhotos>,
        locations: HashMap<String, LocationKey>,
        grid_requests: RefCell<Vec<GridKey>>,
        lookup_requests: RefCell<Vec<String>>,
    }

    impl MemoryPhotoService {
        pub fn new() -> Self {
            Self::default()
        }

        /// Registers the photos of a grid. Photos at a location also become
        /// resolvable through `locate_photo`.
        pub fn with_grid(mut self, grid: GridKey, photos: LocationPhotos) -> Self {
            if let GridKey::Location(key) = &grid {
                for id in photos.keys() {
                    self.locations.insert(id.clone(), key.clone());
                }
            }
            self.grids.insert(grid, photos);
            self
        }

        pub fn grid_requests(&self) -> Vec<GridKey> {
            self.grid_requests.borrow().clone()
        }

        pub fn lookup_requests(&self) -> Vec<String> {
            self.lookup_requests.borrow().clone()
        }
    }

    impl PhotoService for MemoryPhotoService {
        async fn photos_at(&self, grid: &GridKey) -> Result<LocationPhotos, ServiceError> {
            self.grid_requests.borrow_mut().push(grid.clone());
            self.grids.get(grid).cloned().ok_or(ServiceError::Status(404))
        }

        async fn locate_photo(&self, photo_id: &str) -> Result<LocationKey, ServiceError> {
            self.lookup_requests.borrow_mut().push(photo_id.to_string());
            self.locations
                .get(photo_id)
                .cloned()
                .ok_or_else(|| ServiceError::NoLocation(photo_id.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoints() -> ServiceEndpoints {
        ServiceEndpoints::default()
    }

    #[test]
    fn test_grid_urls() {
        let grid = GridKey::parse("43.65,-79.38").unwrap();
        assert_eq!(
            grid_url(&endpoints(), &grid),
            "/api/oldtoronto/by_location?lat=43.65&lng=-79.38"
        );
        assert_eq!(grid_url(&endpoints(), &GridKey::Popular), "/popular.json");
    }

    #[test]
    fn test_source_parameter() {
        let endpoints = ServiceEndpoints {
            source: Some("tpl".into()),
            ..endpoints()
        };
        let grid = GridKey::parse("43.65,-79.38").unwrap();
        assert!(grid_url(&endpoints, &grid).ends_with("&lng=-79.38&source=tpl"));
        assert_eq!(grid_url(&endpoints, &GridKey::Popular), "/popular.json?source=tpl");
    }

    #[test]
    fn test_photo_url() {
        assert_eq!(photo_url(&endpoints(), "123"), "/api/layer/oldtoronto/123");
    }

    #[test]
    fn test_parse_single_feature() {
        let json = r#"{"type": "Feature",
            "geometry": {"type": "Point", "coordinates": [-79.3738487, 43.6486135]},
            "properties": {"title": "x"}}"#;
        let key = parse_photo_feature("1", json).unwrap();
        assert_eq!(key.as_str(), "43.648614,-79.373849");
    }

    #[test]
    fn test_parse_feature_collection() {
        let json = r#"{"type": "FeatureCollection", "features": [
            {"geometry": {"coordinates": [-79.38, 43.65]}, "properties": {}}]}"#;
        let key = parse_photo_feature("1", json).unwrap();
        assert_eq!(key.as_str(), "43.650000,-79.380000");
    }

    #[test]
    fn test_parse_feature_without_geometry() {
        let json = r#"{"type": "FeatureCollection", "features": []}"#;
        assert_eq!(
            parse_photo_feature("7", json),
            Err(ServiceError::NoLocation("7".into()))
        );
        let json = r#"{"geometry": null, "properties": {}}"#;
        assert!(parse_photo_feature("7", json).is_err());
        assert!(matches!(
            parse_photo_feature("7", "not json"),
            Err(ServiceError::Parse(_))
        ));
    }

    #[test]
    fn test_parse_location_photos() {
        let photos = parse_location_photos(
            r#"{"1": {"title": "A", "date": "1920"}, "2": {"title": "B", "date": "1925"}}"#,
        )
        .unwrap();
        assert_eq!(photos.len(), 2);
        assert_eq!(photos["2"].date, "1925");
    }
}
