//! Photo metadata cache.
//!
//! Every by-location (or popular shelf) response is a map of photo id to
//! metadata. Responses are merged into one session-wide cache so later
//! lookups (grid filtering, bare photo id resolution, descriptions) never
//! need another request.

use crate::geo::{GridKey, LocationKey};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Metadata for a single photo.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhotoInfo {
    #[serde(default)]
    pub title: String,
    /// Free-form date text, e.g. "1927", "1927; 1933" or "n.d.".
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub thumb_url: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    /// Link to the archive's catalogue record.
    #[serde(default)]
    pub url: Option<String>,
    /// Present when the photo was geocoded to a named place.
    #[serde(default)]
    pub original_title: Option<String>,
    /// Any other fields the service sends along.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl PhotoInfo {
    /// Every four-digit year mentioned in the date text.
    pub fn years(&self) -> Vec<i32> {
        let mut years = Vec::new();
        let bytes = self.date.as_bytes();
        let mut start = None;

        for i in 0..=bytes.len() {
            let is_digit = i < bytes.len() && bytes[i].is_ascii_digit();
            match (is_digit, start) {
                (true, None) => start = Some(i),
                (false, Some(s)) => {
                    if i - s == 4 {
                        if let Ok(year) = self.date[s..i].parse() {
                            years.push(year);
                        }
                    }
                    start = None;
                }
                _ => {}
            }
        }

        years
    }
}

/// Response of a by-location or popular-shelf request: photo id -> metadata.
pub type LocationPhotos = HashMap<String, PhotoInfo>;

/// Session cache of everything the photo service has returned.
#[derive(Debug, Default)]
pub struct PhotoInfoCache {
    infos: HashMap<String, PhotoInfo>,
    by_grid: HashMap<GridKey, Vec<String>>,
    location_names: HashMap<LocationKey, String>,
    photo_locations: HashMap<String, LocationKey>,
}

impl PhotoInfoCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges a response for `grid` and returns its photo ids sorted by date.
    pub fn merge(&mut self, grid: &GridKey, photos: LocationPhotos) -> Vec<String> {
        let mut ids: Vec<String> = photos.keys().cloned().collect();

        if let GridKey::Location(location) = grid {
            if let Some(name) = photos.values().find_map(|info| info.original_title.clone()) {
                self.location_names.insert(location.clone(), name);
            }
            for id in &ids {
                self.photo_locations.insert(id.clone(), location.clone());
            }
        }

        self.infos.extend(photos);

        // Responses arrive unordered; sort by date with the id as tie-breaker.
        ids.sort_by(|a, b| {
            let da = self.infos.get(a).map(|i| i.date.as_str()).unwrap_or("");
            let db = self.infos.get(b).map(|i| i.date.as_str()).unwrap_or("");
            da.cmp(db).then_with(|| a.cmp(b))
        });

        self.by_grid.insert(grid.clone(), ids.clone());
        ids
    }

    pub fn info(&self, photo_id: &str) -> Option<&PhotoInfo> {
        self.infos.get(photo_id)
    }

    /// Sorted photo ids previously loaded for a grid.
    pub fn photos_at(&self, grid: &GridKey) -> Option<&[String]> {
        self.by_grid.get(grid).map(Vec::as_slice)
    }

    /// Location a photo was loaded from, if it came from a by-location response.
    pub fn location_of(&self, photo_id: &str) -> Option<&LocationKey> {
        self.photo_locations.get(photo_id)
    }

    pub fn location_name(&self, location: &LocationKey) -> Option<&str> {
        self.location_names.get(location).map(String::as_str)
    }

    /// Title followed by date, with "n.d." spelled out.
    pub fn description(&self, photo_id: &str) -> String {
        let Some(info) = self.info(photo_id) else {
            return "No Date".to_string();
        };

        let date = info.date.replacen("n.d.", "No Date", 1).replacen("n.d", "No Date", 1);
        let date = if date.is_empty() { "No Date".to_string() } else { date };

        if info.title.is_empty() {
            date
        } else {
            format!("{} {}", info.title, date)
        }
    }

    pub fn library_url(&self, photo_id: &str) -> Option<&str> {
        self.info(photo_id).and_then(|info| info.url.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(date: &str, title: &str) -> PhotoInfo {
        PhotoInfo {
            date: date.to_string(),
            title: title.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_years_in_date() {
        assert_eq!(info("1927; 1933; 1940", "").years(), vec![1927, 1933, 1940]);
        assert_eq!(info("c. 1910", "").years(), vec![1910]);
        assert!(info("n.d.", "").years().is_empty());
        assert!(info("12345", "").years().is_empty());
    }

    #[test]
    fn test_merge_sorts_by_date() {
        let grid = GridKey::parse("43.65,-79.38").unwrap();
        let mut photos = LocationPhotos::new();
        photos.insert("b".into(), info("1930", "B"));
        photos.insert("a".into(), info("1910", "A"));
        photos.insert("c".into(), info("1910", "C"));

        let mut cache = PhotoInfoCache::new();
        let ids = cache.merge(&grid, photos);
        assert_eq!(ids, vec!["a", "c", "b"]);
        assert_eq!(cache.photos_at(&grid).unwrap(), ids.as_slice());
        assert_eq!(
            cache.location_of("b").map(LocationKey::as_str),
            Some("43.65,-79.38")
        );
    }

    #[test]
    fn test_location_name_from_original_title() {
        let grid = GridKey::parse("43.65,-79.38").unwrap();
        let mut named = info("1910", "Union Station");
        named.original_title = Some("Union Station".into());
        let mut photos = LocationPhotos::new();
        photos.insert("1".into(), named);

        let mut cache = PhotoInfoCache::new();
        cache.merge(&grid, photos);
        let location = grid.location().unwrap();
        assert_eq!(cache.location_name(location), Some("Union Station"));
    }

    #[test]
    fn test_popular_photos_have_no_location() {
        let mut photos = LocationPhotos::new();
        photos.insert("9".into(), info("1935", "Cherry Beach"));
        let mut cache = PhotoInfoCache::new();
        cache.merge(&GridKey::Popular, photos);
        assert!(cache.location_of("9").is_none());
    }

    #[test]
    fn test_description() {
        let grid = GridKey::Popular;
        let mut photos = LocationPhotos::new();
        photos.insert("1".into(), info("n.d.", "Yonge St"));
        photos.insert("2".into(), info("1903", "Temperance"));
        let mut cache = PhotoInfoCache::new();
        cache.merge(&grid, photos);

        assert_eq!(cache.description("1"), "Yonge St No Date");
        assert_eq!(cache.description("2"), "Temperance 1903");
        assert_eq!(cache.description("missing"), "No Date");
    }

    #[test]
    fn test_deserialize_keeps_extra_fields() {
        let info: PhotoInfo = serde_json::from_str(
            r#"{"title": "T", "date": "1920", "width": 600, "height": 400,
                "archives_fields": {"series": "s0372"}}"#,
        )
        .unwrap();
        assert_eq!(info.width, 600);
        assert!(info.extra.contains_key("archives_fields"));
    }
}
