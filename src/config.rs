//! Viewer configuration.
//!
//! Every field has a default matching the production site, so an empty JSON
//! object is a valid configuration. On the web, overrides are read from
//! localStorage and the `source=` query parameter.

use crate::geo::{lat_lng, LatLng};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Endpoints of the photo metadata service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceEndpoints {
    /// Prefix for every request (empty = same origin).
    pub base_url: String,
    /// Photos at a location, queried with `lat` and `lng`.
    pub by_location_path: String,
    /// The popular shelf.
    pub popular_path: String,
    /// Single photo feature, the id is appended.
    pub photo_path: String,
    /// Optional archive source filter (e.g. "tpl"), forwarded as `source=`.
    pub source: Option<String>,
}

impl Default for ServiceEndpoints {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            by_location_path: "/api/oldtoronto/by_location".to_string(),
            popular_path: "/popular.json".to_string(),
            photo_path: "/api/layer/oldtoronto/".to_string(),
            source: None,
        }
    }
}

/// Top-level viewer settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Prefix of every page title.
    pub app_name: String,
    /// Lower bound of the year slider.
    pub min_year: i32,
    /// Upper bound of the year slider.
    pub max_year: i32,
    /// Quiet period before a slider drag restyles the markers.
    pub filter_debounce_ms: u64,
    /// Added to a marker's z-index while it is selected.
    pub selected_z_boost: i32,
    /// Map center on first load, as [lat, lon].
    pub initial_center: [f64; 2],
    pub initial_zoom: u8,
    /// Zoom level used when jumping to a searched address.
    pub search_zoom: u8,
    /// First day of the popular shelf rotation.
    pub popular_epoch: NaiveDate,
    /// Public site URL used in share links.
    pub social_url: String,
    pub endpoints: ServiceEndpoints,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            app_name: "OldTO".to_string(),
            min_year: 1850,
            max_year: 2018,
            filter_debounce_ms: 200,
            selected_z_boost: 100_000,
            initial_center: [43.6486135, -79.3738487],
            initial_zoom: 15,
            search_zoom: 17,
            popular_epoch: NaiveDate::from_ymd_opt(2015, 12, 15).unwrap_or_default(),
            social_url: "https://oldtoronto.sidewalklabs.com/".to_string(),
            endpoints: ServiceEndpoints::default(),
        }
    }
}

impl ViewerConfig {
    /// localStorage key for configuration overrides.
    const STORAGE_KEY: &'static str = "oldto_viewer_config";

    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration, falling back to defaults on malformed input.
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str::<Self>(json) {
            Ok(config) if config.min_year < config.max_year => config,
            Ok(config) => {
                log::warn!(
                    "Ignoring config with empty year range {}..{}",
                    config.min_year,
                    config.max_year
                );
                Self::default()
            }
            Err(e) => {
                log::warn!("Failed to parse viewer config: {}", e);
                Self::default()
            }
        }
    }

    pub fn initial_center(&self) -> LatLng {
        lat_lng(self.initial_center[0], self.initial_center[1])
    }

    /// Shareable link to a single photo.
    pub fn share_url(&self, photo_id: &str) -> String {
        format!("{}/#{}", self.social_url.trim_end_matches('/'), photo_id)
    }

    /// Load the configuration for the current page.
    ///
    /// Reads a JSON override from localStorage, then applies `source=` from
    /// the page's query string.
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let Some(window) = web_sys::window() else {
            return Self::default();
        };

        let mut config = match window.local_storage() {
            Ok(Some(storage)) => match storage.get_item(Self::STORAGE_KEY) {
                Ok(Some(json)) => {
                    log::info!("Loaded viewer config from localStorage");
                    Self::from_json(&json)
                }
                _ => Self::default(),
            },
            _ => Self::default(),
        };

        if let Ok(search) = window.location().search() {
            if let Some(source) = source_from_query(&search) {
                config.endpoints.source = Some(source);
            }
        }

        config
    }

    /// Native builds have no page to read from.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        log::debug!("No {} on native builds, using defaults", Self::STORAGE_KEY);
        Self::default()
    }
}

/// Extracts an alphabetic `source=` value from a query string.
pub fn source_from_query(query: &str) -> Option<String> {
    let query = query.trim_start_matches('?');
    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        if key != "source" {
            return None;
        }
        let source: String = value.chars().take_while(|c| c.is_ascii_alphabetic()).collect();
        (!source.is_empty()).then_some(source)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ViewerConfig::default();
        assert_eq!(config.min_year, 1850);
        assert_eq!(config.max_year, 2018);
        assert_eq!(config.filter_debounce_ms, 200);
        assert_eq!(config.popular_epoch, NaiveDate::from_ymd_opt(2015, 12, 15).unwrap());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = ViewerConfig::from_json(
            r#"{"max_year": 1990, "endpoints": {"source": "cta"}}"#,
        );
        assert_eq!(config.max_year, 1990);
        assert_eq!(config.min_year, 1850);
        assert_eq!(config.endpoints.source.as_deref(), Some("cta"));
        assert_eq!(config.endpoints.popular_path, "/popular.json");
    }

    #[test]
    fn test_bad_json_falls_back() {
        assert_eq!(ViewerConfig::from_json("{nope"), ViewerConfig::default());
        assert_eq!(
            ViewerConfig::from_json(r#"{"min_year": 2000, "max_year": 1900}"#),
            ViewerConfig::default()
        );
    }

    #[test]
    fn test_source_from_query() {
        assert_eq!(source_from_query("?source=tpl"), Some("tpl".to_string()));
        assert_eq!(source_from_query("?a=1&source=cta2"), Some("cta".to_string()));
        assert_eq!(source_from_query("?source="), None);
        assert_eq!(source_from_query(""), None);
    }

    #[test]
    fn test_share_url() {
        let config = ViewerConfig::default();
        assert_eq!(
            config.share_url("123"),
            "https://oldtoronto.sidewalklabs.com/#123"
        );
    }
}
