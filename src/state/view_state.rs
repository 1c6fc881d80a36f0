//! The view state: which of map, grid or photo is on screen.

use crate::geo::GridKey;
use serde::{Deserialize, Serialize};

/// Coarse view mode, mirrored as a class on the page body.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    #[default]
    Map,
    Grid,
    Photo,
}

impl ViewMode {
    pub fn css_class(&self) -> &'static str {
        match self {
            ViewMode::Map => "view-map",
            ViewMode::Grid => "view-grid",
            ViewMode::Photo => "view-photo",
        }
    }
}

/// Target or displayed view.
///
/// Shapes:
/// - map: `{}`
/// - grid: `{g}`
/// - photo: `{photo_id}` or `{photo_id, g}`
///
/// Values are never mutated in place; a new state replaces the old one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ViewState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub g: Option<GridKey>,
}

impl ViewState {
    /// The bare map.
    pub fn map() -> Self {
        Self::default()
    }

    /// A grid of photos.
    pub fn grid(g: GridKey) -> Self {
        Self {
            photo_id: None,
            g: Some(g),
        }
    }

    /// A single photo, optionally within a known grid.
    pub fn photo(photo_id: impl Into<String>, g: Option<GridKey>) -> Self {
        Self {
            photo_id: Some(photo_id.into()),
            g,
        }
    }

    pub fn mode(&self) -> ViewMode {
        if self.photo_id.is_some() {
            ViewMode::Photo
        } else if self.g.is_some() {
            ViewMode::Grid
        } else {
            ViewMode::Map
        }
    }

    pub fn is_map(&self) -> bool {
        self.photo_id.is_none() && self.g.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modes() {
        let g = GridKey::parse("43.65,-79.38").unwrap();
        assert_eq!(ViewState::map().mode(), ViewMode::Map);
        assert_eq!(ViewState::grid(g.clone()).mode(), ViewMode::Grid);
        assert_eq!(ViewState::photo("1", Some(g)).mode(), ViewMode::Photo);
        assert_eq!(ViewState::photo("1", None).mode(), ViewMode::Photo);
        assert_eq!(ViewMode::Grid.css_class(), "view-grid");
    }

    #[test]
    fn test_serde_shape() {
        let state = ViewState::photo("123", Some(GridKey::Popular));
        let json = serde_json::to_string(&state).unwrap();
        assert_eq!(json, r#"{"photo_id":"123","g":"pop"}"#);
        assert_eq!(serde_json::to_string(&ViewState::map()).unwrap(), "{}");

        let back: ViewState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
