//! Spatial index of materialized markers.
//!
//! Markers are created lazily, the first time their location is needed
//! (it enters the viewport, or a transition selects it), and are never
//! removed. Panning away and back reuses the existing marker.
//!
//! Styling rules:
//! - photos under the filter: `Default` icon, z-index 1
//! - no photos under the filter: `Filtered` icon, z-index 0
//! - selected: `Selected` icon, z-index raised by the configured boost
//!
//! At most one marker is selected. Its pre-selection icon and z-index are
//! remembered and restored when the selection moves.

use super::{MapWidget, Marker, MarkerIcon};
use crate::data::{LocationIndex, YearCounts};
use crate::geo::{Bounds, LocationKey};
use crate::state::YearFilter;
use std::collections::HashMap;

/// Style a marker would have without selection.
fn base_style(count: u32) -> (MarkerIcon, i32) {
    if count > 0 {
        (MarkerIcon::Default, 1)
    } else {
        (MarkerIcon::Filtered, 0)
    }
}

#[derive(Debug, Clone)]
struct Selection {
    key: LocationKey,
    /// Icon to restore on deselect.
    icon: MarkerIcon,
    /// Z-index to restore on deselect.
    z_index: i32,
}

/// Append-only marker index keyed by location.
#[derive(Debug)]
pub struct MarkerIndex {
    markers: HashMap<LocationKey, Marker>,
    selected: Option<Selection>,
    z_boost: i32,
}

impl MarkerIndex {
    pub fn new(z_boost: i32) -> Self {
        Self {
            markers: HashMap::new(),
            selected: None,
            z_boost,
        }
    }

    pub fn get(&self, key: &LocationKey) -> Option<&Marker> {
        self.markers.get(key)
    }

    pub fn contains(&self, key: &LocationKey) -> bool {
        self.markers.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn selected(&self) -> Option<&LocationKey> {
        self.selected.as_ref().map(|s| &s.key)
    }

    /// Returns the marker for `key`, creating it if needed.
    ///
    /// A location missing from the dataset gets a zero-count marker.
    pub fn materialize(
        &mut self,
        key: &LocationKey,
        counts: Option<&YearCounts>,
        filter: &YearFilter,
        map: &dyn MapWidget,
    ) -> &Marker {
        if !self.markers.contains_key(key) {
            let count = counts.map(|c| filter.count(c)).unwrap_or(0);
            let (icon, z_index) = base_style(count);
            let marker = Marker {
                key: key.clone(),
                icon,
                z_index,
                count,
            };
            map.upsert_marker(&marker);
            self.markers.insert(key.clone(), marker);
        }

        &self.markers[key]
    }

    /// Materializes every dataset location inside `bounds` that has no
    /// marker yet. Returns the number of markers created.
    pub fn materialize_visible(
        &mut self,
        bounds: &Bounds,
        dataset: &LocationIndex,
        filter: &YearFilter,
        map: &dyn MapWidget,
    ) -> usize {
        let mut created = 0;
        for (key, counts) in dataset.iter() {
            if self.markers.contains_key(key) || !bounds.contains(key.position()) {
                continue;
            }
            self.materialize(key, Some(counts), filter, map);
            created += 1;
        }

        if created > 0 {
            log::debug!(
                "Materialized {} markers ({} total)",
                created,
                self.markers.len()
            );
        }
        created
    }

    /// Recomputes count, icon and z-index of every marker under `filter`.
    ///
    /// The selected marker keeps its highlight; its remembered style is
    /// updated instead.
    pub fn restyle_all(
        &mut self,
        dataset: &LocationIndex,
        filter: &YearFilter,
        map: &dyn MapWidget,
    ) {
        for (key, marker) in self.markers.iter_mut() {
            let count = dataset.get(key).map(|c| filter.count(c)).unwrap_or(0);
            let (icon, z_index) = base_style(count);

            let (icon, z_index) = match self.selected.as_mut() {
                Some(selection) if &selection.key == key => {
                    selection.icon = icon;
                    selection.z_index = z_index;
                    (MarkerIcon::Selected, z_index + self.z_boost)
                }
                _ => (icon, z_index),
            };

            if marker.count != count || marker.icon != icon || marker.z_index != z_index {
                marker.count = count;
                marker.icon = icon;
                marker.z_index = z_index;
                map.upsert_marker(marker);
            }
        }
    }

    /// Makes `key` the selected marker. Returns `false` if it is not materialized.
    pub fn select(&mut self, key: &LocationKey, map: &dyn MapWidget) -> bool {
        if !self.markers.contains_key(key) {
            return false;
        }
        if self.selected() == Some(key) {
            return true;
        }

        self.deselect(map);

        if let Some(marker) = self.markers.get_mut(key) {
            self.selected = Some(Selection {
                key: key.clone(),
                icon: marker.icon,
                z_index: marker.z_index,
            });
            marker.icon = MarkerIcon::Selected;
            marker.z_index += self.z_boost;
            map.upsert_marker(marker);
        }
        true
    }

    /// Restores the selected marker, if any, to its pre-selection style.
    pub fn deselect(&mut self, map: &dyn MapWidget) {
        let Some(selection) = self.selected.take() else {
            return;
        };
        if let Some(marker) = self.markers.get_mut(&selection.key) {
            marker.icon = selection.icon;
            marker.z_index = selection.z_index;
            map.upsert_marker(marker);
        }
    }
}
