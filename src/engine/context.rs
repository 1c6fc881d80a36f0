//! State shared by the transition engine and the map/filter controls.

use crate::config::ViewerConfig;
use crate::data::{LocationIndex, PhotoInfoCache, PopularShelf};
use crate::geo::{GridKey, LatLng, LocationKey};
use crate::map::{MapQueue, MapWidget, MarkerIndex, SearchPin};
use std::rc::Rc;
use crate::state::{TemporalFilter, YearRange};

/// What a click on a marker shows before the grid is opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkerPreview {
    /// A sample photo, plus how many more are in range.
    Photo { photo_id: String, more: u32 },
    /// Nothing at this location falls in the year range.
    NoPhotosInRange { first: i32, last: i32 },
}

/// Markers, filter, datasets and the map widget.
///
/// Widget mutations are queued; whoever releases the context calls
/// [`ViewerContext::flush_map`] or flushes the queue from
/// [`ViewerContext::map_queue`].
pub struct ViewerContext {
    pub config: ViewerConfig,
    pub markers: MarkerIndex,
    pub filter: TemporalFilter,
    pub dataset: LocationIndex,
    pub popular: PopularShelf,
    pub photos: PhotoInfoCache,
    search_pin: Option<SearchPin>,
    map: Rc<MapQueue>,
}

impl ViewerContext {
    pub fn new(
        config: ViewerConfig,
        dataset: LocationIndex,
        popular: PopularShelf,
        map: Rc<dyn MapWidget>,
    ) -> Self {
        Self {
            markers: MarkerIndex::new(config.selected_z_boost),
            filter: TemporalFilter::new(&config),
            photos: PhotoInfoCache::new(),
            search_pin: None,
            config,
            dataset,
            popular,
            map: Rc::new(MapQueue::new(map)),
        }
    }

    pub fn map(&self) -> &dyn MapWidget {
        self.map.as_ref()
    }

    pub fn map_queue(&self) -> Rc<MapQueue> {
        self.map.clone()
    }

    /// Sends queued widget updates. Must not be called while the context is
    /// borrowed from a shared cell.
    pub fn flush_map(&self) {
        self.map.flush();
    }

    /// Photos a grid holds under the active filter.
    ///
    /// Materializes the location's marker if it does not exist yet.
    pub fn grid_count(&mut self, grid: &GridKey) -> u32 {
        match grid {
            GridKey::Popular => self.popular.len() as u32,
            GridKey::Location(key) => self.materialize(key),
        }
    }

    fn materialize(&mut self, key: &LocationKey) -> u32 {
        let filter = self.filter.filter();
        self.markers
            .materialize(key, self.dataset.get(key), &filter, self.map.as_ref())
            .count
    }

    /// Selects a location's marker, panning to it if it is off screen.
    pub fn focus_location(&mut self, key: &LocationKey) {
        self.materialize(key);
        self.select_marker(key);

        let position = key.position();
        let visible = self
            .map
            .bounds()
            .map(|bounds| bounds.contains(position))
            .unwrap_or(false);
        if !visible {
            self.map.pan_to(position);
        }
    }

    pub fn select_marker(&mut self, key: &LocationKey) -> bool {
        self.markers.select(key, self.map.as_ref())
    }

    pub fn deselect_marker(&mut self) {
        self.markers.deselect(self.map.as_ref());
    }

    /// Creates markers for dataset locations now in view.
    pub fn refresh_visible(&mut self) -> usize {
        let Some(bounds) = self.map.bounds() else {
            return 0;
        };
        let filter = self.filter.filter();
        self.markers
            .materialize_visible(&bounds, &self.dataset, &filter, self.map.as_ref())
    }

    /// Applies a new year range to every marker. Returns `true` if it changed.
    pub fn set_year_range(&mut self, range: YearRange) -> bool {
        if !self.filter.set_range(range) {
            return false;
        }
        let filter = self.filter.filter();
        self.markers
            .restyle_all(&self.dataset, &filter, self.map.as_ref());
        self.refresh_visible();
        log::debug!(
            "Filter indicator {}",
            if self.show_clear_filters() { "shown" } else { "hidden" }
        );
        true
    }

    /// Whether the "clear filters" control is visible.
    pub fn show_clear_filters(&self) -> bool {
        self.search_pin.is_some() || !self.filter.is_unfiltered()
    }

    /// Removes the search pin and resets the year range.
    pub fn clear_filters(&mut self) {
        if self.search_pin.take().is_some() {
            self.map.set_search_pin(None);
        }
        let bounds = self.filter.filter().bounds();
        self.set_year_range(bounds);
    }

    pub fn search_pin(&self) -> Option<&SearchPin> {
        self.search_pin.as_ref()
    }

    /// Jumps to a searched address or the user's position.
    pub fn set_search_location(&mut self, position: LatLng, title: impl Into<String>) {
        self.map.pan_to(position);
        self.map.set_zoom(self.config.search_zoom);

        let pin = SearchPin {
            position,
            title: title.into(),
        };
        self.map.set_search_pin(Some(&pin));
        self.search_pin = Some(pin);
    }

    /// Builds the preview for a location whose photos are cached.
    pub fn preview(&mut self, key: &LocationKey) -> Option<MarkerPreview> {
        let grid = GridKey::Location(key.clone());
        self.photos.photos_at(&grid)?;
        let count = self.grid_count(&grid);
        let filter = self.filter.filter();
        let ids = self.photos.photos_at(&grid)?;

        let sample = if filter.is_unfiltered() {
            ids.first()
        } else if count > 0 {
            ids.iter()
                .find(|id| self.photos.info(id).is_some_and(|info| filter.admits(info)))
        } else {
            None
        };

        Some(match sample {
            Some(photo_id) => MarkerPreview::Photo {
                photo_id: photo_id.clone(),
                more: count.saturating_sub(1),
            },
            None => {
                let range = filter.range();
                MarkerPreview::NoPhotosInRange {
                    first: range.first,
                    last: range.last,
                }
            }
        })
    }
}
