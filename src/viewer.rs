//! The viewer: wires the map, history and transition engine together.
//!
//! Map notifications (idle, bounds changed, clicks), slider input and UI
//! events arrive here as method calls. Navigations that arrive before the
//! map's first idle are held back and applied once it is ready.

use crate::config::ViewerConfig;
use crate::data::{LocationIndex, PhotoService, PopularPhoto, PopularShelf};
use crate::engine::{
    DisplayedView, HistoryAdapter, HistoryRecorder, MarkerPreview, Navigation, TransitionEngine,
    TransitionOutcome, UiEvent, ViewerContext,
};
use crate::geo::{GridKey, LatLng, LocationKey};
use crate::map::MapWidget;
use crate::state::{parse_fragment, ParsedFragment, ViewState, YearLabels, YearRange};
use chrono::NaiveDate;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;
use web_time::Instant;

#[derive(Debug, Default)]
struct MapGate {
    ready: bool,
    /// Latest navigation received before the map was ready.
    queued: Option<Navigation>,
}

/// Handle to a running viewer. Clones share the same state.
pub struct Viewer<S, H> {
    engine: TransitionEngine<S>,
    recorder: Rc<RefCell<HistoryRecorder<H>>>,
    gate: Rc<RefCell<MapGate>>,
    /// Whether a slider timer is waiting for the drag to settle.
    slider_timer: Rc<Cell<bool>>,
}

impl<S, H> Clone for Viewer<S, H> {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
            recorder: self.recorder.clone(),
            gate: self.gate.clone(),
            slider_timer: self.slider_timer.clone(),
        }
    }
}

impl<S: PhotoService, H: HistoryAdapter> Viewer<S, H> {
    pub fn new(
        config: ViewerConfig,
        dataset: LocationIndex,
        popular: PopularShelf,
        map: Rc<dyn MapWidget>,
        service: S,
        history: H,
    ) -> Self {
        log::info!(
            "Starting viewer with {} locations, {} popular photos",
            dataset.len(),
            popular.len()
        );
        let recorder = HistoryRecorder::new(history, config.app_name.clone());
        let ctx = ViewerContext::new(config, dataset, popular, map);
        Self {
            engine: TransitionEngine::new(ctx, service),
            recorder: Rc::new(RefCell::new(recorder)),
            gate: Rc::new(RefCell::new(MapGate::default())),
            slider_timer: Rc::new(Cell::new(false)),
        }
    }

    pub fn engine(&self) -> &TransitionEngine<S> {
        &self.engine
    }

    pub fn displayed(&self) -> DisplayedView {
        self.engine.displayed()
    }

    pub fn with_history<R>(&self, f: impl FnOnce(&mut H) -> R) -> R {
        f(self.recorder.borrow_mut().history_mut())
    }

    pub fn is_map_ready(&self) -> bool {
        self.gate.borrow().ready
    }

    /// First idle of the map: materialize visible markers and apply any
    /// navigation that was waiting. Later idles do nothing.
    pub async fn on_map_idle(&self) -> Option<TransitionOutcome> {
        let queued = {
            let mut gate = self.gate.borrow_mut();
            if gate.ready {
                return None;
            }
            gate.ready = true;
            gate.queued.take()
        };

        let created = self.engine.with_context(|ctx| ctx.refresh_visible());
        log::info!("Map ready, {} markers in view", created);

        match queued {
            Some(navigation) => Some(self.engine.apply(navigation.state).await),
            None => None,
        }
    }

    pub fn on_bounds_changed(&self) {
        if self.is_map_ready() {
            self.engine.with_context(|ctx| ctx.refresh_visible());
        }
    }

    /// A click on the map background deselects the marker.
    pub fn on_map_click(&self) {
        self.engine.with_context(|ctx| ctx.deselect_marker());
    }

    /// Selects a marker and builds its preview, loading its photos if needed.
    pub async fn on_marker_click(&self, key: &LocationKey) -> Option<MarkerPreview> {
        let grid = GridKey::Location(key.clone());
        let cached = self.engine.with_context(|ctx| {
            ctx.grid_count(&grid);
            ctx.select_marker(key);
            ctx.photos.photos_at(&grid).is_some()
        });

        if !cached {
            match self.engine.service().photos_at(&grid).await {
                Ok(photos) => {
                    self.engine.with_context(|ctx| ctx.photos.merge(&grid, photos));
                }
                Err(e) => {
                    log::warn!("Failed to load preview for {}: {}", key, e);
                    return None;
                }
            }
        }

        self.engine.with_context(|ctx| ctx.preview(key))
    }

    /// Reads the fragment the page was loaded with and shows it once the
    /// map is ready.
    pub async fn load_fragment(&self, fragment: &str) -> Option<TransitionOutcome> {
        let state = match parse_fragment(fragment) {
            ParsedFragment::Ready(state) => state,
            ParsedFragment::NeedsLookup(photo_id) => ViewState::photo(photo_id, None),
        };
        self.recorder.borrow_mut().initialize(&state);
        self.handle_navigation(Navigation::page_load(state)).await
    }

    /// Applies a navigation from history. Never records one.
    pub async fn handle_navigation(&self, navigation: Navigation) -> Option<TransitionOutcome> {
        {
            let mut gate = self.gate.borrow_mut();
            if !gate.ready {
                log::debug!("Map not ready, holding {:?} navigation", navigation.kind);
                gate.queued = Some(navigation);
                return None;
            }
        }
        Some(self.engine.apply(navigation.state).await)
    }

    /// Records a UI event in history and shows the resulting state.
    ///
    /// If the state cannot be shown the recorded entry is rewritten to what
    /// is still on screen, so the URL never names a view that is not there.
    pub async fn navigate(&self, event: UiEvent) -> Option<TransitionOutcome> {
        let displayed = self.engine.displayed_grid_key();
        let target = self
            .recorder
            .borrow_mut()
            .record(&event, displayed.as_ref())?;

        let outcome = self.engine.apply(target).await;
        if matches!(
            outcome,
            TransitionOutcome::FetchFailed | TransitionOutcome::LookupFailed
        ) {
            let displayed = self.engine.displayed_state();
            self.recorder.borrow_mut().restore(&displayed);
        }
        Some(outcome)
    }

    /// Slider drag. Labels follow immediately; markers once it settles.
    ///
    /// Returns `true` when the caller should start a timer that waits on
    /// [`Viewer::slider_delay`]. While that timer runs, further moves only
    /// push the deadline back.
    pub fn slide(&self, range: YearRange, now: Instant) -> bool {
        self.engine.with_context(|ctx| ctx.filter.slide(range, now));
        !self.slider_timer.replace(true)
    }

    /// Applies a settled slider value. Returns `true` if markers changed.
    pub fn poll_slider(&self, now: Instant) -> bool {
        self.engine.with_context(|ctx| match ctx.filter.poll(now) {
            Some(range) => ctx.set_year_range(range),
            None => false,
        })
    }

    /// Time until a slider value settles, if one is pending. `None` ends
    /// the running timer.
    pub fn slider_delay(&self, now: Instant) -> Option<Duration> {
        let delay = self.engine.with_context(|ctx| ctx.filter.pending_delay(now));
        if delay.is_none() {
            self.slider_timer.set(false);
        }
        delay
    }

    pub fn set_year_range(&self, range: YearRange) -> bool {
        self.engine.with_context(|ctx| ctx.set_year_range(range))
    }

    pub fn year_labels(&self, width: f64) -> YearLabels {
        self.engine.with_context(|ctx| ctx.filter.label_layout(width))
    }

    pub fn show_clear_filters(&self) -> bool {
        self.engine.with_context(|ctx| ctx.show_clear_filters())
    }

    pub fn clear_filters(&self) {
        self.engine.with_context(|ctx| ctx.clear_filters());
    }

    /// Resets the year range and shows every photo of the open grid.
    pub fn show_all(&self) {
        self.engine.with_context(|ctx| {
            let bounds = ctx.filter.filter().bounds();
            ctx.set_year_range(bounds);
        });
        self.engine.refilter_grid();
    }

    pub fn set_search_location(&self, position: LatLng, title: &str) {
        self.engine
            .with_context(|ctx| ctx.set_search_location(position, title));
    }

    /// The popular shelf in today's order.
    pub fn popular_photos(&self, today: NaiveDate) -> Vec<PopularPhoto> {
        self.engine.with_context(|ctx| {
            ctx.popular
                .rotated(today, ctx.config.popular_epoch)
                .into_iter()
                .cloned()
                .collect()
        })
    }

    pub fn description(&self, photo_id: &str) -> String {
        self.engine.with_context(|ctx| ctx.photos.description(photo_id))
    }

    pub fn share_url(&self, photo_id: &str) -> String {
        self.engine.with_context(|ctx| ctx.config.share_url(photo_id))
    }
}
