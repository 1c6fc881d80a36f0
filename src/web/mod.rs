//! Browser glue: console logging, `fetch`, the History API and the
//! JavaScript-facing viewer handle.

mod history;
mod logger;
mod map;
mod service;

pub use history::BrowserHistory;
pub use map::JsMap;
pub use service::FetchPhotoService;

use crate::config::ViewerConfig;
use crate::data::{LocationIndex, PopularShelf};
use crate::engine::{MarkerPreview, UiEvent};
use crate::geo::{lat_lng, GridKey, LocationKey};
use crate::state::YearRange;
use crate::viewer::Viewer;
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_time::Instant;

type BrowserViewer = Viewer<FetchPhotoService, BrowserHistory>;

#[wasm_bindgen(start)]
pub fn start() {
    logger::init(log::LevelFilter::Debug);
}

async fn sleep_ms(ms: u32) {
    #[wasm_bindgen]
    extern "C" {
        #[wasm_bindgen(js_name = setTimeout)]
        fn set_timeout(closure: &Closure<dyn FnMut()>, millis: u32) -> i32;
    }

    let (tx, rx) = futures_channel::oneshot::channel::<()>();
    let closure = Closure::once(move || {
        let _ = tx.send(());
    });
    set_timeout(&closure, ms);
    let _ = rx.await;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ViewSnapshot<'a> {
    mode: &'static str,
    g: Option<&'a str>,
    photo_ids: &'a [String],
    selected: Option<&'a str>,
    filtered: bool,
    year_range: [i32; 2],
    show_clear_filters: bool,
}

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
enum PreviewJs {
    #[serde(rename_all = "camelCase")]
    Photo { photo_id: String, more: u32 },
    NoPhotos { first: i32, last: i32 },
}

/// The viewer as seen from the page.
#[wasm_bindgen]
pub struct WebViewer {
    viewer: BrowserViewer,
    listener: Rc<RefCell<Option<js_sys::Function>>>,
}

#[wasm_bindgen]
impl WebViewer {
    /// Creates the viewer. `lat_lons` is the location dataset, `popular` the
    /// popular shelf (may be empty).
    #[wasm_bindgen(constructor)]
    pub fn new(map: JsMap, lat_lons: &str, popular: &str) -> Result<WebViewer, JsValue> {
        let config = ViewerConfig::load();
        let dataset =
            LocationIndex::from_json(lat_lons).map_err(|e| JsValue::from_str(&e.to_string()))?;
        let popular = if popular.trim().is_empty() {
            PopularShelf::default()
        } else {
            PopularShelf::from_json(popular).map_err(|e| JsValue::from_str(&e.to_string()))?
        };

        let service = FetchPhotoService::new(config.endpoints.clone());
        let viewer = Viewer::new(
            config,
            dataset,
            popular,
            Rc::new(map),
            service,
            BrowserHistory::new(),
        );

        let web = WebViewer {
            viewer,
            listener: Default::default(),
        };
        web.listen_popstate()?;
        web.load_initial_fragment();
        Ok(web)
    }

    /// Registers a callback receiving the displayed view after every change.
    #[wasm_bindgen(js_name = setViewListener)]
    pub fn set_view_listener(&self, listener: js_sys::Function) {
        *self.listener.borrow_mut() = Some(listener);
    }

    #[wasm_bindgen(js_name = onMapIdle)]
    pub fn on_map_idle(&self) {
        let this = self.handle();
        wasm_bindgen_futures::spawn_local(async move {
            this.viewer.on_map_idle().await;
            this.notify();
        });
    }

    #[wasm_bindgen(js_name = onBoundsChanged)]
    pub fn on_bounds_changed(&self) {
        self.viewer.on_bounds_changed();
    }

    #[wasm_bindgen(js_name = onMapClick)]
    pub fn on_map_click(&self) {
        self.viewer.on_map_click();
    }

    /// Resolves to the preview for a clicked marker, or `null`.
    #[wasm_bindgen(js_name = onMarkerClick)]
    pub fn on_marker_click(&self, key: String) -> js_sys::Promise {
        let viewer = self.viewer.clone();
        wasm_bindgen_futures::future_to_promise(async move {
            let Some(key) = LocationKey::parse(&key) else {
                return Ok(JsValue::NULL);
            };
            let preview = match viewer.on_marker_click(&key).await {
                Some(MarkerPreview::Photo { photo_id, more }) => PreviewJs::Photo { photo_id, more },
                Some(MarkerPreview::NoPhotosInRange { first, last }) => {
                    PreviewJs::NoPhotos { first, last }
                }
                None => return Ok(JsValue::NULL),
            };
            serde_wasm_bindgen::to_value(&preview).map_err(JsValue::from)
        })
    }

    #[wasm_bindgen(js_name = showGrid)]
    pub fn show_grid(&self, g: &str) {
        match GridKey::parse(g) {
            Some(g) => self.navigate(UiEvent::ShowGrid(g)),
            None => log::warn!("Ignoring grid with bad key {:?}", g),
        }
    }

    #[wasm_bindgen(js_name = hideGrid)]
    pub fn hide_grid(&self) {
        self.navigate(UiEvent::HideGrid);
    }

    #[wasm_bindgen(js_name = openPreviewPanel)]
    pub fn open_preview_panel(&self) {
        self.navigate(UiEvent::OpenPreviewPanel);
    }

    #[wasm_bindgen(js_name = showPhotoPreview)]
    pub fn show_photo_preview(&self, photo_id: String) {
        self.navigate(UiEvent::ShowPhotoPreview(photo_id));
    }

    #[wasm_bindgen(js_name = closePreviewPanel)]
    pub fn close_preview_panel(&self) {
        self.navigate(UiEvent::ClosePreviewPanel);
    }

    /// Slider drag; markers restyle once the drag settles. One timer loop
    /// serves the whole drag.
    pub fn slide(&self, first: i32, last: i32) {
        if !self.viewer.slide(YearRange::new(first, last), Instant::now()) {
            return;
        }

        let this = self.handle();
        wasm_bindgen_futures::spawn_local(async move {
            while let Some(delay) = this.viewer.slider_delay(Instant::now()) {
                sleep_ms(delay.as_millis() as u32).await;
                if this.viewer.poll_slider(Instant::now()) {
                    this.notify();
                }
            }
        });
    }

    /// Label positions for a chart `width` pixels wide: `[first, last, left, right]`.
    #[wasm_bindgen(js_name = yearLabels)]
    pub fn year_labels(&self, width: f64) -> Vec<i32> {
        let labels = self.viewer.year_labels(width);
        vec![labels.first, labels.last, labels.left_px, labels.right_px]
    }

    #[wasm_bindgen(js_name = clearFilters)]
    pub fn clear_filters(&self) {
        self.viewer.clear_filters();
        self.notify();
    }

    #[wasm_bindgen(js_name = showAll)]
    pub fn show_all(&self) {
        self.viewer.show_all();
        self.notify();
    }

    #[wasm_bindgen(js_name = setSearchLocation)]
    pub fn set_search_location(&self, lat: f64, lng: f64, title: &str) {
        self.viewer.set_search_location(lat_lng(lat, lng), title);
        self.notify();
    }

    /// Today's popular shelf.
    #[wasm_bindgen(js_name = popularPhotos)]
    pub fn popular_photos(&self) -> Result<JsValue, JsValue> {
        let today = chrono::Local::now().date_naive();
        serde_wasm_bindgen::to_value(&self.viewer.popular_photos(today)).map_err(JsValue::from)
    }

    pub fn description(&self, photo_id: &str) -> String {
        self.viewer.description(photo_id)
    }

    #[wasm_bindgen(js_name = shareUrl)]
    pub fn share_url(&self, photo_id: &str) -> String {
        self.viewer.share_url(photo_id)
    }
}

impl WebViewer {
    fn handle(&self) -> WebViewer {
        WebViewer {
            viewer: self.viewer.clone(),
            listener: self.listener.clone(),
        }
    }

    fn navigate(&self, event: UiEvent) {
        let this = self.handle();
        wasm_bindgen_futures::spawn_local(async move {
            if this.viewer.navigate(event).await.is_some() {
                this.notify();
            }
        });
    }

    fn load_initial_fragment(&self) {
        let hash = web_sys::window()
            .and_then(|w| w.location().hash().ok())
            .unwrap_or_default();
        let this = self.handle();
        wasm_bindgen_futures::spawn_local(async move {
            if this.viewer.load_fragment(&hash).await.is_some() {
                this.notify();
            }
        });
    }

    fn listen_popstate(&self) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let this = self.handle();

        let onpopstate = Closure::wrap(Box::new(move |event: web_sys::PopStateEvent| {
            let navigation = this
                .viewer
                .with_history(|history| history.on_popstate(event.state()));
            let this = this.handle();
            wasm_bindgen_futures::spawn_local(async move {
                if this.viewer.handle_navigation(navigation).await.is_some() {
                    this.notify();
                }
            });
        }) as Box<dyn FnMut(_)>);

        window.add_event_listener_with_callback("popstate", onpopstate.as_ref().unchecked_ref())?;
        onpopstate.forget(); // Lives as long as the page
        Ok(())
    }

    /// Sends the displayed view to the page's listener.
    fn notify(&self) {
        let Some(listener) = self.listener.borrow().clone() else {
            return;
        };

        let displayed = self.viewer.displayed();
        let state = displayed.state();
        let grid = displayed.grid();
        let range = self
            .viewer
            .engine()
            .with_context(|ctx| ctx.filter.range());
        let snapshot = ViewSnapshot {
            mode: state.mode().css_class(),
            g: grid.map(|grid| grid.key.as_str()),
            photo_ids: grid.map(|grid| grid.photo_ids.as_slice()).unwrap_or(&[]),
            selected: state.photo_id.as_deref(),
            filtered: grid.map(|grid| grid.filtered).unwrap_or(false),
            year_range: [range.first, range.last],
            show_clear_filters: self.viewer.show_clear_filters(),
        };

        match serde_wasm_bindgen::to_value(&snapshot) {
            Ok(value) => {
                if let Err(e) = listener.call1(&JsValue::NULL, &value) {
                    log::warn!("View listener failed: {:?}", e);
                }
            }
            Err(e) => log::error!("Failed to convert view snapshot: {}", e),
        }
    }
}
