//! Binding to the map widget implemented by the page.
//!
//! The page passes an object with these methods:
//!
//! ```text
//! getBounds()            -> [south, west, north, east] | null
//! panTo(lat, lng)
//! setZoom(zoom)
//! upsertMarker({key, lat, lng, icon, zIndex, count})
//! setSearchPin({lat, lng, title} | null)
//! ```

use crate::geo::{Bounds, LatLng};
use crate::map::{MapWidget, Marker, SearchPin};
use serde::Serialize;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    pub type JsMap;

    #[wasm_bindgen(method, js_name = getBounds)]
    fn get_bounds(this: &JsMap) -> JsValue;

    #[wasm_bindgen(method, js_name = panTo)]
    fn pan_to(this: &JsMap, lat: f64, lng: f64);

    #[wasm_bindgen(method, js_name = setZoom)]
    fn set_zoom(this: &JsMap, zoom: u8);

    #[wasm_bindgen(method, js_name = upsertMarker)]
    fn upsert_marker(this: &JsMap, marker: JsValue);

    #[wasm_bindgen(method, js_name = setSearchPin)]
    fn set_search_pin(this: &JsMap, pin: JsValue);
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MarkerJs<'a> {
    key: &'a str,
    lat: f64,
    lng: f64,
    icon: &'static str,
    z_index: i32,
    count: u32,
}

#[derive(Serialize)]
struct SearchPinJs<'a> {
    lat: f64,
    lng: f64,
    title: &'a str,
}

fn to_js<T: Serialize>(value: &T) -> JsValue {
    serde_wasm_bindgen::to_value(value).unwrap_or_else(|e| {
        log::error!("Failed to convert map update: {}", e);
        JsValue::NULL
    })
}

impl MapWidget for JsMap {
    fn bounds(&self) -> Option<Bounds> {
        let [south, west, north, east] =
            serde_wasm_bindgen::from_value::<[f64; 4]>(self.get_bounds()).ok()?;
        Some(Bounds::from_lat_lon(south, west, north, east))
    }

    fn pan_to(&self, position: LatLng) {
        JsMap::pan_to(self, position.y, position.x);
    }

    fn set_zoom(&self, zoom: u8) {
        JsMap::set_zoom(self, zoom);
    }

    fn upsert_marker(&self, marker: &Marker) {
        let position = marker.position();
        JsMap::upsert_marker(
            self,
            to_js(&MarkerJs {
                key: marker.key.as_str(),
                lat: position.y,
                lng: position.x,
                icon: marker.icon.as_str(),
                z_index: marker.z_index,
                count: marker.count,
            }),
        );
    }

    fn set_search_pin(&self, pin: Option<&SearchPin>) {
        let value = match pin {
            Some(pin) => to_js(&SearchPinJs {
                lat: pin.position.y,
                lng: pin.position.x,
                title: &pin.title,
            }),
            None => JsValue::NULL,
        };
        JsMap::set_search_pin(self, value);
    }
}
