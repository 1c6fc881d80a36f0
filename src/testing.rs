//! Test doubles shared by the unit tests.

use crate::data::{LocationPhotos, PhotoInfo, PhotoService, ServiceError};
use crate::geo::{Bounds, GridKey, LatLng, LocationKey};
use crate::map::{MapWidget, Marker, SearchPin};
use futures_channel::oneshot;
use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

#[derive(Debug, Default)]
pub struct MapLog {
    pub bounds: Option<Bounds>,
    pub pans: Vec<LatLng>,
    pub zooms: Vec<u8>,
    pub upserts: Vec<Marker>,
    pub search_pin: Option<SearchPin>,
}

type PanHook = Rc<dyn Fn()>;

/// A map widget that records every call. Clones share the same log.
#[derive(Clone, Default)]
pub struct RecordingMap {
    log: Rc<RefCell<MapLog>>,
    on_pan: Rc<RefCell<Option<PanHook>>>,
}

impl RecordingMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bounds(bounds: Bounds) -> Self {
        let map = Self::new();
        map.log.borrow_mut().bounds = Some(bounds);
        map
    }

    pub fn set_bounds(&self, bounds: Bounds) {
        self.log.borrow_mut().bounds = Some(bounds);
    }

    /// Runs `f` after every pan, the way a real widget fires its own
    /// notifications from inside the call.
    pub fn on_pan(&self, f: impl Fn() + 'static) {
        *self.on_pan.borrow_mut() = Some(Rc::new(f));
    }

    pub fn upserts(&self) -> Vec<Marker> {
        self.log.borrow().upserts.clone()
    }

    /// Distinct marker keys the widget has been told about.
    pub fn marker_keys(&self) -> Vec<LocationKey> {
        let mut keys: Vec<LocationKey> = Vec::new();
        for marker in &self.log.borrow().upserts {
            if !keys.contains(&marker.key) {
                keys.push(marker.key.clone());
            }
        }
        keys
    }

    pub fn pans(&self) -> Vec<LatLng> {
        self.log.borrow().pans.clone()
    }

    pub fn zooms(&self) -> Vec<u8> {
        self.log.borrow().zooms.clone()
    }

    pub fn search_pin(&self) -> Option<SearchPin> {
        self.log.borrow().search_pin.clone()
    }
}

impl MapWidget for RecordingMap {
    fn bounds(&self) -> Option<Bounds> {
        self.log.borrow().bounds
    }

    fn pan_to(&self, position: LatLng) {
        self.log.borrow_mut().pans.push(position);
        let hook = self.on_pan.borrow().clone();
        if let Some(hook) = hook {
            hook();
        }
    }

    fn set_zoom(&self, zoom: u8) {
        self.log.borrow_mut().zooms.push(zoom);
    }

    fn upsert_marker(&self, marker: &Marker) {
        self.log.borrow_mut().upserts.push(marker.clone());
    }

    fn set_search_pin(&self, pin: Option<&SearchPin>) {
        self.log.borrow_mut().search_pin = pin.cloned();
    }
}

type GridReply = Result<LocationPhotos, ServiceError>;
type LookupReply = Result<LocationKey, ServiceError>;

/// A photo service whose responses are released by the test.
#[derive(Default)]
pub struct ScriptedService {
    waiting: RefCell<HashMap<GridKey, oneshot::Receiver<GridReply>>>,
    lookups: RefCell<HashMap<String, oneshot::Receiver<LookupReply>>>,
}

impl ScriptedService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a grid request and returns the handle that answers it.
    pub fn expect(&self, grid: GridKey) -> oneshot::Sender<GridReply> {
        let (tx, rx) = oneshot::channel();
        self.waiting.borrow_mut().insert(grid, rx);
        tx
    }

    /// Registers a photo lookup and returns the handle that answers it.
    /// Unregistered photos have no location.
    pub fn expect_lookup(&self, photo_id: &str) -> oneshot::Sender<LookupReply> {
        let (tx, rx) = oneshot::channel();
        self.lookups.borrow_mut().insert(photo_id.to_string(), rx);
        tx
    }
}

impl PhotoService for ScriptedService {
    async fn photos_at(&self, grid: &GridKey) -> Result<LocationPhotos, ServiceError> {
        let rx = self.waiting.borrow_mut().remove(grid);
        match rx {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err(ServiceError::Network("cancelled".into()))),
            None => Err(ServiceError::Status(404)),
        }
    }

    async fn locate_photo(&self, photo_id: &str) -> Result<LocationKey, ServiceError> {
        let rx = self.lookups.borrow_mut().remove(photo_id);
        match rx {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err(ServiceError::Network("cancelled".into()))),
            None => Err(ServiceError::NoLocation(photo_id.to_string())),
        }
    }
}

/// Polls a future once without a real executor.
pub fn poll_once<F: Future>(future: Pin<&mut F>) -> Poll<F::Output> {
    let mut cx = Context::from_waker(futures_util::task::noop_waker_ref());
    future.poll(&mut cx)
}

/// Builds a by-location response from `(id, date)` pairs.
pub fn photos(entries: &[(&str, &str)]) -> LocationPhotos {
    entries
        .iter()
        .map(|(id, date)| {
            (
                id.to_string(),
                PhotoInfo {
                    title: format!("Photo {}", id),
                    date: date.to_string(),
                    ..Default::default()
                },
            )
        })
        .collect()
}

pub fn key(s: &str) -> LocationKey {
    LocationKey::parse(s).unwrap()
}

pub fn grid(s: &str) -> GridKey {
    GridKey::parse(s).unwrap()
}
