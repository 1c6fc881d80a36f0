//! Map widget interface and marker model.
//!
//! The concrete map (tiles, projection, marker drawing) is an external
//! collaborator behind [`MapWidget`]. This module owns what the markers
//! should look like; the widget only mirrors it.

pub mod markers;

use crate::geo::{Bounds, LatLng, LocationKey};
use std::cell::RefCell;
use std::rc::Rc;

pub use markers::MarkerIndex;

/// Icon variants a marker can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerIcon {
    /// Location has photos under the active filter.
    Default,
    /// Location has no photos under the active filter.
    Filtered,
    /// The currently selected location.
    Selected,
    /// Address search / current location result.
    SearchPin,
}

impl MarkerIcon {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarkerIcon::Default => "default",
            MarkerIcon::Filtered => "filtered",
            MarkerIcon::Selected => "selected",
            MarkerIcon::SearchPin => "search-pin",
        }
    }
}

/// A materialized location pin.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub key: LocationKey,
    pub icon: MarkerIcon,
    pub z_index: i32,
    /// Photos at this location under the filter the marker was last styled with.
    pub count: u32,
}

impl Marker {
    pub fn position(&self) -> LatLng {
        self.key.position()
    }
}

/// The single address-search pin.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPin {
    pub position: LatLng,
    pub title: String,
}

/// Operations the viewer needs from the map widget.
///
/// Widgets are shared handles; a call may synchronously fire the widget's
/// own notifications (bounds changed, idle) back into the viewer.
pub trait MapWidget {
    /// Currently visible bounds. `None` until the map has laid itself out.
    fn bounds(&self) -> Option<Bounds>;

    fn pan_to(&self, position: LatLng);

    fn set_zoom(&self, zoom: u8);

    /// Creates the marker on first call for a key, updates it afterwards.
    fn upsert_marker(&self, marker: &Marker);

    /// Shows, moves or (with `None`) removes the search pin.
    fn set_search_pin(&self, pin: Option<&SearchPin>);
}

/// A deferred widget mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum MapCommand {
    PanTo(LatLng),
    SetZoom(u8),
    UpsertMarker(Marker),
    SetSearchPin(Option<SearchPin>),
}

/// Buffers widget mutations until [`MapQueue::flush`].
///
/// Reads go straight to the widget. Mutations are queued so they can be
/// issued after the viewer has released its own state; a widget that calls
/// back into the viewer then finds it unlocked.
pub struct MapQueue {
    map: Rc<dyn MapWidget>,
    commands: RefCell<Vec<MapCommand>>,
}

impl MapQueue {
    pub fn new(map: Rc<dyn MapWidget>) -> Self {
        Self {
            map,
            commands: RefCell::new(Vec::new()),
        }
    }

    pub fn pending(&self) -> usize {
        self.commands.borrow().len()
    }

    /// Sends queued commands to the widget in order.
    ///
    /// Commands queued by callbacks while flushing are sent by the nested
    /// flush that follows those callbacks.
    pub fn flush(&self) {
        let commands = std::mem::take(&mut *self.commands.borrow_mut());
        for command in commands {
            match command {
                MapCommand::PanTo(position) => self.map.pan_to(position),
                MapCommand::SetZoom(zoom) => self.map.set_zoom(zoom),
                MapCommand::UpsertMarker(marker) => self.map.upsert_marker(&marker),
                MapCommand::SetSearchPin(pin) => self.map.set_search_pin(pin.as_ref()),
            }
        }
    }

    fn push(&self, command: MapCommand) {
        self.commands.borrow_mut().push(command);
    }
}

impl MapWidget for MapQueue {
    fn bounds(&self) -> Option<Bounds> {
        self.map.bounds()
    }

    fn pan_to(&self, position: LatLng) {
        self.push(MapCommand::PanTo(position));
    }

    fn set_zoom(&self, zoom: u8) {
        self.push(MapCommand::SetZoom(zoom));
    }

    fn upsert_marker(&self, marker: &Marker) {
        self.push(MapCommand::UpsertMarker(marker.clone()));
    }

    fn set_search_pin(&self, pin: Option<&SearchPin>) {
        self.push(MapCommand::SetSearchPin(pin.cloned()));
    }
}
