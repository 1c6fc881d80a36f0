//! Session history through the browser History API.
//!
//! The browser does not let a page read earlier entries, so the entries
//! pushed during this session are mirrored here. Each stored state object
//! carries its position in the mirror; `popstate` uses it to resync.

use crate::engine::{BackTarget, EntryStack, HistoryAdapter, HistoryEntry, HistoryError, Navigation};
use crate::state::{parse_fragment, ParsedFragment, ViewState};
use serde::{Deserialize, Serialize};
use wasm_bindgen::JsValue;

#[derive(Serialize, Deserialize)]
struct StoredEntry {
    #[serde(flatten)]
    entry: HistoryEntry,
    depth: usize,
}

pub struct BrowserHistory {
    stack: EntryStack,
}

impl BrowserHistory {
    pub fn new() -> Self {
        Self {
            stack: EntryStack::new(),
        }
    }

    /// Resyncs with the entry the browser moved to and returns it as a
    /// navigation.
    ///
    /// Entries without a state object (the user edited the URL) are read
    /// from the location hash.
    pub fn on_popstate(&mut self, state: JsValue) -> Navigation {
        match serde_wasm_bindgen::from_value::<StoredEntry>(state) {
            Ok(stored) => {
                self.stack.move_to(stored.depth);
                Navigation::user(stored.entry.state)
            }
            Err(_) => {
                let hash = web_sys::window()
                    .and_then(|w| w.location().hash().ok())
                    .unwrap_or_default();
                let state = match parse_fragment(&hash) {
                    ParsedFragment::Ready(state) => state,
                    ParsedFragment::NeedsLookup(photo_id) => ViewState::photo(photo_id, None),
                };
                Navigation::user(state)
            }
        }
    }

    fn write(&self, entry: &HistoryEntry, replace: bool) -> Result<(), HistoryError> {
        let window = web_sys::window().ok_or(HistoryError::Unavailable)?;
        let history = window
            .history()
            .map_err(|e| HistoryError::Rejected(format!("{:?}", e)))?;

        let stored = StoredEntry {
            entry: entry.clone(),
            depth: self.stack.index(),
        };
        // Plain objects survive structured cloning into the history entry.
        let value = stored
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
            .map_err(|e| HistoryError::Serialization(e.to_string()))?;

        let result = if replace {
            history.replace_state_with_url(&value, &entry.title, Some(&entry.fragment))
        } else {
            history.push_state_with_url(&value, &entry.title, Some(&entry.fragment))
        };
        result.map_err(|e| HistoryError::Rejected(format!("{:?}", e)))?;

        if let Some(document) = window.document() {
            document.set_title(&entry.title);
        }
        Ok(())
    }
}

impl Default for BrowserHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryAdapter for BrowserHistory {
    fn push_state(&mut self, entry: HistoryEntry) -> Result<(), HistoryError> {
        self.stack.push(entry.clone());
        self.write(&entry, false)
    }

    fn replace_state(&mut self, entry: HistoryEntry) -> Result<(), HistoryError> {
        self.stack.replace(entry.clone());
        self.write(&entry, true)
    }

    fn go_back_until(
        &mut self,
        target: BackTarget,
        fallback: HistoryEntry,
    ) -> Result<(), HistoryError> {
        let from = self.stack.index();
        let Some(steps) = self.stack.back_until(target) else {
            return self.push_state(fallback);
        };

        // The mirror moves now; the browser's popstate arrives later and
        // confirms the same position.
        let result = web_sys::window()
            .ok_or(HistoryError::Unavailable)
            .and_then(|window| {
                window
                    .history()
                    .and_then(|history| history.go_with_delta(-(steps as i32)))
                    .map_err(|e| HistoryError::Rejected(format!("{:?}", e)))
            });
        log::debug!("Going back {} entries", steps);
        if result.is_err() {
            self.stack.move_to(from);
        }
        result
    }
}
