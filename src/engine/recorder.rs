//! Turns UI events into session history entries.
//!
//! Mapping:
//!
//! | event               | history operation                               |
//! |---------------------|-------------------------------------------------|
//! | `ShowGrid(g)`       | push `{g}`                                      |
//! | `HideGrid`          | back to the initial entry, else push `{}`       |
//! | `OpenPreviewPanel`  | push a transient entry                          |
//! | `ShowPhotoPreview`  | replace with `{photo_id}` (`g:pop` kept)        |
//! | `ClosePreviewPanel` | back to a grid entry, else push `{g}`           |
//!
//! The recorder only writes history. Showing the recorded state is the
//! transition engine's job.

use super::events::UiEvent;
use super::history::{BackTarget, EntryTag, HistoryAdapter, HistoryEntry};
use crate::geo::GridKey;
use crate::state::ViewState;

pub struct HistoryRecorder<H> {
    history: H,
    app_name: String,
}

impl<H: HistoryAdapter> HistoryRecorder<H> {
    pub fn new(history: H, app_name: impl Into<String>) -> Self {
        Self {
            history,
            app_name: app_name.into(),
        }
    }

    pub fn history(&self) -> &H {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut H {
        &mut self.history
    }

    /// Tags the page-load entry so "hide grid" can return to it.
    pub fn initialize(&mut self, state: &ViewState) {
        let entry = self.entry(state.clone()).with_tag(EntryTag::Initial);
        if let Err(e) = self.history.replace_state(entry) {
            log::warn!("Failed to tag initial history entry: {}", e);
        }
    }

    /// Records `event` and returns the state the UI should now show.
    ///
    /// `displayed_grid` is the grid currently on screen, if any. Returns
    /// `None` for events that do not change the view on their own.
    pub fn record(&mut self, event: &UiEvent, displayed_grid: Option<&GridKey>) -> Option<ViewState> {
        log::debug!("Recording {:?}", event);

        let (result, target) = match event {
            UiEvent::ShowGrid(g) => {
                let state = ViewState::grid(g.clone());
                let entry = self.entry(state.clone());
                (self.history.push_state(entry), Some(state))
            }
            UiEvent::HideGrid => {
                let state = ViewState::map();
                let fallback = self.entry(state.clone()).with_tag(EntryTag::Initial);
                (
                    self.history.go_back_until(BackTarget::Initial, fallback),
                    Some(state),
                )
            }
            UiEvent::OpenPreviewPanel => {
                let state = ViewState {
                    photo_id: None,
                    g: displayed_grid.cloned(),
                };
                let mut entry = self.entry(state).with_tag(EntryTag::Transient);
                entry.title = format!("{} - Photo", self.app_name);
                (self.history.push_state(entry), None)
            }
            UiEvent::ShowPhotoPreview(photo_id) => {
                let g = displayed_grid.filter(|g| g.is_popular()).cloned();
                let state = ViewState::photo(photo_id.clone(), g);
                let target = ViewState::photo(photo_id.clone(), displayed_grid.cloned());
                let entry = self.entry(state);
                (self.history.replace_state(entry), Some(target))
            }
            UiEvent::ClosePreviewPanel => {
                let state = ViewState {
                    photo_id: None,
                    g: displayed_grid.cloned(),
                };
                let fallback = self.entry(state.clone());
                (
                    self.history.go_back_until(BackTarget::Grid, fallback),
                    Some(state),
                )
            }
        };

        if let Err(e) = result {
            log::warn!("Failed to record {:?}: {}", event, e);
        }
        target
    }

    /// Rewrites the current entry with the state actually on screen, for
    /// when the recorded one could not be shown.
    pub fn restore(&mut self, displayed: &ViewState) {
        log::debug!("Restoring history entry for {:?}", displayed);
        let entry = self.entry(displayed.clone());
        if let Err(e) = self.history.replace_state(entry) {
            log::warn!("Failed to restore history entry: {}", e);
        }
    }

    fn entry(&self, state: ViewState) -> HistoryEntry {
        HistoryEntry::new(state, &self.app_name)
    }
}
