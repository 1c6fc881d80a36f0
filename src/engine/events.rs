//! The two message directions between the UI and history.
//!
//! - [`UiEvent`]: something the user did. Recorded into history by the
//!   `HistoryRecorder`; never consumed by the transition engine.
//! - [`Navigation`]: a state the browser wants shown (back/forward, initial
//!   load). Applied by the transition engine; never recorded.
//!
//! Keeping them as separate types means applying a state has no way to
//! produce a history entry.

use crate::geo::GridKey;
use crate::state::ViewState;

/// Semantic events emitted by the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// A location pin (or the popular shelf) was opened.
    ShowGrid(GridKey),
    /// The grid was closed.
    HideGrid,
    /// The photo panel is about to open; a photo id follows.
    OpenPreviewPanel,
    /// A photo is shown in the preview panel.
    ShowPhotoPreview(String),
    /// The photo panel was closed, back to the grid.
    ClosePreviewPanel,
}

/// Where an inbound navigation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationKind {
    /// Back/forward button or an edited URL.
    User,
    /// The fragment present when the page loaded.
    PageLoad,
}

/// A state to apply, delivered by the history layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub kind: NavigationKind,
    pub state: ViewState,
}

impl Navigation {
    pub fn user(state: ViewState) -> Self {
        Self {
            kind: NavigationKind::User,
            state,
        }
    }

    pub fn page_load(state: ViewState) -> Self {
        Self {
            kind: NavigationKind::PageLoad,
            state,
        }
    }
}
