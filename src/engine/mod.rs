//! View-state synchronization.
//!
//! ## Directions
//! - record: `UiEvent` -> `HistoryRecorder` -> `HistoryAdapter`
//! - apply: `Navigation` -> `TransitionEngine` -> markers, filter, grid
//!
//! The engine owns the shared [`ViewerContext`] and the displayed view; the
//! recorder owns the history adapter. Neither can reach the other.

mod context;
pub mod events;
pub mod history;
pub mod recorder;
pub mod transition;

pub use context::{MarkerPreview, ViewerContext};
pub use events::{Navigation, NavigationKind, UiEvent};
pub use history::{BackTarget, EntryStack, EntryTag, HistoryAdapter, HistoryEntry, HistoryError};
pub use recorder::HistoryRecorder;
pub use transition::{DisplayedView, GridView, TransitionEngine, TransitionOutcome};

#[cfg(not(target_arch = "wasm32"))]
pub use history::native::MemoryHistory;
