//! History adapter interface.
//!
//! The browser's session history is an external collaborator. The recorder
//! pushes and replaces entries through [`HistoryAdapter`]; inbound
//! navigations come back as [`Navigation`](super::Navigation) values.
//!
//! On WASM targets the browser implementation lives in `crate::web`. Native
//! builds get [`native::MemoryHistory`], an in-memory stack with the same
//! semantics.

use crate::state::{encode, ViewState};
use serde::{Deserialize, Serialize};

/// Errors that can occur while updating session history.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryError {
    /// No history object is available (e.g. no window).
    Unavailable,
    /// The browser refused the update.
    Rejected(String),
    /// The entry could not be converted to a history state object.
    Serialization(String),
}

impl std::fmt::Display for HistoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HistoryError::Unavailable => write!(f, "History is not available"),
            HistoryError::Rejected(msg) => write!(f, "History update rejected: {}", msg),
            HistoryError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for HistoryError {}

/// Marks entries that "go back until" looks for.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryTag {
    #[default]
    Normal,
    /// The entry the page was loaded with.
    Initial,
    /// Pushed while the photo panel opens; replaced right away.
    Transient,
}

/// Entries [`HistoryAdapter::go_back_until`] can walk back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackTarget {
    /// The page-load entry.
    Initial,
    /// Any entry showing a grid.
    Grid,
}

impl BackTarget {
    pub fn matches(&self, entry: &HistoryEntry) -> bool {
        match self {
            BackTarget::Initial => entry.tag == EntryTag::Initial,
            BackTarget::Grid => entry.tag != EntryTag::Transient && entry.state.g.is_some(),
        }
    }
}

/// One session history entry.
///
/// Only `state` and `tag` are stored in the browser's state object; title
/// and fragment are passed alongside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(flatten)]
    pub state: ViewState,
    #[serde(default)]
    pub tag: EntryTag,
    #[serde(skip)]
    pub title: String,
    #[serde(skip)]
    pub fragment: String,
}

impl HistoryEntry {
    pub fn new(state: ViewState, app_name: &str) -> Self {
        Self {
            title: page_title(&state, app_name),
            fragment: url_fragment(&state),
            state,
            tag: EntryTag::Normal,
        }
    }

    pub fn with_tag(mut self, tag: EntryTag) -> Self {
        self.tag = tag;
        self
    }
}

/// Document title for a state.
pub fn page_title(state: &ViewState, app_name: &str) -> String {
    match (&state.photo_id, &state.g) {
        (Some(id), _) => format!("{} - Photo {}", app_name, id),
        (None, Some(_)) => format!("{} - Grid", app_name),
        (None, None) => app_name.to_string(),
    }
}

/// URL for a state, e.g. `/#g:43.65,-79.38`.
pub fn url_fragment(state: &ViewState) -> String {
    format!("/#{}", encode(state))
}

/// Operations the recorder needs from session history.
pub trait HistoryAdapter {
    /// Adds an entry after the current one, dropping any forward entries.
    fn push_state(&mut self, entry: HistoryEntry) -> Result<(), HistoryError>;

    /// Overwrites the current entry.
    fn replace_state(&mut self, entry: HistoryEntry) -> Result<(), HistoryError>;

    /// Goes back to the closest earlier entry matching `target`, or pushes
    /// `fallback` if there is none.
    ///
    /// Going back delivers the entry's state as a user navigation.
    fn go_back_until(
        &mut self,
        target: BackTarget,
        fallback: HistoryEntry,
    ) -> Result<(), HistoryError>;
}

/// The entries pushed during this session and the position among them.
///
/// Starts with a single untagged map entry, like a freshly loaded page.
#[derive(Debug, Clone)]
pub struct EntryStack {
    entries: Vec<HistoryEntry>,
    index: usize,
}

impl Default for EntryStack {
    fn default() -> Self {
        Self::new()
    }
}

impl EntryStack {
    pub fn new() -> Self {
        Self {
            entries: vec![HistoryEntry::new(ViewState::map(), "")],
            index: 0,
        }
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> &HistoryEntry {
        &self.entries[self.index]
    }

    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.truncate(self.index + 1);
        self.entries.push(entry);
        self.index = self.entries.len() - 1;
    }

    pub fn replace(&mut self, entry: HistoryEntry) {
        self.entries[self.index] = entry;
    }

    /// Moves to `index`. Out-of-range positions are ignored.
    pub fn move_to(&mut self, index: usize) -> bool {
        if index >= self.entries.len() {
            return false;
        }
        self.index = index;
        true
    }

    /// Moves to the closest earlier entry matching `target` and returns how
    /// many entries back it is.
    ///
    /// The current entry never matches.
    pub fn back_until(&mut self, target: BackTarget) -> Option<usize> {
        let found = self.entries[..self.index]
            .iter()
            .rposition(|entry| target.matches(entry))?;
        let steps = self.index - found;
        self.index = found;
        Some(steps)
    }
}

// Native in-memory implementation for development/testing
#[cfg(not(target_arch = "wasm32"))]
pub mod native {
    use super::*;
    use crate::engine::Navigation;

    /// A session history stack held in memory.
    ///
    /// Navigations a browser would deliver through `popstate` are queued and
    /// can be taken with [`MemoryHistory::take_navigations`].
    #[derive(Debug, Default)]
    pub struct MemoryHistory {
        stack: EntryStack,
        navigations: Vec<Navigation>,
    }

    impl MemoryHistory {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn entries(&self) -> &[HistoryEntry] {
            self.stack.entries()
        }

        pub fn len(&self) -> usize {
            self.stack.entries().len()
        }

        pub fn is_empty(&self) -> bool {
            self.stack.entries().is_empty()
        }

        pub fn index(&self) -> usize {
            self.stack.index()
        }

        pub fn current(&self) -> &HistoryEntry {
            self.stack.current()
        }

        /// The back button.
        pub fn back(&mut self) -> Option<Navigation> {
            let index = self.stack.index().checked_sub(1)?;
            self.stack.move_to(index);
            Some(Navigation::user(self.current().state.clone()))
        }

        /// The forward button.
        pub fn forward(&mut self) -> Option<Navigation> {
            if !self.stack.move_to(self.stack.index() + 1) {
                return None;
            }
            Some(Navigation::user(self.current().state.clone()))
        }

        pub fn take_navigations(&mut self) -> Vec<Navigation> {
            std::mem::take(&mut self.navigations)
        }
    }

    impl HistoryAdapter for MemoryHistory {
        fn push_state(&mut self, entry: HistoryEntry) -> Result<(), HistoryError> {
            self.stack.push(entry);
            Ok(())
        }

        fn replace_state(&mut self, entry: HistoryEntry) -> Result<(), HistoryError> {
            self.stack.replace(entry);
            Ok(())
        }

        fn go_back_until(
            &mut self,
            target: BackTarget,
            fallback: HistoryEntry,
        ) -> Result<(), HistoryError> {
            match self.stack.back_until(target) {
                Some(_) => {
                    self.navigations
                        .push(Navigation::user(self.current().state.clone()));
                    Ok(())
                }
                None => self.push_state(fallback),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::native::MemoryHistory;
    use super::*;
    use crate::geo::GridKey;
    use crate::engine::Navigation;

    fn grid() -> ViewState {
        ViewState::grid(GridKey::parse("43.65,-79.38").unwrap())
    }

    #[test]
    fn test_titles_and_fragments() {
        assert_eq!(page_title(&ViewState::photo("123", None), "OldTO"), "OldTO - Photo 123");
        assert_eq!(page_title(&grid(), "OldTO"), "OldTO - Grid");
        assert_eq!(page_title(&ViewState::map(), "OldTO"), "OldTO");
        assert_eq!(url_fragment(&grid()), "/#g:43.65,-79.38");
        assert_eq!(url_fragment(&ViewState::map()), "/#");
    }

    #[test]
    fn test_entry_state_object() {
        let entry = HistoryEntry::new(grid(), "OldTO").with_tag(EntryTag::Initial);
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(json, r#"{"g":"43.65,-79.38","tag":"initial"}"#);

        let back: HistoryEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back.state, grid());
        assert_eq!(back.tag, EntryTag::Initial);
    }

    #[test]
    fn test_go_back_until_found() {
        let mut history = MemoryHistory::new();
        history
            .replace_state(HistoryEntry::new(ViewState::map(), "OldTO").with_tag(EntryTag::Initial))
            .unwrap();
        history.push_state(HistoryEntry::new(grid(), "OldTO")).unwrap();
        history
            .push_state(HistoryEntry::new(ViewState::photo("1", None), "OldTO"))
            .unwrap();

        history
            .go_back_until(BackTarget::Grid, HistoryEntry::new(grid(), "OldTO"))
            .unwrap();
        assert_eq!(history.index(), 1);
        assert_eq!(history.len(), 3);
        assert_eq!(history.take_navigations(), vec![Navigation::user(grid())]);

        history
            .go_back_until(BackTarget::Initial, HistoryEntry::new(ViewState::map(), "OldTO"))
            .unwrap();
        assert_eq!(history.index(), 0);
    }

    #[test]
    fn test_go_back_until_falls_back_to_push() {
        let mut history = MemoryHistory::new();
        history
            .replace_state(HistoryEntry::new(grid(), "OldTO").with_tag(EntryTag::Initial))
            .unwrap();

        // The current entry never matches; only earlier ones do.
        history
            .go_back_until(BackTarget::Initial, HistoryEntry::new(ViewState::map(), "OldTO"))
            .unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history.current().state, ViewState::map());
        assert!(history.take_navigations().is_empty());
    }

    #[test]
    fn test_back_until_moves_before_replace() {
        let mut stack = EntryStack::new();
        stack.replace(HistoryEntry::new(grid(), "OldTO"));
        stack.push(HistoryEntry::new(ViewState::photo("1", None), "OldTO"));
        stack.push(HistoryEntry::new(ViewState::photo("2", None), "OldTO"));

        assert_eq!(stack.back_until(BackTarget::Grid), Some(2));
        assert_eq!(stack.index(), 0);

        // A replace issued before the browser reports the move lands on the
        // entry being returned to, not the one being left.
        let selected = ViewState::photo("1", GridKey::parse("43.65,-79.38"));
        stack.replace(HistoryEntry::new(selected.clone(), "OldTO"));
        assert_eq!(stack.entries()[0].state, selected);
        assert_eq!(stack.entries()[2].state, ViewState::photo("2", None));

        assert_eq!(stack.back_until(BackTarget::Grid), None);
        assert_eq!(stack.index(), 0);
    }

    #[test]
    fn test_move_to_ignores_unknown_positions() {
        let mut stack = EntryStack::new();
        stack.push(HistoryEntry::new(grid(), "OldTO"));
        assert!(!stack.move_to(5));
        assert_eq!(stack.index(), 1);
        assert!(stack.move_to(0));
        assert_eq!(stack.current().state, ViewState::map());
    }

    #[test]
    fn test_push_drops_forward_entries() {
        let mut history = MemoryHistory::new();
        history.push_state(HistoryEntry::new(grid(), "OldTO")).unwrap();
        assert!(history.back().is_some());
        history
            .push_state(HistoryEntry::new(ViewState::grid(GridKey::Popular), "OldTO"))
            .unwrap();
        assert_eq!(history.len(), 2);
        assert!(history.forward().is_none());
    }
}
