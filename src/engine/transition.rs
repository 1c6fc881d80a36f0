//! Reconciles the displayed view with a target view state.
//!
//! The engine owns what is on screen ([`DisplayedView`]) and is the only
//! writer of it. Given a target it does the least work needed:
//!
//! 1. normalize the target through the URL codec (fills in the location of
//!    a bare photo id)
//! 2. stop if it equals the displayed state, or is already being fetched
//! 3. empty target: close the grid
//! 4. different grid: fetch its photos, then select the marker, pan if
//!    needed and show the grid with the requested photo
//! 5. same grid: change the selected photo only
//!
//! Service calls (the photo lookup as well as the grid fetch) carry a
//! request token. Only the latest request may update the view; a response
//! for anything older is dropped. Nothing is changed on screen until the
//! fetch has succeeded.
//!
//! Map widget updates are queued while the engine state is borrowed and
//! sent once it is released, so widget notifications may call back in.
//!
//! The engine has no access to history, so applying a state can never
//! record one.

use super::context::ViewerContext;
use crate::data::PhotoService;
use crate::geo::{GridKey, LocationKey};
use crate::map::MapQueue;
use crate::state::url_state::decode_with_hint;
use crate::state::{encode, parse_fragment, ParsedFragment, ViewMode, ViewState};
use std::cell::RefCell;
use std::rc::Rc;

/// A grid of photos on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridView {
    pub key: GridKey,
    /// Photo ids shown, in order, after the year filter.
    pub photo_ids: Vec<String>,
    /// Photo open in the preview panel.
    pub selected: Option<String>,
    /// Whether the year filter removed photos (shows the filter banner).
    pub filtered: bool,
}

/// What is currently on screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayedView {
    grid: Option<GridView>,
}

impl DisplayedView {
    pub fn state(&self) -> ViewState {
        match &self.grid {
            Some(grid) => ViewState {
                photo_id: grid.selected.clone(),
                g: Some(grid.key.clone()),
            },
            None => ViewState::map(),
        }
    }

    pub fn mode(&self) -> ViewMode {
        self.state().mode()
    }

    pub fn grid(&self) -> Option<&GridView> {
        self.grid.as_ref()
    }

    pub fn grid_key(&self) -> Option<&GridKey> {
        self.grid.as_ref().map(|grid| &grid.key)
    }
}

/// How a call to [`TransitionEngine::apply`] ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The target was already displayed.
    Unchanged,
    /// The same target is already being fetched.
    AlreadyPending,
    /// A grid was loaded and shown. `photos` may be zero.
    Shown { count: u32, photos: usize },
    /// The photo selection changed within the displayed grid.
    Selected,
    /// The grid was closed.
    Hidden,
    /// The location of a bare photo id could not be resolved.
    LookupFailed,
    /// The photo list could not be loaded; the view is unchanged.
    FetchFailed,
    /// A newer transition started while this one was fetching.
    Superseded,
}

struct EngineState {
    ctx: ViewerContext,
    displayed: DisplayedView,
    latest_token: u64,
    pending: Option<ViewState>,
}

/// Handle to the transition engine. Clones share the same state.
pub struct TransitionEngine<S> {
    state: Rc<RefCell<EngineState>>,
    map: Rc<MapQueue>,
    service: Rc<S>,
}

impl<S> Clone for TransitionEngine<S> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            map: self.map.clone(),
            service: self.service.clone(),
        }
    }
}

impl<S: PhotoService> TransitionEngine<S> {
    pub fn new(ctx: ViewerContext, service: S) -> Self {
        Self {
            map: ctx.map_queue(),
            state: Rc::new(RefCell::new(EngineState {
                ctx,
                displayed: DisplayedView::default(),
                latest_token: 0,
                pending: None,
            })),
            service: Rc::new(service),
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn displayed(&self) -> DisplayedView {
        self.state.borrow().displayed.clone()
    }

    pub fn displayed_state(&self) -> ViewState {
        self.state.borrow().displayed.state()
    }

    pub fn displayed_grid_key(&self) -> Option<GridKey> {
        self.state.borrow().displayed.grid_key().cloned()
    }

    /// Runs `f` with the shared context, then sends the map updates it
    /// queued. Must not be called from inside another `with_context`.
    pub fn with_context<R>(&self, f: impl FnOnce(&mut ViewerContext) -> R) -> R {
        let result = f(&mut self.state.borrow_mut().ctx);
        self.map.flush();
        result
    }

    /// Makes the displayed view match `target`.
    pub async fn apply(&self, target: ViewState) -> TransitionOutcome {
        let outcome = self.transition(target).await;
        self.map.flush();
        outcome
    }

    /// Starts a request that replaces whatever is in flight.
    fn next_token(&self) -> u64 {
        let mut state = self.state.borrow_mut();
        state.latest_token += 1;
        state.pending = None;
        state.latest_token
    }

    async fn transition(&self, target: ViewState) -> TransitionOutcome {
        let fragment = encode(&target);
        let hint = self.location_hint(&target);
        let lookup = match parse_fragment(&fragment) {
            ParsedFragment::NeedsLookup(_) if hint.is_none() => Some(self.next_token()),
            _ => None,
        };

        let resolved = decode_with_hint(&fragment, hint, self.service.as_ref()).await;
        if let Some(token) = lookup {
            if self.state.borrow().latest_token != token {
                log::debug!("Dropping stale lookup for {:?}", fragment);
                return TransitionOutcome::Superseded;
            }
        }
        let Some(target) = resolved else {
            return TransitionOutcome::LookupFailed;
        };

        let (grid, token) = {
            let mut state = self.state.borrow_mut();
            let current = state.displayed.state();

            if state.pending.as_ref() == Some(&target) {
                log::debug!("Transition to {:?} already in flight", encode(&target));
                return TransitionOutcome::AlreadyPending;
            }
            if current == target {
                if state.pending.take().is_some() {
                    // Supersede a fetch for a state we are leaving behind.
                    state.latest_token += 1;
                }
                return TransitionOutcome::Unchanged;
            }

            log::debug!(
                "Transition {:?} -> {:?} ({})",
                encode(&current),
                encode(&target),
                target.mode().css_class()
            );

            let Some(grid) = target.g.clone() else {
                state.latest_token += 1;
                state.pending = None;
                state.displayed.grid = None;
                return TransitionOutcome::Hidden;
            };

            if current.g.as_ref() == Some(&grid) {
                if state.pending.take().is_some() {
                    state.latest_token += 1;
                }
                if let Some(shown) = state.displayed.grid.as_mut() {
                    shown.selected = target.photo_id.clone();
                }
                return TransitionOutcome::Selected;
            }

            state.latest_token += 1;
            state.pending = Some(target.clone());
            (grid, state.latest_token)
        };

        let result = self.service.photos_at(&grid).await;

        let mut state = self.state.borrow_mut();
        if state.latest_token != token {
            log::debug!("Dropping stale response for {}", grid);
            return TransitionOutcome::Superseded;
        }
        state.pending = None;

        let photos = match result {
            Ok(photos) => photos,
            Err(e) => {
                log::warn!("Failed to load photos for {}: {}", grid, e);
                return TransitionOutcome::FetchFailed;
            }
        };

        let EngineState { ctx, displayed, .. } = &mut *state;
        let ids = ctx.photos.merge(&grid, photos);
        let count = ctx.grid_count(&grid);
        if let GridKey::Location(key) = &grid {
            ctx.focus_location(key);
        }

        let shown = filtered_grid(ctx, grid, &ids, target.photo_id);
        let outcome = TransitionOutcome::Shown {
            count,
            photos: shown.photo_ids.len(),
        };
        log::debug!(
            "Showing {} of {} photos at {}",
            shown.photo_ids.len(),
            ids.len(),
            shown.key
        );
        displayed.grid = Some(shown);
        outcome
    }

    /// Rebuilds the displayed grid under the current year filter from
    /// cached metadata. Returns `false` when no grid is displayed.
    pub fn refilter_grid(&self) -> bool {
        let mut state = self.state.borrow_mut();
        let EngineState { ctx, displayed, .. } = &mut *state;
        let Some(current) = displayed.grid.take() else {
            return false;
        };

        let ids = ctx
            .photos
            .photos_at(&current.key)
            .map(<[String]>::to_vec)
            .unwrap_or_default();
        displayed.grid = Some(filtered_grid(ctx, current.key, &ids, current.selected));
        true
    }

    /// Location to use for a bare photo id without asking the service.
    fn location_hint(&self, target: &ViewState) -> Option<LocationKey> {
        if let Some(key) = target.g.as_ref().and_then(GridKey::location) {
            return Some(key.clone());
        }
        let photo_id = target.photo_id.as_deref()?;
        self.state.borrow().ctx.photos.location_of(photo_id).cloned()
    }
}

fn filtered_grid(
    ctx: &ViewerContext,
    key: GridKey,
    ids: &[String],
    selected: Option<String>,
) -> GridView {
    let filter = ctx.filter.filter();
    let photo_ids = ids
        .iter()
        .filter(|id| ctx.photos.info(id).is_some_and(|info| filter.admits(info)))
        .cloned()
        .collect();

    GridView {
        key,
        photo_ids,
        selected,
        filtered: !filter.is_unfiltered(),
    }
}
