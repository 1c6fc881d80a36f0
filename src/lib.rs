#![warn(clippy::all)]

//! OldTO Viewer - keeps a map-based historical photo browser, its URL and
//! the browser history in step.
//!
//! User actions are recorded into history by `engine::HistoryRecorder`;
//! navigations (page load, back/forward) are applied to the screen by
//! `engine::TransitionEngine`. `Viewer` ties both to the map widget.

pub mod config;
pub mod data;
pub mod engine;
pub mod geo;
pub mod map;
pub mod state;
pub mod viewer;

#[cfg(target_arch = "wasm32")]
pub mod web;

#[cfg(test)]
mod testing;

pub use viewer::Viewer;
