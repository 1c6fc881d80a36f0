//! Temporal (year range) filter.
//!
//! The full range is the "no filter" sentinel. Counting semantics differ
//! between the two cases:
//! - unfiltered: every photo counts, undated ones included
//! - filtered: only years in `(first, last]` count (exclusive lower bound,
//!   inclusive upper bound)
//!
//! Grid membership uses a different rule: a photo is shown when any year in
//! its date text falls inside `[first, last]`.

use super::debounce::Debouncer;
use crate::config::ViewerConfig;
use crate::data::{PhotoInfo, YearCounts};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use web_time::Instant;

/// An inclusive range of years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    pub first: i32,
    pub last: i32,
}

impl YearRange {
    /// Creates a range; the bounds are swapped if given in reverse.
    pub fn new(first: i32, last: i32) -> Self {
        Self {
            first: first.min(last),
            last: first.max(last),
        }
    }

    /// Clamps both ends into `bounds`.
    pub fn clamp_to(&self, bounds: &YearRange) -> Self {
        Self::new(
            self.first.clamp(bounds.first, bounds.last),
            self.last.clamp(bounds.first, bounds.last),
        )
    }
}

/// The active range together with the slider bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearFilter {
    range: YearRange,
    bounds: YearRange,
}

impl YearFilter {
    /// An unfiltered view over `bounds`.
    pub fn unfiltered(bounds: YearRange) -> Self {
        Self {
            range: bounds,
            bounds,
        }
    }

    pub fn with_range(bounds: YearRange, range: YearRange) -> Self {
        Self {
            range: range.clamp_to(&bounds),
            bounds,
        }
    }

    pub fn range(&self) -> YearRange {
        self.range
    }

    pub fn bounds(&self) -> YearRange {
        self.bounds
    }

    pub fn is_unfiltered(&self) -> bool {
        self.range == self.bounds
    }

    /// Photos at a location visible under this filter.
    pub fn count(&self, counts: &YearCounts) -> u32 {
        if self.is_unfiltered() {
            return counts.total();
        }
        let YearRange { first, last } = self.range;
        counts.sum_years(|year| year > first && year <= last)
    }

    /// Whether a photo belongs in a filtered grid.
    pub fn admits(&self, info: &PhotoInfo) -> bool {
        if self.is_unfiltered() {
            return true;
        }
        let YearRange { first, last } = self.range;
        info.years().into_iter().any(|year| year >= first && year <= last)
    }
}

/// Pixel placement of the slider labels and highlighted chart segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearLabels {
    pub first: i32,
    pub last: i32,
    pub left_px: i32,
    pub right_px: i32,
}

/// Owns the active year range and debounces slider input.
#[derive(Debug, Clone)]
pub struct TemporalFilter {
    filter: YearFilter,
    /// Range shown on the slider labels; tracks the pointer without debounce.
    label: YearRange,
    debouncer: Debouncer<YearRange>,
}

impl TemporalFilter {
    pub fn new(config: &ViewerConfig) -> Self {
        let bounds = YearRange::new(config.min_year, config.max_year);
        Self {
            filter: YearFilter::unfiltered(bounds),
            label: bounds,
            debouncer: Debouncer::new(Duration::from_millis(config.filter_debounce_ms)),
        }
    }

    pub fn filter(&self) -> YearFilter {
        self.filter
    }

    pub fn range(&self) -> YearRange {
        self.filter.range()
    }

    pub fn is_unfiltered(&self) -> bool {
        self.filter.is_unfiltered()
    }

    /// Range currently displayed on the slider labels.
    pub fn label(&self) -> YearRange {
        self.label
    }

    /// Replaces the active range. Returns `true` if it changed.
    pub fn set_range(&mut self, range: YearRange) -> bool {
        let next = YearFilter::with_range(self.filter.bounds(), range);
        self.label = next.range();
        self.debouncer.cancel();
        if next == self.filter {
            return false;
        }
        log::debug!(
            "Year filter {}..{} -> {}..{}",
            self.filter.range().first,
            self.filter.range().last,
            next.range().first,
            next.range().last
        );
        self.filter = next;
        true
    }

    /// Resets to the full range. Returns `true` if it changed.
    pub fn clear(&mut self) -> bool {
        self.set_range(self.filter.bounds())
    }

    /// Slider drag: labels follow immediately, the range itself is debounced.
    pub fn slide(&mut self, range: YearRange, now: Instant) {
        self.label = range.clamp_to(&self.filter.bounds());
        self.debouncer.push(self.label, now);
    }

    /// Releases a debounced slider value once the drag has settled.
    pub fn poll(&mut self, now: Instant) -> Option<YearRange> {
        self.debouncer.poll(now)
    }

    /// Time until a pending slider value settles.
    pub fn pending_delay(&self, now: Instant) -> Option<Duration> {
        self.debouncer.remaining(now)
    }

    /// Lays out the slider labels on a chart `width` pixels wide.
    pub fn label_layout(&self, width: f64) -> YearLabels {
        let bounds = self.filter.bounds();
        let span = f64::from(bounds.last - bounds.first);
        let YearRange { first, last } = self.label;
        let left = f64::from(first - bounds.first) / span * width;
        let right = f64::from(last - bounds.first) / span * width;
        YearLabels {
            first,
            last,
            left_px: left.floor() as i32,
            right_px: right.ceil() as i32,
        }
    }
}
