//! Per-location photo counts by year.
//!
//! The dataset maps every known location to a histogram of photo counts:
//!
//! ```text
//! { "43.648614,-79.373849": { "1925": 2, "1930": 1, "n.d.": 4 } }
//! ```
//!
//! Year keys that are not integers are folded into a single "undated" bucket.
//! Entries are cached for the session and never evicted.

use crate::geo::LocationKey;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

/// Photo counts at one location, keyed by year.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "HashMap<String, u32>")]
pub struct YearCounts {
    dated: BTreeMap<i32, u32>,
    undated: u32,
}

impl YearCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `count` photos for `year` (`None` = undated).
    pub fn add(&mut self, year: Option<i32>, count: u32) {
        match year {
            Some(year) => *self.dated.entry(year).or_insert(0) += count,
            None => self.undated += count,
        }
    }

    pub fn with(mut self, year: Option<i32>, count: u32) -> Self {
        self.add(year, count);
        self
    }

    /// Every photo at this location, undated ones included.
    pub fn total(&self) -> u32 {
        self.dated.values().sum::<u32>() + self.undated
    }

    /// Sum of dated counts whose year satisfies `pred`. Undated photos never match.
    pub fn sum_years(&self, pred: impl Fn(i32) -> bool) -> u32 {
        self.dated
            .iter()
            .filter(|(year, _)| pred(**year))
            .map(|(_, count)| *count)
            .sum()
    }

    pub fn undated(&self) -> u32 {
        self.undated
    }
}

impl From<HashMap<String, u32>> for YearCounts {
    fn from(raw: HashMap<String, u32>) -> Self {
        let mut counts = YearCounts::default();
        for (year, count) in raw {
            counts.add(year.trim().parse().ok(), count);
        }
        counts
    }
}

/// The full location dataset: location key -> year counts.
#[derive(Debug, Clone, Default)]
pub struct LocationIndex {
    entries: HashMap<LocationKey, YearCounts>,
}

impl LocationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the dataset from JSON. Entries with malformed keys are skipped.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let raw: HashMap<String, YearCounts> = serde_json::from_str(json)?;
        let mut index = Self::new();
        index.extend(raw);
        Ok(index)
    }

    /// Merges raw entries into the index.
    pub fn extend(&mut self, raw: impl IntoIterator<Item = (String, YearCounts)>) {
        let mut skipped = 0usize;
        for (key, counts) in raw {
            match LocationKey::parse(&key) {
                Some(key) => self.insert(key, counts),
                None => skipped += 1,
            }
        }
        if skipped > 0 {
            log::warn!("Skipped {} dataset entries with malformed location keys", skipped);
        }
        log::debug!("Location index now holds {} locations", self.entries.len());
    }

    pub fn insert(&mut self, key: LocationKey, counts: YearCounts) {
        self.entries.insert(key, counts);
    }

    pub fn get(&self, key: &LocationKey) -> Option<&YearCounts> {
        self.entries.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&LocationKey, &YearCounts)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_counts_from_json() {
        let counts: YearCounts =
            serde_json::from_str(r#"{"1920": 1, "1925": 2, "n.d.": 3, "": 1}"#).unwrap();
        assert_eq!(counts.total(), 7);
        assert_eq!(counts.undated(), 4);
        assert_eq!(counts.sum_years(|y| y > 1920), 2);
    }

    #[test]
    fn test_location_index_skips_bad_keys() {
        let index = LocationIndex::from_json(
            r#"{
                "43.65,-79.38": {"1920": 1},
                "not-a-key": {"1920": 5},
                "43.660000,-79.390000": {"1950": 2}
            }"#,
        )
        .unwrap();

        assert_eq!(index.len(), 2);
        let key = LocationKey::parse("43.65,-79.38").unwrap();
        assert_eq!(index.get(&key).map(YearCounts::total), Some(1));
    }
}
