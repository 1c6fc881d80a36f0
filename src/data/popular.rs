//! The popular photos shelf.
//!
//! A fixed, curated list of photos shown beside the map. The list is rotated
//! by one entry per day so returning visitors see a different lead photo.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One entry of the popular shelf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopularPhoto {
    pub id: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub thumbnail_url: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub subtitle: String,
}

/// The curated shelf, in its canonical (unrotated) order.
#[derive(Debug, Clone, Default)]
pub struct PopularShelf {
    photos: Vec<PopularPhoto>,
}

impl PopularShelf {
    pub fn new(photos: Vec<PopularPhoto>) -> Self {
        Self { photos }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    /// Number of whole days between `epoch` and `today`, modulo the shelf length.
    pub fn rotation(&self, today: NaiveDate, epoch: NaiveDate) -> usize {
        if self.photos.is_empty() {
            return 0;
        }
        let days = (today - epoch).num_days().max(0) as usize;
        days % self.photos.len()
    }

    /// The shelf as shown on `today`.
    pub fn rotated(&self, today: NaiveDate, epoch: NaiveDate) -> Vec<&PopularPhoto> {
        let shift = self.rotation(today, epoch);
        self.photos[shift..]
            .iter()
            .chain(self.photos[..shift].iter())
            .collect()
    }

    pub fn contains(&self, photo_id: &str) -> bool {
        self.photos.iter().any(|p| p.id == photo_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shelf() -> PopularShelf {
        PopularShelf::new(
            ["452181", "141995", "135927"]
                .iter()
                .map(|id| PopularPhoto {
                    id: id.to_string(),
                    image_url: String::new(),
                    thumbnail_url: String::new(),
                    date: String::new(),
                    title: String::new(),
                    height: 140,
                    subtitle: String::new(),
                })
                .collect(),
        )
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_rotation_by_day() {
        let shelf = shelf();
        let epoch = date(2015, 12, 15);

        assert_eq!(shelf.rotation(epoch, epoch), 0);
        assert_eq!(shelf.rotation(date(2015, 12, 16), epoch), 1);
        assert_eq!(shelf.rotation(date(2015, 12, 18), epoch), 0);

        let ids: Vec<&str> = shelf
            .rotated(date(2015, 12, 17), epoch)
            .iter()
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(ids, vec!["135927", "452181", "141995"]);
    }

    #[test]
    fn test_before_epoch_is_unrotated() {
        let shelf = shelf();
        assert_eq!(shelf.rotation(date(2014, 1, 1), date(2015, 12, 15)), 0);
    }

    #[test]
    fn test_from_json() {
        let shelf = PopularShelf::from_json(
            r#"[{"id": "452181", "title": "City Skyline", "date": "1970", "height": 143}]"#,
        )
        .unwrap();
        assert_eq!(shelf.len(), 1);
        assert!(shelf.contains("452181"));
        assert!(!shelf.contains("1"));
    }
}
