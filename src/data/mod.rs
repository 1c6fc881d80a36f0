//! Photo data: the location dataset, photo metadata and the service that
//! provides it.
//!
//! ## Datasets
//! - `LocationIndex`: every known location with per-year photo counts,
//!   used to materialize and style map markers
//! - `PhotoInfoCache`: metadata for photos fetched so far
//! - `PopularShelf`: the curated "popular photos" list
//!
//! ## Service
//! `PhotoService` is the only network boundary. Responses are merged into the
//! caches; nothing is ever evicted during a session.

pub mod photo_info;
pub mod popular;
pub mod service;
pub mod year_counts;

pub use photo_info::{LocationPhotos, PhotoInfo, PhotoInfoCache};
pub use popular::{PopularPhoto, PopularShelf};
pub use service::{PhotoService, ServiceError};
pub use year_counts::{LocationIndex, YearCounts};

#[cfg(not(target_arch = "wasm32"))]
pub use service::native::MemoryPhotoService;
