//! Geographic primitives for the spatial index.
//!
//! Positions are `geo_types` coordinates (x = longitude, y = latitude).

mod location;
mod viewport;

pub use location::{lat_lng, GridKey, LatLng, LocationKey, POPULAR_KEY};
pub use viewport::Bounds;
