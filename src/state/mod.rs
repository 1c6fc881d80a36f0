//! View state, its URL encoding and the year filter.

pub mod debounce;
pub mod filter;
pub mod url_state;
mod view_state;

pub use debounce::Debouncer;
pub use filter::{TemporalFilter, YearFilter, YearLabels, YearRange};
pub use url_state::{decode, encode, parse_fragment, ParsedFragment};
pub use view_state::{ViewMode, ViewState};
