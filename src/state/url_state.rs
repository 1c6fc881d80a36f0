//! URL fragment encoding/decoding for shareable URLs.
//!
//! The fragment after `#` looks like one of:
//!
//! ```text
//! (empty)                 map
//! g:43.65,-79.38          grid at a location
//! g:pop                   popular shelf
//! 123                     photo (its location is looked up)
//! 123,g:pop               photo opened from the popular shelf
//! ```
//!
//! A photo's location is derivable from its id, so only the popular shelf
//! is written next to a photo id. Decoding a bare id therefore needs a
//! lookup and is asynchronous.

use super::view_state::ViewState;
use crate::data::PhotoService;
use crate::geo::{GridKey, LocationKey};

const GRID_PREFIX: &str = "g:";
const GRID_SEPARATOR: &str = ",g:";

/// Result of the synchronous half of decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedFragment {
    /// The fragment fully describes the state.
    Ready(ViewState),
    /// A bare photo id whose location must be resolved.
    NeedsLookup(String),
}

/// Strips a leading `/#` or `#` from a location hash or URL fragment.
pub fn strip_hash(hash: &str) -> &str {
    hash.strip_prefix("/#")
        .or_else(|| hash.strip_prefix('#'))
        .unwrap_or(hash)
}

/// Encode a state as its canonical, minimal fragment (without `#`).
pub fn encode(state: &ViewState) -> String {
    if let Some(photo_id) = &state.photo_id {
        return match state.g {
            Some(GridKey::Popular) => format!("{}{}{}", photo_id, GRID_SEPARATOR, GridKey::Popular),
            _ => photo_id.clone(),
        };
    }

    match &state.g {
        Some(g) => format!("{}{}", GRID_PREFIX, g),
        None => String::new(),
    }
}

/// Parse everything that can be parsed without a lookup.
///
/// Malformed fragments (empty photo id, unparsable grid key) decode to the
/// map view.
pub fn parse_fragment(fragment: &str) -> ParsedFragment {
    let fragment = strip_hash(fragment);

    if fragment.is_empty() {
        return ParsedFragment::Ready(ViewState::map());
    }

    if let Some((photo_id, g)) = fragment.rsplit_once(GRID_SEPARATOR) {
        return match GridKey::parse(g) {
            Some(g) if !photo_id.is_empty() => {
                ParsedFragment::Ready(ViewState::photo(photo_id, Some(g)))
            }
            _ => malformed(fragment),
        };
    }

    if let Some(g) = fragment.strip_prefix(GRID_PREFIX) {
        return match GridKey::parse(g) {
            Some(g) => ParsedFragment::Ready(ViewState::grid(g)),
            None => malformed(fragment),
        };
    }

    ParsedFragment::NeedsLookup(fragment.to_string())
}

fn malformed(fragment: &str) -> ParsedFragment {
    log::debug!("Malformed URL fragment {:?}, showing the map", fragment);
    ParsedFragment::Ready(ViewState::map())
}

/// Decode a fragment, looking up the location of a bare photo id.
///
/// Returns `None` when the lookup fails; callers keep their current view.
pub async fn decode<S: PhotoService>(fragment: &str, service: &S) -> Option<ViewState> {
    decode_with_hint(fragment, None, service).await
}

/// Like [`decode`], but uses `hint` as the location of a bare photo id
/// instead of asking the service.
pub async fn decode_with_hint<S: PhotoService>(
    fragment: &str,
    hint: Option<LocationKey>,
    service: &S,
) -> Option<ViewState> {
    match parse_fragment(fragment) {
        ParsedFragment::Ready(state) => Some(state),
        ParsedFragment::NeedsLookup(photo_id) => {
            if let Some(location) = hint {
                return Some(ViewState::photo(photo_id, Some(location.into())));
            }
            match service.locate_photo(&photo_id).await {
                Ok(location) => Some(ViewState::photo(photo_id, Some(location.into()))),
                Err(e) => {
                    log::warn!("Could not locate photo {}: {}", photo_id, e);
                    None
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{LocationPhotos, MemoryPhotoService, PhotoInfo};

    fn loc(key: &str) -> GridKey {
        GridKey::parse(key).unwrap()
    }

    fn service() -> MemoryPhotoService {
        let mut photos = LocationPhotos::new();
        photos.insert("123".into(), PhotoInfo::default());
        MemoryPhotoService::new().with_grid(loc("43.65,-79.38"), photos)
    }

    #[test]
    fn test_encode() {
        assert_eq!(encode(&ViewState::map()), "");
        assert_eq!(encode(&ViewState::grid(loc("43.65,-79.38"))), "g:43.65,-79.38");
        assert_eq!(encode(&ViewState::grid(GridKey::Popular)), "g:pop");
        assert_eq!(
            encode(&ViewState::photo("123", Some(GridKey::Popular))),
            "123,g:pop"
        );
        assert_eq!(
            encode(&ViewState::photo("123", Some(loc("43.65,-79.38")))),
            "123"
        );
        assert_eq!(encode(&ViewState::photo("123", None)), "123");
    }

    #[test]
    fn test_parse_fragment() {
        assert_eq!(
            parse_fragment("g:43.65,-79.38"),
            ParsedFragment::Ready(ViewState::grid(loc("43.65,-79.38")))
        );
        assert_eq!(
            parse_fragment("#123,g:pop"),
            ParsedFragment::Ready(ViewState::photo("123", Some(GridKey::Popular)))
        );
        assert_eq!(
            parse_fragment("123,g:43.65,-79.38"),
            ParsedFragment::Ready(ViewState::photo("123", Some(loc("43.65,-79.38"))))
        );
        assert_eq!(
            parse_fragment("/#123"),
            ParsedFragment::NeedsLookup("123".into())
        );
        assert_eq!(parse_fragment(""), ParsedFragment::Ready(ViewState::map()));
    }

    #[test]
    fn test_malformed_fragments_show_map() {
        for fragment in ["g:", "g:nowhere", ",g:pop", "123,g:nowhere"] {
            assert_eq!(
                parse_fragment(fragment),
                ParsedFragment::Ready(ViewState::map()),
                "{fragment}"
            );
        }
    }

    #[test]
    fn test_decode_bare_photo_id() {
        let service = service();
        let state = pollster::block_on(decode("123", &service)).unwrap();
        assert_eq!(state, ViewState::photo("123", Some(loc("43.65,-79.38"))));
        assert_eq!(service.lookup_requests(), vec!["123".to_string()]);
    }

    #[test]
    fn test_decode_lookup_failure() {
        let service = service();
        assert_eq!(pollster::block_on(decode("999", &service)), None);
    }

    #[test]
    fn test_hint_skips_lookup() {
        let service = service();
        let hint = LocationKey::parse("43.65,-79.38");
        let state = pollster::block_on(decode_with_hint("123", hint, &service)).unwrap();
        assert_eq!(state, ViewState::photo("123", Some(loc("43.65,-79.38"))));
        assert!(service.lookup_requests().is_empty());
    }

    #[test]
    fn test_round_trip() {
        let service = service();
        let states = [
            ViewState::map(),
            ViewState::grid(loc("43.65,-79.38")),
            ViewState::grid(GridKey::Popular),
            ViewState::photo("123", Some(GridKey::Popular)),
            ViewState::photo("123", Some(loc("43.65,-79.38"))),
        ];

        for state in states {
            let decoded = pollster::block_on(decode(&encode(&state), &service));
            assert_eq!(decoded.as_ref(), Some(&state), "{:?}", encode(&state));
        }
    }
}
