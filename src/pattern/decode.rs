//! Request path decoding.
//!
//! Patterns are written against decoded paths, so `/%61dmin` has to be seen
//! as `/admin` before matching. Decoding follows the rules of Go's
//! `url.URL.Path`:
//! - every `%XX` escape is decoded, `%2F` included
//! - `+` stays a literal plus sign
//! - a `%` that is not followed by two hex digits makes the path invalid
//!
//! Paths that do not decode to UTF-8 are invalid as well.

use std::borrow::Cow;

use percent_encoding::percent_decode_str;

/// Decodes a raw request path, or returns `None` if it is malformed.
///
/// Borrows when the path contains no escapes.
pub fn decode_path(raw: &str) -> Option<Cow<'_, str>> {
    if !raw.contains('%') {
        return Some(Cow::Borrowed(raw));
    }
    if !escapes_are_well_formed(raw.as_bytes()) {
        return None;
    }

    percent_decode_str(raw).decode_utf8().ok()
}

fn escapes_are_well_formed(raw: &[u8]) -> bool {
    let mut i = 0;
    while i < raw.len() {
        if raw[i] == b'%' {
            match raw.get(i + 1..i + 3) {
                Some([hi, lo]) if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit() => i += 3,
                _ => return false,
            }
        } else {
            i += 1;
        }
    }
    true
}
