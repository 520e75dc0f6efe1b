//! Path matching with `**` multi-segment wildcards.
//!
//! # Responsibilities
//! - Split patterns and paths into non-empty `/` segments
//! - Match the segments before the first `**` and after the last `**`
//! - Locate the literal runs between `**` anchors in the remaining path
//! - Validate patterns at configuration time
//!
//! # Design Decisions
//! - Leading `/` must agree between pattern and path
//! - Trailing `/` is significant when the pattern has no wildcard tail
//! - A lone `*` segment is one path component, never the rest of the path

use thiserror::Error;

use super::segment::match_segment;

const SEPARATOR: char = '/';
const DOUBLE_STAR: &str = "**";

/// Canonical pattern that matches every request path.
pub const MATCH_ALL: &str = "/**";

/// A pattern rejected at configuration time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("pattern is empty")]
    Empty,

    #[error("segment `{0}` combines `**` with other characters")]
    FusedDoubleStar(String),
}

/// Rewrites the bare `**` shorthand into [`MATCH_ALL`].
pub fn canonicalize(pattern: impl Into<String>) -> String {
    let pattern = pattern.into();
    if pattern == DOUBLE_STAR {
        MATCH_ALL.to_string()
    } else {
        pattern
    }
}

/// Checks that `**` only ever appears as a whole segment.
pub fn validate_pattern(pattern: &str) -> Result<(), PatternError> {
    if pattern.is_empty() {
        return Err(PatternError::Empty);
    }

    match tokenize(pattern)
        .into_iter()
        .find(|segment| *segment != DOUBLE_STAR && segment.contains(DOUBLE_STAR))
    {
        Some(segment) => Err(PatternError::FusedDoubleStar(segment.to_string())),
        None => Ok(()),
    }
}

/// Splits on `/`, dropping the empty segments produced by repeated separators.
pub fn tokenize(path: &str) -> Vec<&str> {
    path.split(SEPARATOR).filter(|s| !s.is_empty()).collect()
}

/// Returns true if `path` matches `pattern`.
pub fn match_path(pattern: &str, path: &str) -> bool {
    if pattern.starts_with(SEPARATOR) != path.starts_with(SEPARATOR) {
        return false;
    }

    let pat = tokenize(pattern);
    let dirs = tokenize(path);
    let only_double_stars = |segments: &[&str]| segments.iter().all(|s| *s == DOUBLE_STAR);

    // Half-open windows: pat[ps..pe], dirs[ds..de].
    let (mut ps, mut pe) = (0, pat.len());
    let (mut ds, mut de) = (0, dirs.len());

    // Up to the first "**".
    while ps < pe && ds < de {
        if pat[ps] == DOUBLE_STAR {
            break;
        }
        if !match_segment(pat[ps], dirs[ds]) {
            return false;
        }
        ps += 1;
        ds += 1;
    }

    if ds == de {
        if ps == pe {
            return pattern.ends_with(SEPARATOR) == path.ends_with(SEPARATOR);
        }
        if pe - ps == 1 && pat[ps] == "*" && path.ends_with(SEPARATOR) {
            return true;
        }
        return only_double_stars(&pat[ps..pe]);
    }
    if ps == pe {
        return false;
    }

    // Back from the last "**".
    while ps < pe && ds < de {
        if pat[pe - 1] == DOUBLE_STAR {
            break;
        }
        if !match_segment(pat[pe - 1], dirs[de - 1]) {
            return false;
        }
        pe -= 1;
        de -= 1;
    }
    if ds == de {
        return only_double_stars(&pat[ps..pe]);
    }

    // pat[ps] and pat[pe - 1] are both "**" from here on.
    while ps != pe - 1 && ds < de {
        let next_anchor = pat[ps + 1..pe]
            .iter()
            .position(|s| *s == DOUBLE_STAR)
            .map_or(pe - 1, |offset| ps + 1 + offset);

        if next_anchor == ps + 1 {
            // "**/**" collapses to a single anchor.
            ps += 1;
            continue;
        }

        let run = &pat[ps + 1..next_anchor];
        let found = dirs[ds..de].windows(run.len()).position(|window| {
            window
                .iter()
                .zip(run)
                .all(|(dir, segment)| match_segment(segment, dir))
        });

        match found {
            Some(offset) => {
                ds += offset + run.len();
                ps = next_anchor;
            }
            None => return false,
        }
    }

    only_double_stars(&pat[ps..pe])
}
