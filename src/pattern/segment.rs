//! Single segment matching with `?` and `*` wildcards.
//!
//! # Algorithm
//! A pattern containing stars is treated as `prefix * chunk * chunk * suffix`:
//! - consume the literal prefix from the front, then the literal suffix from the back
//! - search each interior chunk at the first offset where it fits
//! - succeed when only stars remain in the pattern
//!
//! Each chunk is consumed monotonically, so the worst case is
//! O(pattern × text) with no exponential backtracking.

const STAR: u8 = b'*';
const ANY: u8 = b'?';

/// Returns true if `text` matches the single-segment `pattern`.
///
/// ASCII input is matched byte by byte; anything else is matched per `char`
/// so that `?` always stands for one character.
pub fn match_segment(pattern: &str, text: &str) -> bool {
    if pattern.is_ascii() && text.is_ascii() {
        return match_units(pattern.as_bytes(), text.as_bytes(), STAR, ANY);
    }

    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();
    match_units(&pattern, &text, char::from(STAR), char::from(ANY))
}

fn match_units<T: Copy + PartialEq>(pat: &[T], txt: &[T], star: T, any: T) -> bool {
    let unit_matches = |p: T, t: T| p == any || p == t;
    let only_stars = |units: &[T]| units.iter().all(|&u| u == star);

    if !pat.contains(&star) {
        return pat.len() == txt.len() && pat.iter().zip(txt).all(|(&p, &t)| unit_matches(p, t));
    }

    if pat.len() == 1 {
        return true;
    }

    // Half-open windows: pat[ps..pe], txt[ts..te].
    let (mut ps, mut pe) = (0, pat.len());
    let (mut ts, mut te) = (0, txt.len());

    // Everything before the first star.
    while pat[ps] != star && ts < te {
        if !unit_matches(pat[ps], txt[ts]) {
            return false;
        }
        ps += 1;
        ts += 1;
    }
    if ts == te {
        return only_stars(&pat[ps..pe]);
    }

    // Everything after the last star.
    while pat[pe - 1] != star && ts < te {
        if !unit_matches(pat[pe - 1], txt[te - 1]) {
            return false;
        }
        pe -= 1;
        te -= 1;
    }
    if ts == te {
        return only_stars(&pat[ps..pe]);
    }

    // pat[ps] and pat[pe - 1] are both stars from here on.
    while ps != pe - 1 && ts < te {
        let next_star = pat[ps + 1..pe]
            .iter()
            .position(|&u| u == star)
            .map_or(pe - 1, |offset| ps + 1 + offset);

        if next_star == ps + 1 {
            // "**" inside a segment behaves like a single star.
            ps += 1;
            continue;
        }

        let chunk = &pat[ps + 1..next_star];
        let found = txt[ts..te]
            .windows(chunk.len())
            .position(|window| window.iter().zip(chunk).all(|(&t, &p)| unit_matches(p, t)));

        match found {
            Some(offset) => {
                ts += offset + chunk.len();
                ps = next_star;
            }
            None => return false,
        }
    }

    only_stars(&pat[ps..pe])
}
