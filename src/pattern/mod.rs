//! Glob-style path pattern matching.
//!
//! # Data Flow
//! ```text
//! pattern "/api/**/user?/*.json", path "/api/v1/users/users1/a.json"
//!     → path.rs (split on '/', anchor on "**" segments)
//!     → segment.rs (match one segment with '?' and '*')
//!     → bool
//! ```
//!
//! # Syntax
//! - `?` matches exactly one character
//! - `*` matches zero or more characters within a segment
//! - `**` as a whole segment matches zero or more segments
//!
//! # Design Decisions
//! - Matching is total: every (pattern, path) pair yields a bool, never an error
//! - No recursion; each `*`/`**` delimited chunk is searched once, left to right
//! - Malformed patterns are rejected up front by [`validate_pattern`]
//! - Request paths are percent-decoded by [`decode_path`] before matching

pub mod decode;
pub mod path;
pub mod segment;

pub use decode::decode_path;
pub use path::{canonicalize, match_path, tokenize, validate_pattern, PatternError, MATCH_ALL};
pub use segment::match_segment;
