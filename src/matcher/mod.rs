//! Wildcard pattern matching for staff search
//!
//! Two layers:
//! - `kmp`: first-occurrence substring search (Knuth-Morris-Pratt)
//! - `like`: SQL `LIKE` style matching with `%` (zero or more bytes) and
//!   `_` (exactly one byte), built on the substring search
//!
//! Matching is byte-oriented. Case-insensitive comparisons fold ASCII letters
//! only, one byte at a time, so no folded copy of the text is ever built.
//!
//! # Limitations
//!
//! `like` is greedy: each `%` segment binds to its first occurrence and is
//! never revisited when a later segment fails. Patterns with several
//! ambiguous `%` segments can therefore reject texts a backtracking matcher
//! would accept.

mod kmp;
mod like;

pub use kmp::{kmp_search, kmp_search_bytes, kmp_search_from, KmpPattern};
pub use like::{like, like_bytes};

/// Wildcard matching any run of bytes, including an empty one.
pub const ANY_RUN: u8 = b'%';

/// Wildcard matching exactly one byte.
pub const ANY_ONE: u8 = b'_';

#[inline]
pub(crate) fn bytes_eq(a: u8, b: u8, ignore_case: bool) -> bool {
    if ignore_case {
        a.eq_ignore_ascii_case(&b)
    } else {
        a == b
    }
}
