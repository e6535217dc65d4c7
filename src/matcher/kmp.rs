//! Knuth-Morris-Pratt substring search

use super::bytes_eq;

/// A needle with its precomputed failure table.
///
/// Build once and reuse when the same needle is searched repeatedly, as the
/// `like` matcher does when it has to skip past a rejected anchor.
#[derive(Debug, Clone)]
pub struct KmpPattern<'a> {
    needle: &'a [u8],
    /// `failure[i]` = length of the longest proper prefix of `needle[..=i]`
    /// that is also a suffix of it.
    failure: Vec<usize>,
    ignore_case: bool,
}

impl<'a> KmpPattern<'a> {
    /// Builds the failure table, folding case per byte if requested.
    pub fn new(needle: &'a [u8], ignore_case: bool) -> Self {
        let mut failure = vec![0usize; needle.len()];
        let mut k = 0usize;

        for i in 1..needle.len() {
            while k > 0 && !bytes_eq(needle[i], needle[k], ignore_case) {
                k = failure[k - 1];
            }
            if bytes_eq(needle[i], needle[k], ignore_case) {
                k += 1;
            }
            failure[i] = k;
        }

        Self {
            needle,
            failure,
            ignore_case,
        }
    }

    /// Returns the needle length.
    pub fn len(&self) -> usize {
        self.needle.len()
    }

    /// Returns true for the empty needle.
    pub fn is_empty(&self) -> bool {
        self.needle.is_empty()
    }

    /// Finds the first occurrence at or after `start`.
    ///
    /// The empty needle matches at `start` as long as `start` is within the
    /// text.
    pub fn find_from(&self, text: &[u8], start: usize) -> Option<usize> {
        if start > text.len() {
            return None;
        }
        if self.needle.is_empty() {
            return Some(start);
        }

        let n = self.needle.len();
        let mut q = 0usize;

        for (i, &b) in text.iter().enumerate().skip(start) {
            while q > 0 && !bytes_eq(b, self.needle[q], self.ignore_case) {
                q = self.failure[q - 1];
            }
            if bytes_eq(b, self.needle[q], self.ignore_case) {
                q += 1;
            }
            if q == n {
                return Some(i + 1 - n);
            }
        }

        None
    }
}

/// Byte index of the first occurrence of `needle` in `text`.
pub fn kmp_search(text: &str, needle: &str, ignore_case: bool) -> Option<usize> {
    kmp_search_from(text, needle, 0, ignore_case)
}

/// Like [`kmp_search`], ignoring matches that begin before byte `start`.
pub fn kmp_search_from(text: &str, needle: &str, start: usize, ignore_case: bool) -> Option<usize> {
    kmp_search_bytes(text.as_bytes(), needle.as_bytes(), start, ignore_case)
}

/// Byte-slice search starting at `start`.
pub fn kmp_search_bytes(
    text: &[u8],
    needle: &[u8],
    start: usize,
    ignore_case: bool,
) -> Option<usize> {
    KmpPattern::new(needle, ignore_case).find_from(text, start)
}
