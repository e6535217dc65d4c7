//! `LIKE` matching: anchored prefix, greedy `%` segments, anchored suffix

use super::kmp::KmpPattern;
use super::{bytes_eq, ANY_ONE, ANY_RUN};

/// Returns whether `text` matches the wildcard `query`.
pub fn like(text: &str, query: &str, ignore_case: bool) -> bool {
    like_bytes(text.as_bytes(), query.as_bytes(), ignore_case)
}

/// Byte-slice form of [`like`].
pub fn like_bytes(text: &[u8], query: &[u8], ignore_case: bool) -> bool {
    let segments: Vec<&[u8]> = query.split(|&b| b == ANY_RUN).collect();

    // No `%`: fixed-length match.
    if segments.len() == 1 {
        return text.len() == query.len() && matches_at(text, 0, query, ignore_case);
    }

    let prefix = segments[0];
    let suffix = segments[segments.len() - 1];

    if !matches_at(text, 0, prefix, ignore_case) {
        return false;
    }
    let mut offset = prefix.len();

    for segment in &segments[1..segments.len() - 1] {
        match find_segment(text, segment, offset, ignore_case) {
            Some(start) => offset = start + segment.len(),
            None => return false,
        }
    }

    if text.len() < offset + suffix.len() {
        return false;
    }
    matches_at(text, text.len() - suffix.len(), suffix, ignore_case)
}

/// Compares `pattern` against `text[at..]`; `_` accepts any byte.
fn matches_at(text: &[u8], at: usize, pattern: &[u8], ignore_case: bool) -> bool {
    if at > text.len() || text.len() - at < pattern.len() {
        return false;
    }
    pattern
        .iter()
        .zip(&text[at..])
        .all(|(&p, &t)| p == ANY_ONE || bytes_eq(p, t, ignore_case))
}

/// First start position `>= from` where `segment` matches.
///
/// The segment's first literal run is the KMP anchor; `_` bytes around it
/// are checked once the anchor is located.
fn find_segment(text: &[u8], segment: &[u8], from: usize, ignore_case: bool) -> Option<usize> {
    let lead = segment.iter().take_while(|&&b| b == ANY_ONE).count();
    let anchor_len = segment[lead..]
        .iter()
        .take_while(|&&b| b != ANY_ONE)
        .count();

    if anchor_len == 0 {
        return (from + segment.len() <= text.len()).then_some(from);
    }

    let anchor = KmpPattern::new(&segment[lead..lead + anchor_len], ignore_case);
    let mut search_from = from + lead;

    while let Some(pos) = anchor.find_from(text, search_from) {
        let start = pos - lead;
        if start + segment.len() > text.len() {
            return None;
        }
        if matches_at(text, start, segment, ignore_case) {
            return Some(start);
        }
        search_from = pos + 1;
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_patterns() {
        assert!(like("John Smith", "J%", true));
        assert!(like("John Smith", "j_hn%", true));
        assert!(!like("John Smith", "j_hn%", false));
        assert!(!like("Jane", "Jx%", true));
    }

    #[test]
    fn test_middle_segments() {
        assert!(like("Jane", "J%n%", true));
        assert!(like("Administrator", "%min%rat%", false));
        assert!(!like("Administrator", "%rat%min%", false));
    }

    #[test]
    fn test_fixed_length_without_percent() {
        assert!(like("ABCDE", "A_C_E", false));
        assert!(!like("ABCDE", "A_C_", false));
        assert!(!like("ABCD", "A_C_E", false));
        assert!(like("", "", false));
    }

    #[test]
    fn test_suffix_anchored() {
        assert!(like("John Smith", "%Smith", false));
        assert!(like("John Smith", "%S_ith", false));
        assert!(!like("John Smithy", "%Smith", false));
    }

    #[test]
    fn test_suffix_does_not_overlap_consumed_text() {
        // "ab" consumes bytes 0..2, the suffix "bc" would need byte 1 again.
        assert!(!like("abc", "%ab%bc", false));
        assert!(like("abbc", "%ab%bc", false));
    }

    #[test]
    fn test_underscores_inside_segment() {
        assert!(like("S01234", "%1_3%", false));
        assert!(like("xaxbab", "%_ab%", false));
        assert!(!like("ab", "%_ab%", false));
        assert!(like("abc", "%___%", false));
        assert!(!like("ab", "%___%", false));
    }

    #[test]
    fn test_lone_percent_matches_everything() {
        assert!(like("", "%", false));
        assert!(like("anything", "%", false));
        assert!(like("anything", "%%", false));
    }

    #[test]
    fn test_segments_bind_first_occurrence() {
        assert!(like("xaab", "x%a%", false));
        assert!(like("xaab", "x%a%b", false));
        assert!(!like("ab", "%a%_b", false));
    }
}
