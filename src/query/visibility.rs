//! Visibility bitset over a store snapshot

use super::policy::{FilterMode, QueryPolicy};
use crate::storage::StoreSnapshot;

const WORD_BITS: usize = 64;

/// One bit per record, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisibilitySet {
    words: Vec<u64>,
    len: usize,
}

impl VisibilitySet {
    /// All bits clear.
    pub fn with_len(len: usize) -> Self {
        Self {
            words: vec![0; len.div_ceil(WORD_BITS)],
            len,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn set(&mut self, index: usize, visible: bool) {
        debug_assert!(index < self.len);
        let mask = 1u64 << (index % WORD_BITS);
        if visible {
            self.words[index / WORD_BITS] |= mask;
        } else {
            self.words[index / WORD_BITS] &= !mask;
        }
    }

    pub fn get(&self, index: usize) -> bool {
        index < self.len && self.words[index / WORD_BITS] & (1u64 << (index % WORD_BITS)) != 0
    }

    pub fn count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Indices of set bits, ascending.
    pub fn iter_ones(&self) -> impl Iterator<Item = usize> + '_ {
        self.iter_ones_from(0)
    }

    /// Indices of set bits at or after `start`, ascending.
    pub fn iter_ones_from(&self, start: usize) -> impl Iterator<Item = usize> + '_ {
        (start..self.len).filter(move |&i| self.get(i))
    }
}

/// Computes which records the policy shows.
///
/// State filter first, then the optional predicate. Survivors start at
/// `true` under [`FilterMode::Exclude`] and `false` under
/// [`FilterMode::Include`]; listed IDs flip the bit.
pub fn build_visibility(snapshot: &StoreSnapshot, policy: &QueryPolicy) -> VisibilitySet {
    let mut bits = VisibilitySet::with_len(snapshot.len());
    let listed = policy.ids.membership();
    let initial = policy.mode == FilterMode::Exclude;

    for (index, entry) in snapshot.iter().enumerate() {
        let record = &entry.record;
        if !policy.state_visible(record) {
            continue;
        }
        if let Some(predicate) = &policy.predicate {
            if !predicate.matches(record) {
                continue;
            }
        }
        let flip = listed.contains(record.id.as_str());
        bits.set(index, initial != flip);
    }

    bits
}
