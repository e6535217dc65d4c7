//! Ordered, growable list of staff IDs curated by incremental search
//!
//! Plain `Vec` plus index bookkeeping. Order carries no meaning, so removal
//! is O(1) swap-with-last.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdList {
    ids: Vec<String>,
}

impl IdList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut list = Self::new();
        for id in ids {
            list.push_unique(id.into());
        }
        list
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.ids
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.ids.iter().position(|x| x == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    /// Adds `id` unless already present. Returns whether it was added.
    pub fn push_unique(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        if self.contains(&id) {
            return false;
        }
        self.ids.push(id);
        true
    }

    /// Removes the entry at `index` by moving the last entry into its slot.
    pub fn swap_remove_at(&mut self, index: usize) -> Option<String> {
        (index < self.ids.len()).then(|| self.ids.swap_remove(index))
    }

    /// Removes `id` if present.
    pub fn remove(&mut self, id: &str) -> bool {
        match self.position(id) {
            Some(index) => {
                self.ids.swap_remove(index);
                true
            }
            None => false,
        }
    }

    /// Drops every entry for which `predicate` holds, by swap-with-last.
    /// Returns how many were dropped.
    pub fn remove_where<F: FnMut(&str) -> bool>(&mut self, mut predicate: F) -> usize {
        let mut removed = 0;
        let mut i = 0;
        while i < self.ids.len() {
            if predicate(&self.ids[i]) {
                self.ids.swap_remove(i);
                removed += 1;
            } else {
                i += 1;
            }
        }
        removed
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Hash view for one membership test per record.
    pub fn membership(&self) -> HashSet<&str> {
        self.iter().collect()
    }
}
