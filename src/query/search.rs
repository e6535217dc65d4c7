//! Incremental narrowing of the policy's ID list

use serde::{Deserialize, Serialize};

use super::policy::{FilterMode, QueryPolicy, TextPredicate};
use crate::observability::{log_event_with_fields, Event};
use crate::storage::StoreSnapshot;

/// How a search combines with the current ID list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchOp {
    /// List becomes the matching IDs
    Replace,
    /// Matching IDs not yet listed are added
    Append,
    /// Listed IDs whose record matches are dropped
    Remove,
    /// List becomes the non-matching IDs
    Invert,
}

impl SearchOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchOp::Replace => "replace",
            SearchOp::Append => "append",
            SearchOp::Remove => "remove",
            SearchOp::Invert => "invert",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "replace" => Some(SearchOp::Replace),
            "append" => Some(SearchOp::Append),
            "remove" => Some(SearchOp::Remove),
            "invert" => Some(SearchOp::Invert),
            _ => None,
        }
    }
}

/// Applies `op` to `policy.ids` using the records the policy's state filter
/// shows. Forces [`FilterMode::Include`] and returns the new list length.
///
/// Only the state filter applies here; `policy.predicate` does not.
pub fn narrow(
    snapshot: &StoreSnapshot,
    policy: &mut QueryPolicy,
    predicate: &TextPredicate,
    op: SearchOp,
) -> usize {
    let candidates = snapshot
        .iter()
        .map(|e| &e.record)
        .filter(|r| policy.state_visible(r));

    match op {
        SearchOp::Replace | SearchOp::Invert => {
            let want = op == SearchOp::Replace;
            let ids: Vec<String> = candidates
                .filter(|r| predicate.matches(r) == want)
                .map(|r| r.id.as_str().to_string())
                .collect();
            policy.ids.clear();
            for id in ids {
                policy.ids.push_unique(id);
            }
        }
        SearchOp::Append => {
            let ids: Vec<String> = candidates
                .filter(|r| predicate.matches(r))
                .map(|r| r.id.as_str().to_string())
                .collect();
            for id in ids {
                policy.ids.push_unique(id);
            }
        }
        SearchOp::Remove => {
            let matching: Vec<&str> = candidates
                .filter(|r| predicate.matches(r))
                .map(|r| r.id.as_str())
                .collect();
            policy.ids.remove_where(|id| matching.contains(&id));
        }
    }

    policy.mode = FilterMode::Include;

    log_event_with_fields(
        Event::SearchNarrowed,
        &[
            ("field", predicate.field.as_str()),
            ("listed", &policy.ids.len().to_string()),
            ("op", op.as_str()),
        ],
    );
    policy.ids.len()
}
