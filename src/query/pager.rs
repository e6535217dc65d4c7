//! Page-stable views over the visibility bitset
//!
//! ## Clamping
//!
//! `last_page` is the index of the last page holding at least one match,
//! or 0 when nothing matches. The cursor is clamped into `[0, last_page]`
//! before a page is cut, so a stale cursor from an earlier pass never
//! lands past the end.
//!
//! ## Page index
//!
//! Page `p` starts at the `p * page_size`-th visible record. Starts are
//! collected in a single walk of the bitset and rebuilt on every pass.

use std::io::Write;

use super::errors::QueryResult;
use super::policy::{PaginationMode, QueryPolicy, ResultMetadata};
use super::render::{render_page, ColumnLayout};
use super::search::{self, SearchOp};
use super::visibility::{build_visibility, VisibilitySet};
use super::TextPredicate;
use crate::observability::{log_event_with_fields, Event};
use crate::storage::{Field, StaffStore, StoreSnapshot};

/// Record index at which each page begins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageIndex {
    starts: Vec<usize>,
}

impl PageIndex {
    pub fn build(visible: &VisibilitySet, page_size: usize) -> Self {
        let starts = visible
            .iter_ones()
            .enumerate()
            .filter(|(n, _)| n % page_size == 0)
            .map(|(_, index)| index)
            .collect();
        Self { starts }
    }

    pub fn page_count(&self) -> usize {
        self.starts.len()
    }

    pub fn last_page(&self) -> usize {
        self.starts.len().saturating_sub(1)
    }

    pub fn start_of(&self, page: usize) -> Option<usize> {
        self.starts.get(page).copied()
    }
}

/// Projected cells of one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRow {
    pub offset: u64,
    pub cells: Vec<String>,
}

/// One rendered page, as handed to the navigator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageView {
    pub projection: Vec<Field>,
    pub rows: Vec<PageRow>,
    /// Zero-based
    pub page: usize,
    pub last_page: usize,
    pub matched: usize,
}

impl PageView {
    pub fn is_first(&self) -> bool {
        self.page == 0
    }

    pub fn is_last(&self) -> bool {
        self.page >= self.last_page
    }
}

/// What to do after a page has been shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageAction {
    Next,
    Previous,
    Quit,
}

/// Source of page actions in interactive mode.
pub trait PageNavigator {
    /// Called after each page. `Err(QueryError::EndOfInput)` ends the run.
    fn next_action(&mut self, view: &PageView) -> QueryResult<PageAction>;
}

/// Navigator that quits after the first page.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPrompt;

impl PageNavigator for NoPrompt {
    fn next_action(&mut self, _view: &PageView) -> QueryResult<PageAction> {
        Ok(PageAction::Quit)
    }
}

/// Bitset and page index for one pass over a snapshot.
#[derive(Debug, Clone)]
pub struct QueryPlan {
    visible: VisibilitySet,
    index: PageIndex,
}

impl QueryPlan {
    /// Evaluates `policy` against `snapshot`, fills its metadata and clamps
    /// its cursor.
    pub fn from_snapshot(snapshot: &StoreSnapshot, policy: &mut QueryPolicy) -> QueryResult<Self> {
        policy.validate()?;

        let visible = build_visibility(snapshot, policy);
        let index = PageIndex::build(&visible, policy.page_size);

        policy.set_metadata(ResultMetadata {
            total_bytes: snapshot.total_bytes,
            total_records: snapshot.len(),
            matched_records: visible.count(),
        });
        policy.cursor.clamp(index.last_page());

        Ok(Self { visible, index })
    }

    pub fn matched(&self) -> usize {
        self.visible.count()
    }

    pub fn last_page(&self) -> usize {
        self.index.last_page()
    }

    pub fn visible(&self) -> &VisibilitySet {
        &self.visible
    }

    /// Cuts the page under the policy's cursor.
    pub fn page_view(&self, snapshot: &StoreSnapshot, policy: &QueryPolicy) -> PageView {
        let page = policy.cursor.page();
        let rows = match self.index.start_of(page) {
            None => Vec::new(),
            Some(start) => self
                .visible
                .iter_ones_from(start)
                .take(policy.page_size)
                .map(|i| {
                    let entry = &snapshot.entries[i];
                    PageRow {
                        offset: entry.offset,
                        cells: policy
                            .projection
                            .iter()
                            .map(|&f| entry.record.field_text(f).into_owned())
                            .collect(),
                    }
                })
                .collect(),
        };

        PageView {
            projection: policy.projection.clone(),
            rows,
            page,
            last_page: self.last_page(),
            matched: self.matched(),
        }
    }
}

/// Loads, filters, paginates and renders staff records.
#[derive(Debug, Clone)]
pub struct QueryEngine {
    store: StaffStore,
    layout: ColumnLayout,
}

impl QueryEngine {
    pub fn new(store: StaffStore, layout: ColumnLayout) -> Self {
        Self { store, layout }
    }

    pub fn store(&self) -> &StaffStore {
        &self.store
    }

    /// Full record set, materialized.
    pub fn load(&self) -> QueryResult<StoreSnapshot> {
        Ok(self.store.scan_all()?)
    }

    /// Evaluates the policy without rendering.
    pub fn plan(&self, policy: &mut QueryPolicy) -> QueryResult<(StoreSnapshot, QueryPlan)> {
        let snapshot = self.load()?;
        let plan = QueryPlan::from_snapshot(&snapshot, policy)?;
        Ok((snapshot, plan))
    }

    /// Renders pages to `out` until the navigator quits, or once in batch
    /// mode. Returns the matched count.
    pub fn run<N, W>(&self, policy: &mut QueryPolicy, navigator: &mut N, out: &mut W) -> QueryResult<usize>
    where
        N: PageNavigator + ?Sized,
        W: Write,
    {
        let (snapshot, plan) = self.plan(policy)?;
        let matched = plan.matched();

        loop {
            let view = plan.page_view(&snapshot, policy);
            render_page(out, &view, &self.layout)?;
            out.flush()?;

            if policy.pagination == PaginationMode::Batch {
                break;
            }

            match navigator.next_action(&view)? {
                PageAction::Next => {
                    policy.cursor.next(plan.last_page());
                }
                PageAction::Previous => {
                    policy.cursor.previous();
                }
                PageAction::Quit => break,
            }
        }

        log_event_with_fields(
            Event::QueryComplete,
            &[
                ("matched", &matched.to_string()),
                ("page", &policy.cursor.page().to_string()),
                ("total_records", &snapshot.len().to_string()),
            ],
        );
        Ok(matched)
    }

    /// Recomputes the policy's ID list from a fresh scan. Returns the list
    /// length afterwards.
    pub fn narrow(
        &self,
        policy: &mut QueryPolicy,
        predicate: &TextPredicate,
        op: SearchOp,
    ) -> QueryResult<usize> {
        let snapshot = self.load()?;
        Ok(search::narrow(&snapshot, policy, predicate, op))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{IdList, PageCursor};
    use crate::storage::{Credential, StaffId, StaffRecord, StoredRecord, RECORD_SIZE};

    fn snapshot(count: usize) -> StoreSnapshot {
        let entries = (0..count)
            .map(|i| StoredRecord {
                offset: (i * RECORD_SIZE) as u64,
                record: StaffRecord::new(
                    StaffId::parse(&format!("S{:04}", i)).unwrap(),
                    format!("Name {}", i),
                    "CLERK",
                    "",
                    "",
                    Credential::from_password("pw"),
                )
                .unwrap(),
            })
            .collect::<Vec<_>>();
        StoreSnapshot {
            total_bytes: (count * RECORD_SIZE) as u64,
            entries,
        }
    }

    fn ids(view: &PageView) -> Vec<String> {
        view.rows.iter().map(|r| r.cells[0].clone()).collect()
    }

    #[test]
    fn test_page_index() {
        let mut bits = VisibilitySet::with_len(10);
        for i in [1, 2, 4, 5, 7, 9] {
            bits.set(i, true);
        }
        let index = PageIndex::build(&bits, 4);
        assert_eq!(index.page_count(), 2);
        assert_eq!(index.start_of(0), Some(1));
        assert_eq!(index.start_of(1), Some(7));
        assert_eq!(index.last_page(), 1);
        assert_eq!(PageIndex::build(&VisibilitySet::with_len(3), 4).last_page(), 0);
    }

    #[test]
    fn test_metadata_and_clamp() {
        let snap = snapshot(7);
        let mut policy = QueryPolicy::active(3).at_page(9);
        let plan = QueryPlan::from_snapshot(&snap, &mut policy).unwrap();

        assert_eq!(plan.matched(), 7);
        assert_eq!(plan.last_page(), 2);
        assert_eq!(policy.cursor.page(), 2);
        assert_eq!(policy.metadata().total_records, 7);
        assert_eq!(policy.metadata().matched_records, 7);
        assert_eq!(policy.metadata().total_bytes, 7 * RECORD_SIZE as u64);

        let view = plan.page_view(&snap, &policy);
        assert_eq!(ids(&view), vec!["S0006"]);
        assert!(view.is_last());
    }

    #[test]
    fn test_exact_multiple_has_no_empty_trailing_page() {
        let snap = snapshot(6);
        let mut policy = QueryPolicy::active(3).at_page(2);
        let plan = QueryPlan::from_snapshot(&snap, &mut policy).unwrap();
        assert_eq!(plan.last_page(), 1);
        assert_eq!(ids(&plan.page_view(&snap, &policy)).len(), 3);
    }

    #[test]
    fn test_pages_are_disjoint_and_cover() {
        let snap = snapshot(11);
        let mut policy = QueryPolicy::excluding(IdList::from_ids(["S0003"]), 4);
        let plan = QueryPlan::from_snapshot(&snap, &mut policy).unwrap();

        let mut seen = Vec::new();
        for page in 0..=plan.last_page() {
            policy.cursor = PageCursor::at(page);
            seen.extend(ids(&plan.page_view(&snap, &policy)));
        }
        let expected: Vec<String> = (0..11)
            .filter(|&i| i != 3)
            .map(|i| format!("S{:04}", i))
            .collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_empty_result_single_page() {
        let snap = snapshot(3);
        let mut policy = QueryPolicy::including(IdList::new(), 5).at_page(4);
        let plan = QueryPlan::from_snapshot(&snap, &mut policy).unwrap();
        assert_eq!(policy.cursor.page(), 0);
        let view = plan.page_view(&snap, &policy);
        assert!(view.rows.is_empty());
        assert!(view.is_first() && view.is_last());
    }

    #[test]
    fn test_no_prompt_quits() {
        let view = PageView {
            projection: Vec::new(),
            rows: Vec::new(),
            page: 0,
            last_page: 0,
            matched: 0,
        };
        assert_eq!(NoPrompt.next_action(&view).unwrap(), PageAction::Quit);
    }
}
