//! Pagination Stability Tests
//!
//! - Every visible record appears on exactly one page, in file order
//! - The cursor is clamped into range and never shows an empty trailing page
//! - Next past the end and previous before the start are no-ops
//! - Include/exclude filtering and deleted visibility compose

use chrono::NaiveDate;
use staffdb::query::{
    ColumnLayout, IdList, PageAction, PageNavigator, PageView, QueryEngine, QueryError,
    QueryPlan, QueryPolicy, QueryResult,
};
use staffdb::storage::{Credential, Field, StaffId, StaffRecord, StaffStore};
use tempfile::TempDir;

// =============================================================================
// Test Utilities
// =============================================================================

/// Replays a fixed list of actions and records every page it was shown.
struct ScriptedNavigator {
    actions: Vec<PageAction>,
    seen: Vec<PageView>,
}

impl ScriptedNavigator {
    fn new(actions: &[PageAction]) -> Self {
        Self {
            actions: actions.iter().rev().copied().collect(),
            seen: Vec::new(),
        }
    }

    fn pages(&self) -> Vec<usize> {
        self.seen.iter().map(|v| v.page).collect()
    }
}

impl PageNavigator for ScriptedNavigator {
    fn next_action(&mut self, view: &PageView) -> QueryResult<PageAction> {
        self.seen.push(view.clone());
        self.actions.pop().ok_or(QueryError::EndOfInput)
    }
}

fn populated_store(temp_dir: &TempDir, count: usize) -> StaffStore {
    let store = StaffStore::new(temp_dir.path().join("staff.bin"));
    for i in 0..count {
        let record = StaffRecord::new(
            StaffId::parse(&format!("S{:04}", i)).unwrap(),
            format!("Staff {}", i),
            if i % 3 == 0 { "MANAGER" } else { "CLERK" },
            "",
            "",
            Credential::from_password("pw"),
        )
        .unwrap();
        store.append(&record).unwrap();
    }
    store
}

fn delete(store: &StaffStore, id: &str) {
    let snapshot = store.scan_all().unwrap();
    let entry = snapshot.find_active(id).unwrap();
    let date = NaiveDate::from_ymd_opt(2024, 5, 5).unwrap();
    store
        .overwrite_at(entry.offset, &entry.record.mark_deleted(date))
        .unwrap();
}

fn page_ids(engine: &QueryEngine, policy: &mut QueryPolicy, page: usize) -> Vec<String> {
    let snapshot = engine.load().unwrap();
    policy.cursor = staffdb::query::PageCursor::at(page);
    let plan = QueryPlan::from_snapshot(&snapshot, policy).unwrap();
    plan.page_view(&snapshot, policy)
        .rows
        .into_iter()
        .map(|r| r.cells[0].clone())
        .collect()
}

fn engine(store: StaffStore) -> QueryEngine {
    QueryEngine::new(store, ColumnLayout::default())
}

// =============================================================================
// Page stability
// =============================================================================

#[test]
fn test_pages_partition_visible_records() {
    let temp_dir = TempDir::new().unwrap();
    let store = populated_store(&temp_dir, 23);
    delete(&store, "S0004");
    delete(&store, "S0017");
    let engine = engine(store);

    let mut policy = QueryPolicy::excluding(IdList::from_ids(["S0010"]), 5);
    let (_, plan) = engine.plan(&mut policy).unwrap();
    assert_eq!(plan.matched(), 20);
    assert_eq!(plan.last_page(), 3);

    let mut seen = Vec::new();
    for page in 0..=plan.last_page() {
        let ids = page_ids(&engine, &mut policy, page);
        assert!(ids.len() <= 5);
        seen.extend(ids);
    }

    let expected: Vec<String> = (0..23)
        .filter(|i| ![4, 10, 17].contains(i))
        .map(|i| format!("S{:04}", i))
        .collect();
    assert_eq!(seen, expected);
}

#[test]
fn test_same_policy_same_page() {
    let temp_dir = TempDir::new().unwrap();
    let engine = engine(populated_store(&temp_dir, 12));
    let mut policy = QueryPolicy::active(4);

    let first = page_ids(&engine, &mut policy, 1);
    let second = page_ids(&engine, &mut policy, 1);
    assert_eq!(first, second);
    assert_eq!(first, vec!["S0004", "S0005", "S0006", "S0007"]);
}

#[test]
fn test_cursor_clamped_to_last_non_empty_page() {
    let temp_dir = TempDir::new().unwrap();
    let engine = engine(populated_store(&temp_dir, 10));
    let mut policy = QueryPolicy::active(5).at_page(7);

    let (_, plan) = engine.plan(&mut policy).unwrap();
    assert_eq!(plan.last_page(), 1);
    assert_eq!(policy.cursor.page(), 1);
    assert_eq!(policy.metadata().matched_records, 10);
    assert_eq!(policy.metadata().total_records, 10);
}

// =============================================================================
// Interactive and batch runs
// =============================================================================

#[test]
fn test_navigation_saturates_at_both_ends() {
    let temp_dir = TempDir::new().unwrap();
    let engine = engine(populated_store(&temp_dir, 7));
    let mut policy = QueryPolicy::active(3);
    let mut navigator = ScriptedNavigator::new(&[
        PageAction::Previous,
        PageAction::Next,
        PageAction::Next,
        PageAction::Next,
        PageAction::Previous,
        PageAction::Quit,
    ]);

    let mut out = Vec::new();
    let matched = engine.run(&mut policy, &mut navigator, &mut out).unwrap();

    assert_eq!(matched, 7);
    assert_eq!(navigator.pages(), vec![0, 0, 1, 2, 2, 1]);
    assert_eq!(policy.cursor.page(), 1);
}

#[test]
fn test_end_of_input_propagates() {
    let temp_dir = TempDir::new().unwrap();
    let engine = engine(populated_store(&temp_dir, 4));
    let mut policy = QueryPolicy::active(2);
    let mut navigator = ScriptedNavigator::new(&[PageAction::Next]);

    let mut out = Vec::new();
    let result = engine.run(&mut policy, &mut navigator, &mut out);
    assert!(matches!(result, Err(QueryError::EndOfInput)));
}

#[test]
fn test_batch_emits_one_page_without_prompting() {
    let temp_dir = TempDir::new().unwrap();
    let engine = engine(populated_store(&temp_dir, 9));
    let mut policy = QueryPolicy::active(4).at_page(1).batch();
    let mut navigator = ScriptedNavigator::new(&[]);

    let mut out = Vec::new();
    assert_eq!(engine.run(&mut policy, &mut navigator, &mut out).unwrap(), 9);
    assert!(navigator.seen.is_empty());

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("S0004"));
    assert!(text.contains("S0007"));
    assert!(!text.contains("S0003"));
    assert!(!text.contains("S0008"));
    assert!(text.contains("(Page 2 of 3)"));
}

// =============================================================================
// Filter policy
// =============================================================================

#[test]
fn test_include_empty_list_shows_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let engine = engine(populated_store(&temp_dir, 5));
    let mut policy = QueryPolicy::including(IdList::new(), 10).batch();

    let mut out = Vec::new();
    assert_eq!(
        engine
            .run(&mut policy, &mut ScriptedNavigator::new(&[]), &mut out)
            .unwrap(),
        0
    );
    assert!(String::from_utf8(out).unwrap().contains("No more records!"));
}

#[test]
fn test_deleted_view_shows_tombstones_only() {
    let temp_dir = TempDir::new().unwrap();
    let store = populated_store(&temp_dir, 6);
    delete(&store, "S0002");
    delete(&store, "S0005");
    let engine = engine(store);

    let mut policy = QueryPolicy::active(10)
        .with_visibility(false, true)
        .with_projection(vec![Field::Id, Field::Status]);
    let ids = page_ids(&engine, &mut policy, 0);
    assert_eq!(ids, vec!["S0002", "S0005"]);

    let mut both = QueryPolicy::active(10).with_visibility(true, true);
    assert_eq!(page_ids(&engine, &mut both, 0).len(), 6);
}

#[test]
fn test_projection_limits_cells() {
    let temp_dir = TempDir::new().unwrap();
    let engine = engine(populated_store(&temp_dir, 1));
    let mut policy =
        QueryPolicy::active(5).with_projection(vec![Field::Position, Field::Id]);
    let snapshot = engine.load().unwrap();
    let plan = QueryPlan::from_snapshot(&snapshot, &mut policy).unwrap();
    let view = plan.page_view(&snapshot, &policy);
    assert_eq!(view.rows[0].cells, vec!["MANAGER", "S0000"]);
}
