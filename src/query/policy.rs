//! Query policy: filter, projection and pagination settings for one view
//!
//! The caller owns the policy and passes it to every call. The engine
//! clamps the cursor and fills in [`ResultMetadata`]; interactive callers
//! keep the same policy across page requests.

use serde::{Deserialize, Serialize};

use super::errors::{QueryError, QueryResult};
use super::id_list::IdList;
use crate::matcher;
use crate::storage::{Field, StaffRecord};

/// How the ID list is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterMode {
    /// Show only listed IDs; an empty list shows nothing
    Include,
    /// Hide listed IDs; an empty list shows everything
    Exclude,
}

/// Whether the engine asks the navigator between pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaginationMode {
    Interactive,
    /// One page, no prompting
    Batch,
}

/// Current page, owned by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageCursor {
    page: usize,
}

impl PageCursor {
    pub fn at(page: usize) -> Self {
        Self { page }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    /// Moves forward unless already on `last_page`.
    pub fn next(&mut self, last_page: usize) -> bool {
        if self.page < last_page {
            self.page += 1;
            true
        } else {
            false
        }
    }

    /// Moves back unless already on the first page.
    pub fn previous(&mut self) -> bool {
        if self.page > 0 {
            self.page -= 1;
            true
        } else {
            false
        }
    }

    pub fn clamp(&mut self, last_page: usize) {
        self.page = self.page.min(last_page);
    }
}

/// Counts computed by the engine on each pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultMetadata {
    pub total_bytes: u64,
    pub total_records: usize,
    pub matched_records: usize,
}

/// Free-text condition on one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextPredicate {
    pub field: Field,
    /// `LIKE` pattern with `%` and `_`
    pub pattern: String,
    pub ignore_case: bool,
}

impl TextPredicate {
    pub fn new(field: Field, pattern: impl Into<String>, ignore_case: bool) -> Self {
        Self {
            field,
            pattern: pattern.into(),
            ignore_case,
        }
    }

    pub fn matches(&self, record: &StaffRecord) -> bool {
        matcher::like(&record.field_text(self.field), &self.pattern, self.ignore_case)
    }
}

/// Fields shown when the caller does not choose.
pub const DEFAULT_PROJECTION: [Field; 3] = [Field::Id, Field::Name, Field::Position];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryPolicy {
    pub ids: IdList,
    pub mode: FilterMode,
    /// Fields to surface, in display order
    pub projection: Vec<Field>,
    pub page_size: usize,
    pub cursor: PageCursor,
    pub pagination: PaginationMode,
    pub show_deleted: bool,
    pub show_active: bool,
    pub predicate: Option<TextPredicate>,
    #[serde(skip)]
    metadata: ResultMetadata,
}

impl QueryPolicy {
    /// Every active record, interactive, default projection.
    pub fn active(page_size: usize) -> Self {
        Self {
            ids: IdList::new(),
            mode: FilterMode::Exclude,
            projection: DEFAULT_PROJECTION.to_vec(),
            page_size,
            cursor: PageCursor::default(),
            pagination: PaginationMode::Interactive,
            show_deleted: false,
            show_active: true,
            predicate: None,
            metadata: ResultMetadata::default(),
        }
    }

    /// Only the listed IDs (active records).
    pub fn including(ids: IdList, page_size: usize) -> Self {
        Self {
            ids,
            mode: FilterMode::Include,
            ..Self::active(page_size)
        }
    }

    /// Everything except the listed IDs (active records).
    pub fn excluding(ids: IdList, page_size: usize) -> Self {
        Self {
            ids,
            mode: FilterMode::Exclude,
            ..Self::active(page_size)
        }
    }

    pub fn with_projection(mut self, projection: impl Into<Vec<Field>>) -> Self {
        self.projection = projection.into();
        self
    }

    pub fn with_visibility(mut self, show_active: bool, show_deleted: bool) -> Self {
        self.show_active = show_active;
        self.show_deleted = show_deleted;
        self
    }

    pub fn with_predicate(mut self, predicate: TextPredicate) -> Self {
        self.predicate = Some(predicate);
        self
    }

    pub fn batch(mut self) -> Self {
        self.pagination = PaginationMode::Batch;
        self
    }

    pub fn at_page(mut self, page: usize) -> Self {
        self.cursor = PageCursor::at(page);
        self
    }

    /// Counts from the most recent pass.
    pub fn metadata(&self) -> &ResultMetadata {
        &self.metadata
    }

    pub(crate) fn set_metadata(&mut self, metadata: ResultMetadata) {
        self.metadata = metadata;
    }

    /// Deleted/active filter only.
    pub fn state_visible(&self, record: &StaffRecord) -> bool {
        if record.is_deleted() {
            self.show_deleted
        } else {
            self.show_active
        }
    }

    pub fn validate(&self) -> QueryResult<()> {
        if self.page_size == 0 {
            return Err(QueryError::InvalidPolicy("page_size must be > 0".to_string()));
        }
        if self.projection.is_empty() {
            return Err(QueryError::InvalidPolicy(
                "projection must name at least one field".to_string(),
            ));
        }
        Ok(())
    }
}
