//! Query engine: filtering, pagination and incremental search
//!
//! Each pass scans the whole store, builds a visibility bitset from the
//! caller's [`QueryPolicy`], and cuts pages from it. The engine never
//! writes to the store.
//!
//! A record is visible when:
//! 1. its deleted/active state is enabled by the policy,
//! 2. it satisfies the optional [`TextPredicate`],
//! 3. its ID is listed (include mode) or not listed (exclude mode).
//!
//! Pages are stable: for a fixed snapshot and policy, every visible record
//! appears on exactly one page, in file order.

mod errors;
mod id_list;
mod pager;
mod policy;
mod render;
mod search;
mod visibility;

pub use errors::{QueryError, QueryResult};
pub use id_list::IdList;
pub use pager::{
    NoPrompt, PageAction, PageIndex, PageNavigator, PageRow, PageView, QueryEngine, QueryPlan,
};
pub use policy::{
    FilterMode, PageCursor, PaginationMode, QueryPolicy, ResultMetadata, TextPredicate,
    DEFAULT_PROJECTION,
};
pub use render::{ellipsize, header_label, render_page, ColumnLayout};
pub use search::{narrow, SearchOp};
pub use visibility::{build_visibility, VisibilitySet};
