//! Storage-agnostic vocabulary for shaping client-supplied queries.
//!
//! Web layers produce a [`PageSpec`] and filter objects from request query
//! strings; the SQL-facing crates consume them. Nothing here knows about a
//! database: sort strings are parsed into [`SortSpec`], filter objects report
//! [`FilterValue`]s, and every rejection is a [`ShapingError`].

mod error;
pub mod filter;
mod page;
pub mod sort;

pub use error::{ShapingError, ShapingResult};
pub use filter::{FilterObject, FilterValue, Scalar};
pub use page::{LimitCfg, PageSpec};
pub use sort::{SortDir, SortSpec, SortTerm, MAX_SORT_SPEC_LEN};

/// Whitelisted field kind, used to coerce textual filter values into typed
/// SQL values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldKind {
    String,
    I64,
    F64,
    Bool,
    Uuid,
    DateTimeUtc,
    Date,
    Time,
    Decimal,
}
