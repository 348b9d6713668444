//! Hand-written SQL fragments: ORDER BY, paging and filter clauses.
//!
//! Identifiers only ever come from a [`ColumnMapping`]; values always go
//! through a [`ParamBag`] as `@name` parameters.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::str::FromStr;

use sea_orm::{EntityTrait, IdenStatic, Value};
use serde::{Deserialize, Serialize};
use shaping_core::{FilterValue, PageSpec, ShapingError, ShapingResult, SortSpec};

use crate::field_map::scalar_value;
use crate::params::{ParamBag, ParamValue};

pub const PAGE_OFFSET_PARAM: &str = "PageOffset";
pub const PAGE_SIZE_PARAM: &str = "PageSize";

/* ---------- column mapping ---------- */

/// Entity metadata lookup: model property name → storage column name.
pub trait ColumnResolver: Send + Sync {
    fn column_name(&self, property: &str) -> Option<String>;
}

/// Resolves SeaORM model field names (`created_at` or `createdAt`) to the
/// entity's column names.
pub struct EntityColumns<E: EntityTrait>(PhantomData<E>);

impl<E: EntityTrait> Default for EntityColumns<E> {
    fn default() -> Self {
        Self(PhantomData)
    }
}

impl<E: EntityTrait> ColumnResolver for EntityColumns<E> {
    fn column_name(&self, property: &str) -> Option<String> {
        E::Column::from_str(property)
            .ok()
            .map(|c| c.as_str().to_owned())
    }
}

/// Allowlist from client sort keys to trusted physical columns.
///
/// Keys are matched case-insensitively. Absent keys are rejected; nothing is
/// passed through.
#[derive(Default)]
pub struct ColumnMapping {
    columns: HashMap<String, String>,
    resolver: Option<Box<dyn ColumnResolver>>,
}

impl ColumnMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(mut self, key: impl Into<String>, column: impl Into<String>) -> Self {
        self.columns.insert(key.into().to_lowercase(), column.into());
        self
    }

    /// Normalize mapped values through entity metadata. A property the
    /// resolver does not know is used as mapped.
    pub fn with_resolver(mut self, resolver: Box<dyn ColumnResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn resolve(&self, key: &str) -> Option<String> {
        let mapped = self.columns.get(&key.to_lowercase())?;
        let resolved = self
            .resolver
            .as_ref()
            .and_then(|r| r.column_name(mapped))
            .unwrap_or_else(|| mapped.clone());
        Some(resolved)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl std::fmt::Debug for ColumnMapping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColumnMapping")
            .field("columns", &self.columns)
            .field("resolver", &self.resolver.is_some())
            .finish()
    }
}

/* ---------- ORDER BY ---------- */

/// `ORDER BY` clause for a page's sort string, or `ORDER BY default_sort_sql`
/// when there is no page or its sort is blank.
///
/// `default_sort_sql` is trusted server text and is emitted verbatim.
pub fn build_order_by(
    mapping: &ColumnMapping,
    default_sort_sql: &str,
    page: Option<&PageSpec>,
) -> ShapingResult<String> {
    let sort = match page.and_then(PageSpec::sort) {
        Some(s) if !s.trim().is_empty() => s,
        _ => return Ok(format!("ORDER BY {default_sort_sql}")),
    };

    let spec = SortSpec::parse(sort).inspect_err(|e| {
        tracing::debug!(code = e.code(), error = %e, "rejected sort specification");
    })?;

    let mut parts = Vec::with_capacity(spec.len());
    for term in &spec {
        let key = term.key();
        let col = mapping.resolve(&key).ok_or_else(|| {
            tracing::debug!(key = %key, "sort key is not mapped");
            ShapingError::invalid_sort_field(&key, ShapingError::UnresolvableField(key.clone()))
        })?;
        if term.is_descending() {
            parts.push(format!("{col} DESC"));
        } else {
            parts.push(col);
        }
    }

    tracing::debug!(sort = %spec, terms = spec.len(), "built raw order by");
    Ok(format!("ORDER BY {}", parts.join(", ")))
}

/* ---------- paging ---------- */

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PagingDialect {
    /// `OFFSET .. ROWS FETCH NEXT .. ROWS ONLY` (SQL Server, Postgres, Oracle).
    #[default]
    OffsetFetch,
    /// `LIMIT .. OFFSET ..` (SQLite, MySQL, Postgres).
    LimitOffset,
}

/// Offset/fetch paging clause. `None` yields an empty string and leaves the
/// bag untouched.
pub fn build_paging(page: Option<&PageSpec>, params: &mut ParamBag) -> String {
    build_paging_for(PagingDialect::OffsetFetch, page, params)
}

pub fn build_paging_for(
    dialect: PagingDialect,
    page: Option<&PageSpec>,
    params: &mut ParamBag,
) -> String {
    let Some(page) = page else {
        return String::new();
    };

    params.add_scalar(PAGE_OFFSET_PARAM, to_i64(page.offset()));
    params.add_scalar(PAGE_SIZE_PARAM, to_i64(page.limit()));

    match dialect {
        PagingDialect::OffsetFetch => {
            format!("OFFSET @{PAGE_OFFSET_PARAM} ROWS FETCH NEXT @{PAGE_SIZE_PARAM} ROWS ONLY")
        }
        PagingDialect::LimitOffset => format!("LIMIT @{PAGE_SIZE_PARAM} OFFSET @{PAGE_OFFSET_PARAM}"),
    }
}

fn to_i64(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

/* ---------- filters ---------- */

/// Append one `  AND ...` line per active pair to `sql`, registering the
/// values in `params`.
///
/// The parameter name is the column's last `.` segment, so `e.name` binds as
/// `@name`; a later pair with the same name overwrites the earlier value.
/// `Flag` values produce `IS [NOT] NULL` only when `boolean_null_check` is
/// set.
pub fn append_filters<I, C, V>(
    sql: &mut String,
    params: &mut ParamBag,
    pairs: I,
    boolean_null_check: bool,
) where
    I: IntoIterator<Item = (C, V)>,
    C: AsRef<str>,
    V: Into<FilterValue>,
{
    for (column, value) in pairs {
        let column = column.as_ref();
        let value = value.into();
        if !value.is_active() {
            continue;
        }
        let param = column.rsplit('.').next().unwrap_or(column);

        match value {
            FilterValue::Text(s) => {
                params.add_scalar(param, Value::from(s));
                sql.push_str(&format!("  AND {column} = @{param}\n"));
            }
            FilterValue::List(items) => {
                params.add(param, ParamValue::List(items.iter().map(scalar_value).collect()));
                sql.push_str(&format!("  AND {column} IN @{param}\n"));
            }
            FilterValue::Flag(present) if boolean_null_check => {
                let not = if present { "NOT " } else { "" };
                sql.push_str(&format!("  AND {column} IS {not}NULL\n"));
            }
            FilterValue::Flag(_) | FilterValue::Null => continue,
        }
        tracing::trace!(column, "appended raw filter clause");
    }
}

#[cfg(test)]
#[path = "raw_tests.rs"]
mod raw_tests;
