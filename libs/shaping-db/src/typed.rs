//! Sort paths, filter objects and page specs → SeaORM query operators.
//!
//! Everything here extends a not-yet-executed SeaORM query (`Select<E>`,
//! `SelectTwo<E, F>`, ...) and hands it back. Field names coming from the
//! client are only ever looked up in a [`FieldMap`]; they never reach SQL.

use sea_orm::sea_query::{IntoColumnRef, Order, SimpleExpr};
use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use shaping_core::{
    FilterObject, FilterValue, PageSpec, ShapingError, ShapingResult, SortDir, SortSpec,
};

use crate::field_map::{coerce_scalar, coerce_text, FieldMap};

fn sea_order(dir: SortDir) -> Order {
    match dir {
        SortDir::Asc => Order::Asc,
        SortDir::Desc => Order::Desc,
    }
}

/// Drop any existing ORDER BY and append `keys` in order.
fn replace_order<Q: QueryOrder>(mut query: Q, keys: Vec<(SimpleExpr, Order)>) -> Q {
    QueryOrder::query(&mut query).clear_order_by();
    keys.into_iter()
        .fold(query, |q, (expr, ord)| q.order_by(expr, ord))
}

/* ---------- default ordering ---------- */

/// Server-side ordering used when the client did not ask for one: a primary
/// column plus optional tiebreak columns.
#[derive(Clone, Debug)]
pub struct DefaultOrder {
    keys: Vec<(SimpleExpr, Order)>,
}

impl DefaultOrder {
    pub fn asc<C: ColumnTrait>(col: C) -> Self {
        Self { keys: Vec::new() }.then(col, Order::Asc)
    }

    pub fn desc<C: ColumnTrait>(col: C) -> Self {
        Self { keys: Vec::new() }.then(col, Order::Desc)
    }

    pub fn then_asc<C: ColumnTrait>(self, col: C) -> Self {
        self.then(col, Order::Asc)
    }

    pub fn then_desc<C: ColumnTrait>(self, col: C) -> Self {
        self.then(col, Order::Desc)
    }

    fn then<C: ColumnTrait>(mut self, col: C, ord: Order) -> Self {
        let col_ref = (C::EntityName::default(), col).into_column_ref();
        self.keys.push((SimpleExpr::Column(col_ref), ord));
        self
    }

    pub fn apply<Q: QueryOrder>(&self, query: Q) -> Q {
        replace_order(query, self.keys.clone())
    }
}

/* ---------- sort path ---------- */

/// Order a query by a client sort string such as `-name,department.code`.
pub trait OrderByPathExt<E: EntityTrait>: Sized {
    /// Parses `sort`, resolves every path against `fld_map` and replaces the
    /// query's ordering: first term primary, the rest tiebreakers.
    ///
    /// Fails with `InvalidSortSpecification` for blank/empty specs and for
    /// paths missing from the map (the resolution error is the `cause`).
    fn order_by_path(self, sort: &str, fld_map: &FieldMap<E>) -> ShapingResult<Self>;
}

impl<E, Q> OrderByPathExt<E> for Q
where
    E: EntityTrait,
    Q: QueryOrder,
{
    fn order_by_path(self, sort: &str, fld_map: &FieldMap<E>) -> ShapingResult<Self> {
        let spec = SortSpec::parse(sort).inspect_err(|e| {
            tracing::debug!(code = e.code(), error = %e, "rejected sort specification");
        })?;

        let mut keys = Vec::with_capacity(spec.len());
        for term in &spec {
            let field = fld_map.resolve(&term.path).map_err(|e| {
                tracing::debug!(path = %term.key(), "sort path does not resolve");
                ShapingError::invalid_sort_field(&term.key(), e)
            })?;
            keys.push((field.order_expr(), sea_order(term.dir)));
        }

        tracing::debug!(sort = %spec, terms = spec.len(), "applying sort path");
        Ok(replace_order(self, keys))
    }
}

/* ---------- filter objects ---------- */

/// Build the AND-ed condition for `filter`, or `None` when no term is active.
///
/// Terms named in `except` (case-insensitive) are skipped, as are inactive
/// values. A name missing from `fld_map` fails only when its value is active.
pub fn filter_condition<E, F>(
    filter: &F,
    fld_map: &FieldMap<E>,
    except: &[&str],
) -> ShapingResult<Option<Condition>>
where
    E: EntityTrait,
    F: FilterObject + ?Sized,
{
    let mut cond = Condition::all();
    let mut applied = 0usize;

    for (name, value) in filter.filter_terms() {
        if except.iter().any(|x| x.eq_ignore_ascii_case(name)) || !value.is_active() {
            continue;
        }
        let field = fld_map.resolve_name(name)?;
        let expr = match value {
            FilterValue::Text(s) => field.expr().eq(coerce_text(name, field.kind, &s)?),
            FilterValue::List(items) => {
                let vals = items
                    .iter()
                    .map(|item| coerce_scalar(name, field.kind, item))
                    .collect::<ShapingResult<Vec<_>>>()?;
                field.expr().is_in(vals)
            }
            FilterValue::Flag(true) => field.expr().is_not_null(),
            FilterValue::Flag(false) => field.expr().is_null(),
            FilterValue::Null => continue,
        };
        cond = cond.add(expr);
        applied += 1;
    }

    Ok((applied > 0).then_some(cond))
}

/// Apply a filter object's active fields as AND-ed predicates.
pub trait FilterObjectExt<E: EntityTrait>: Sized {
    /// `None` returns the query untouched.
    fn apply_filters<F: FilterObject + ?Sized>(
        self,
        filter: Option<&F>,
        fld_map: &FieldMap<E>,
        except: &[&str],
    ) -> ShapingResult<Self>;
}

impl<E, Q> FilterObjectExt<E> for Q
where
    E: EntityTrait,
    Q: QueryFilter,
{
    fn apply_filters<F: FilterObject + ?Sized>(
        self,
        filter: Option<&F>,
        fld_map: &FieldMap<E>,
        except: &[&str],
    ) -> ShapingResult<Self> {
        let Some(filter) = filter else {
            return Ok(self);
        };
        match filter_condition(filter, fld_map, except)? {
            Some(cond) => {
                tracing::debug!("applying filter object");
                Ok(self.filter(cond))
            }
            None => Ok(self),
        }
    }
}

/* ---------- page spec ---------- */

/// Sorting driven by a page spec with a server-side fallback.
pub trait SortingExt<E: EntityTrait>: Sized {
    /// A non-empty client sort string replaces the defaults entirely; it is
    /// never merged with them. Without either, the query stays unsorted.
    fn apply_sorting(
        self,
        page: Option<&PageSpec>,
        fld_map: &FieldMap<E>,
        default_order: Option<&DefaultOrder>,
    ) -> ShapingResult<Self>;
}

impl<E, Q> SortingExt<E> for Q
where
    E: EntityTrait,
    Q: QueryOrder,
{
    fn apply_sorting(
        self,
        page: Option<&PageSpec>,
        fld_map: &FieldMap<E>,
        default_order: Option<&DefaultOrder>,
    ) -> ShapingResult<Self> {
        match page.and_then(PageSpec::sort) {
            Some(sort) if !sort.is_empty() => self.order_by_path(sort, fld_map),
            _ => Ok(match default_order {
                Some(order) => order.apply(self),
                None => self,
            }),
        }
    }
}

/// Offset/limit paging.
pub trait PagingExt: Sized {
    /// With a page: skip `offset`, take `limit`, no sorting. Without one:
    /// only the default order (if any) and no limit.
    fn apply_paging(self, page: Option<&PageSpec>, default_order: Option<&DefaultOrder>) -> Self;
}

impl<Q> PagingExt for Q
where
    Q: QueryOrder + QuerySelect,
{
    fn apply_paging(self, page: Option<&PageSpec>, default_order: Option<&DefaultOrder>) -> Self {
        match (page, default_order) {
            (Some(page), _) => self.offset(page.offset()).limit(page.limit()),
            (None, Some(order)) => order.apply(self),
            (None, None) => self,
        }
    }
}

#[cfg(test)]
#[path = "typed_tests.rs"]
mod typed_tests;
