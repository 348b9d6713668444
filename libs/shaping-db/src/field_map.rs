//! Compile-time registered field tables: api field name → trusted column.

use std::collections::HashMap;
use std::marker::PhantomData;

use chrono::{NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::{ColumnRef, Expr, IntoColumnRef, SimpleExpr};
use sea_orm::{EntityTrait, Value};
use shaping_core::{FieldKind, Scalar, ShapingError, ShapingResult};

/// A whitelisted column, already qualified with its table.
#[derive(Clone, Debug)]
pub struct Field {
    col: ColumnRef,
    pub kind: FieldKind,
}

impl Field {
    pub fn expr(&self) -> Expr {
        Expr::col(self.col.clone())
    }

    /// The column as an ordering key.
    pub fn order_expr(&self) -> SimpleExpr {
        SimpleExpr::Column(self.col.clone())
    }

    pub fn column_ref(&self) -> &ColumnRef {
        &self.col
    }
}

/// Untyped shape shared by a map and its nested relation maps.
#[derive(Clone, Debug, Default)]
struct Shape {
    fields: HashMap<String, Field>,
    nested: HashMap<String, Shape>,
}

impl Shape {
    fn resolve(&self, path: &[String]) -> Option<&Field> {
        match path {
            [] => None,
            [name] => self.fields.get(&name.to_lowercase()),
            [relation, rest @ ..] => self.nested.get(&relation.to_lowercase())?.resolve(rest),
        }
    }
}

/// Per-entity allowlist of sortable/filterable fields.
///
/// Names are matched case-insensitively. Related entities are registered with
/// [`FieldMap::nested`] and addressed with dotted paths (`department.code`);
/// joining the related table is up to the caller.
#[derive(Clone, Debug)]
pub struct FieldMap<E: EntityTrait> {
    shape: Shape,
    _entity: PhantomData<E>,
}

impl<E: EntityTrait> Default for FieldMap<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: EntityTrait> FieldMap<E> {
    pub fn new() -> Self {
        Self {
            shape: Shape::default(),
            _entity: PhantomData,
        }
    }

    pub fn insert(mut self, api_name: impl Into<String>, col: E::Column, kind: FieldKind) -> Self {
        self.shape.fields.insert(
            api_name.into().to_lowercase(),
            Field {
                col: (E::default(), col).into_column_ref(),
                kind,
            },
        );
        self
    }

    /// Register the fields of a related entity under `relation`.
    pub fn nested<R: EntityTrait>(mut self, relation: impl Into<String>, map: FieldMap<R>) -> Self {
        self.shape
            .nested
            .insert(relation.into().to_lowercase(), map.shape);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.shape.fields.get(&name.to_lowercase())
    }

    /// Resolve a (possibly nested) path; a miss is `UnresolvableField`.
    pub fn resolve(&self, path: &[String]) -> ShapingResult<&Field> {
        self.shape
            .resolve(path)
            .ok_or_else(|| ShapingError::UnresolvableField(path.join(".")))
    }

    /// Resolve a dotted name such as `department.code`.
    pub fn resolve_name(&self, name: &str) -> ShapingResult<&Field> {
        let path: Vec<String> = name.split('.').map(str::to_owned).collect();
        self.resolve(&path)
    }
}

/* ---------- coercion helpers ---------- */

fn mismatch(field: &str, expected: FieldKind) -> ShapingError {
    ShapingError::InvalidFilterValue {
        field: field.to_owned(),
        expected,
    }
}

/// Parse a textual filter value according to the field kind.
pub fn coerce_text(field: &str, kind: FieldKind, s: &str) -> ShapingResult<Value> {
    let s_trim = s.trim();
    let err = || mismatch(field, kind);

    let v = match kind {
        FieldKind::String => Value::String(Some(Box::new(s.to_owned()))),
        FieldKind::I64 => Value::BigInt(Some(s_trim.parse::<i64>().map_err(|_| err())?)),
        FieldKind::F64 => Value::Double(Some(s_trim.parse::<f64>().map_err(|_| err())?)),
        FieldKind::Bool => Value::Bool(Some(s_trim.parse::<bool>().map_err(|_| err())?)),
        FieldKind::Uuid => Value::Uuid(Some(Box::new(
            s_trim.parse::<uuid::Uuid>().map_err(|_| err())?,
        ))),
        FieldKind::DateTimeUtc => {
            let dt = chrono::DateTime::parse_from_rfc3339(s_trim)
                .map_err(|_| err())?
                .with_timezone(&Utc);
            Value::ChronoDateTimeUtc(Some(Box::new(dt)))
        }
        FieldKind::Date => Value::ChronoDate(Some(Box::new(
            s_trim.parse::<NaiveDate>().map_err(|_| err())?,
        ))),
        FieldKind::Time => Value::ChronoTime(Some(Box::new(
            s_trim.parse::<NaiveTime>().map_err(|_| err())?,
        ))),
        FieldKind::Decimal => Value::Decimal(Some(Box::new(
            s_trim.parse::<Decimal>().map_err(|_| err())?,
        ))),
    };
    Ok(v)
}

/// Coerce one list element according to the field kind.
pub fn coerce_scalar(field: &str, kind: FieldKind, item: &Scalar) -> ShapingResult<Value> {
    match (kind, item) {
        (_, Scalar::Text(s)) => coerce_text(field, kind, s),
        (FieldKind::I64, Scalar::Int(i)) => Ok(Value::BigInt(Some(*i))),
        (FieldKind::F64, Scalar::Int(i)) => Ok(Value::Double(Some(*i as f64))),
        (FieldKind::Decimal, Scalar::Int(i)) => Ok(Value::Decimal(Some(Box::new(Decimal::from(*i))))),
        (FieldKind::Uuid, Scalar::Uuid(u)) => Ok(Value::Uuid(Some(Box::new(*u)))),
        (expected, _) => Err(mismatch(field, expected)),
    }
}

/// The untyped SQL value of a list element, for raw parameter binding.
pub fn scalar_value(item: &Scalar) -> Value {
    match item {
        Scalar::Text(s) => Value::String(Some(Box::new(s.clone()))),
        Scalar::Int(i) => Value::BigInt(Some(*i)),
        Scalar::Uuid(u) => Value::Uuid(Some(Box::new(*u))),
    }
}
