//! SQL-facing query shaping.
//!
//! Turns client-supplied [`PageSpec`]s, sort strings and filter objects into
//! SQL ordering, paging and filtering, on two paths:
//!
//! - [`typed`]: extension traits over not-yet-executed SeaORM queries
//!   (`order_by_path`, `apply_filters`, `apply_sorting`, `apply_paging`),
//!   driven by a per-entity [`FieldMap`].
//! - [`raw`]: text fragments for hand-written SQL (`build_order_by`,
//!   `build_paging`, `append_filters`) with values in a [`ParamBag`], bound
//!   through [`ParamBag::to_statement`].
//!
//! Client field names are only ever lookup keys; the identifiers that reach
//! SQL come from the registered maps.
//!
//! # Features
//! - `sqlite` (default), `pg`, `mysql`: SeaORM backends
//!
//! # Example
//! ```rust,no_run
//! use sea_orm::entity::prelude::*;
//! use shaping_core::{FieldKind, PageSpec};
//! use shaping_db::{FieldMap, OrderByPathExt, PagingExt};
//!
//! #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
//! #[sea_orm(table_name = "employee")]
//! pub struct Model {
//!     #[sea_orm(primary_key)]
//!     pub id: i32,
//!     pub name: String,
//! }
//!
//! #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
//! pub enum Relation {}
//!
//! impl ActiveModelBehavior for ActiveModel {}
//!
//! # fn main() -> Result<(), shaping_core::ShapingError> {
//! let fields = FieldMap::<Entity>::new()
//!     .insert("id", Column::Id, FieldKind::I64)
//!     .insert("name", Column::Name, FieldKind::String);
//!
//! let page = PageSpec::new(0, 20, None);
//! let _query = Entity::find()
//!     .order_by_path("-name,id", &fields)?
//!     .apply_paging(Some(&page), None);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod field_map;
pub mod params;
pub mod raw;
pub mod typed;

pub use config::{ConfigError, ShapingConfig};
pub use field_map::{Field, FieldMap};
pub use params::{BindError, ParamBag, ParamValue};
pub use raw::{
    append_filters, build_order_by, build_paging, build_paging_for, ColumnMapping,
    ColumnResolver, EntityColumns, PagingDialect,
};
pub use typed::{
    filter_condition, DefaultOrder, FilterObjectExt, OrderByPathExt, PagingExt, SortingExt,
};

pub use shaping_core::{
    FieldKind, FilterObject, FilterValue, LimitCfg, PageSpec, Scalar, ShapingError,
    ShapingResult, SortDir, SortSpec,
};
