//! Filter values and the objects that carry them.

use uuid::Uuid;

/// A single list element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Scalar {
    Text(String),
    Int(i64),
    Uuid(Uuid),
}

/// A filter term's value. What predicate it turns into depends on the
/// variant:
///
/// - `Text` → equality
/// - `List` → set membership
/// - `Flag(true)` / `Flag(false)` → column is / is not present
/// - `Null` → nothing
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum FilterValue {
    #[default]
    Null,
    Text(String),
    Flag(bool),
    List(Vec<Scalar>),
}

impl FilterValue {
    /// Inactive values are skipped without error: `Null`, blank text and
    /// empty lists.
    pub fn is_active(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Text(s) => !s.trim().is_empty(),
            Self::Flag(_) => true,
            Self::List(items) => !items.is_empty(),
        }
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<bool> for FilterValue {
    fn from(b: bool) -> Self {
        Self::Flag(b)
    }
}

impl From<Vec<Scalar>> for FilterValue {
    fn from(items: Vec<Scalar>) -> Self {
        Self::List(items)
    }
}

impl From<Vec<String>> for FilterValue {
    fn from(items: Vec<String>) -> Self {
        Self::List(items.into_iter().map(Scalar::Text).collect())
    }
}

impl From<Vec<&str>> for FilterValue {
    fn from(items: Vec<&str>) -> Self {
        Self::List(items.into_iter().map(|s| Scalar::Text(s.to_owned())).collect())
    }
}

impl From<Vec<i64>> for FilterValue {
    fn from(items: Vec<i64>) -> Self {
        Self::List(items.into_iter().map(Scalar::Int).collect())
    }
}

impl From<Vec<Uuid>> for FilterValue {
    fn from(items: Vec<Uuid>) -> Self {
        Self::List(items.into_iter().map(Scalar::Uuid).collect())
    }
}

impl<T: Into<FilterValue>> From<Option<T>> for FilterValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

/// An object whose named fields are filter terms.
///
/// Implementations report every field, active or not, in declaration order.
/// Field names are matched against the target entity's field map, so an
/// unknown name surfaces only when its value is active.
pub trait FilterObject {
    fn filter_terms(&self) -> Vec<(&'static str, FilterValue)>;
}

impl FilterObject for [(&'static str, FilterValue)] {
    fn filter_terms(&self) -> Vec<(&'static str, FilterValue)> {
        self.to_vec()
    }
}

impl FilterObject for Vec<(&'static str, FilterValue)> {
    fn filter_terms(&self) -> Vec<(&'static str, FilterValue)> {
        self.clone()
    }
}

/// Implement [`FilterObject`] for a struct by listing its filter fields.
///
/// Each field must be `Clone` and convertible into [`FilterValue`].
///
/// ```
/// use shaping_core::{impl_filter_object, FilterObject, FilterValue};
///
/// #[derive(Default)]
/// struct UserFilter {
///     name: Option<String>,
///     has_email: Option<bool>,
/// }
/// impl_filter_object!(UserFilter { name, has_email });
///
/// let f = UserFilter { name: Some("Ada".into()), ..Default::default() };
/// assert_eq!(f.filter_terms()[0], ("name", FilterValue::Text("Ada".into())));
/// assert_eq!(f.filter_terms()[1], ("has_email", FilterValue::Null));
/// ```
#[macro_export]
macro_rules! impl_filter_object {
    ($ty:ty { $($field:ident),+ $(,)? }) => {
        impl $crate::FilterObject for $ty {
            fn filter_terms(&self) -> ::std::vec::Vec<(&'static str, $crate::FilterValue)> {
                ::std::vec![
                    $((stringify!($field), $crate::FilterValue::from(self.$field.clone())),)+
                ]
            }
        }
    };
}
