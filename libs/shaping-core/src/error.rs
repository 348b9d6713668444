use thiserror::Error;

use crate::FieldKind;

/// Every way client-supplied shaping input can be rejected.
///
/// All variants describe bad client input (stale or malicious request
/// parameters), never an internal fault. Middleware maps them through
/// [`ShapingError::code`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ShapingError {
    #[error("invalid sort specification: {reason}")]
    InvalidSortSpecification {
        reason: String,
        #[source]
        cause: Option<Box<ShapingError>>,
    },

    #[error("unresolvable field: {0}")]
    UnresolvableField(String),

    #[error("invalid filter value for '{field}': expected {expected:?}")]
    InvalidFilterValue { field: String, expected: FieldKind },
}

pub type ShapingResult<T> = Result<T, ShapingError>;

impl ShapingError {
    pub fn invalid_sort(reason: impl Into<String>) -> Self {
        Self::InvalidSortSpecification {
            reason: reason.into(),
            cause: None,
        }
    }

    /// Wrap a field resolution failure hit while building an ordering.
    pub fn invalid_sort_field(path: &str, cause: ShapingError) -> Self {
        Self::InvalidSortSpecification {
            reason: format!("invalid field in sort path '{path}'"),
            cause: Some(Box::new(cause)),
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidSortSpecification { .. } => "INVALID_SORT_SPECIFICATION",
            Self::UnresolvableField(_) => "UNRESOLVABLE_FIELD",
            Self::InvalidFilterValue { .. } => "INVALID_FILTER_VALUE",
        }
    }

    /// The field name that failed to resolve, looking through wrapping
    /// sort errors.
    pub fn unresolved_field(&self) -> Option<&str> {
        match self {
            Self::UnresolvableField(name) => Some(name),
            Self::InvalidSortSpecification {
                cause: Some(inner), ..
            } => inner.unresolved_field(),
            _ => None,
        }
    }
}
