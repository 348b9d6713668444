use serde::{Deserialize, Deserializer, Serialize};

pub const DEFAULT_PAGE_LIMIT: u64 = 100;
pub const DEFAULT_MAX_PAGE_LIMIT: u64 = 1000;

/// Offset/limit window plus an optional client sort string.
///
/// Produced once per request by the web layer and consumed by a single
/// apply operation. Fields are read-only after construction.
#[cfg_attr(feature = "with-utoipa", derive(utoipa::ToSchema))]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSpec {
    #[serde(alias = "pageOffset")]
    offset: u64,
    #[serde(alias = "pageSize", deserialize_with = "positive_limit")]
    limit: u64,
    #[serde(alias = "sortBy", skip_serializing_if = "Option::is_none")]
    sort: Option<String>,
}

impl Default for PageSpec {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: DEFAULT_PAGE_LIMIT,
            sort: None,
        }
    }
}

impl PageSpec {
    /// A zero limit is raised to 1.
    pub fn new(offset: u64, limit: u64, sort: Option<String>) -> Self {
        Self {
            offset,
            limit: limit.max(1),
            sort,
        }
    }

    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn sort(&self) -> Option<&str> {
        self.sort.as_deref()
    }

    /// Clamp the limit into `[1, cfg.max]`.
    pub fn clamped(mut self, cfg: LimitCfg) -> Self {
        self.limit = cfg.clamp(Some(self.limit));
        self
    }
}

fn positive_limit<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    Ok(u64::deserialize(d)?.max(1))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LimitCfg {
    pub default: u64,
    pub max: u64,
}

impl Default for LimitCfg {
    fn default() -> Self {
        Self {
            default: DEFAULT_PAGE_LIMIT,
            max: DEFAULT_MAX_PAGE_LIMIT,
        }
    }
}

impl LimitCfg {
    pub fn clamp(&self, requested: Option<u64>) -> u64 {
        let mut l = requested.unwrap_or(self.default);
        if l == 0 {
            l = 1;
        }
        if l > self.max {
            l = self.max;
        }
        l
    }
}
