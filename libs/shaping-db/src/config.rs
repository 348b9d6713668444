//! Shaping configuration: page limits and the raw paging dialect.
//!
//! Loaded in layers: defaults → YAML file → environment variables, e.g.
//! `SHAPING__PAGING__MAX=500` or `SHAPING__DIALECT=limit_offset`.

use std::path::Path;

use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use shaping_core::{LimitCfg, PageSpec};
use thiserror::Error;

use crate::raw::PagingDialect;

pub const ENV_PREFIX: &str = "SHAPING__";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to extract shaping config: {0}")]
    Extract(#[from] Box<figment::Error>),

    #[error("paging.default ({default}) must be between 1 and paging.max ({max})")]
    InvalidLimits { default: u64, max: u64 },
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        Self::Extract(Box::new(e))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShapingConfig {
    pub paging: LimitCfg,
    pub dialect: PagingDialect,
}

impl ShapingConfig {
    /// Extract from an already assembled figment and validate the limits.
    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let cfg: Self = figment.extract()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// defaults → YAML file at `path` (missing file is fine) → `SHAPING__*` env.
    pub fn load_layered<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let cfg = Self::from_figment(figment)?;
        tracing::debug!(
            default_limit = cfg.paging.default,
            max_limit = cfg.paging.max,
            dialect = ?cfg.dialect,
            "loaded shaping config"
        );
        Ok(cfg)
    }

    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load_layered(p),
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let LimitCfg { default, max } = self.paging;
        if default == 0 || max == 0 || default > max {
            return Err(ConfigError::InvalidLimits { default, max });
        }
        Ok(())
    }

    /// Clamp a client page into the configured limits.
    pub fn page(&self, spec: PageSpec) -> PageSpec {
        spec.clamped(self.paging)
    }

    /// Page for a request that sent no paging parameters at all.
    pub fn default_page(&self) -> PageSpec {
        PageSpec::new(0, self.paging.default, None)
    }
}
