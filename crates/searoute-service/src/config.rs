//! Service configuration read from the environment.
//!
//! | Variable                   | Default                          |
//! |----------------------------|----------------------------------|
//! | `SEAROUTE_MASK_PATH`       | platform data dir `water_mask.bin` |
//! | `SERVICE_PORT`             | `8080`                           |
//! | `SEAROUTE_MAX_SNAP_RADIUS` | `10`                             |
//! | `SEAROUTE_MAX_EXPANSIONS`  | unlimited                        |
//! | `SEAROUTE_TIMEOUT_MS`      | unlimited                        |
//! | `SEAROUTE_COST_MODEL`      | `geographic`                     |
//! | `SEAROUTE_SIMPLIFY`        | `collinear`                      |

use std::str::FromStr;

use searoute_lib::source::MASK_PATH_ENV;
use searoute_lib::{resolve_mask_location, CostModel, RouterConfig, SimplifyMode};

pub const DEFAULT_PORT: u16 = 8080;

/// Error while reading service configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// A variable was set but could not be parsed.
    Invalid {
        name: &'static str,
        value: String,
        message: String,
    },
    /// No mask location was given and no default could be derived.
    MaskLocation(searoute_lib::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid {
                name,
                value,
                message,
            } => write!(f, "invalid {name}={value:?}: {message}"),
            Self::MaskLocation(e) => write!(f, "cannot resolve water mask location: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::MaskLocation(e) => Some(e),
            Self::Invalid { .. } => None,
        }
    }
}

/// Everything the service binary needs before it starts listening.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub mask_location: String,
    pub port: u16,
    pub router: RouterConfig,
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mask = lookup(MASK_PATH_ENV).filter(|v| !v.trim().is_empty());
        let mask_location =
            resolve_mask_location(mask.as_deref()).map_err(ConfigError::MaskLocation)?;

        let defaults = RouterConfig::default();
        let router = RouterConfig {
            max_snap_radius: parse_var(&lookup, "SEAROUTE_MAX_SNAP_RADIUS")?
                .unwrap_or(defaults.max_snap_radius),
            max_expansions: parse_var(&lookup, "SEAROUTE_MAX_EXPANSIONS")?,
            timeout_ms: parse_var(&lookup, "SEAROUTE_TIMEOUT_MS")?,
            cost_model: parse_var::<CostModel, _>(&lookup, "SEAROUTE_COST_MODEL")?
                .unwrap_or(defaults.cost_model),
            simplify: parse_var::<SimplifyMode, _>(&lookup, "SEAROUTE_SIMPLIFY")?
                .unwrap_or(defaults.simplify),
            ..defaults
        };

        Ok(Self {
            mask_location,
            port: parse_var(&lookup, "SERVICE_PORT")?.unwrap_or(DEFAULT_PORT),
            router,
        })
    }
}

fn parse_var<T, F>(lookup: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = lookup(name) else {
        return Ok(None);
    };
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse()
        .map(Some)
        .map_err(|e: T::Err| ConfigError::Invalid {
            name,
            value: value.clone(),
            message: e.to_string(),
        })
}
