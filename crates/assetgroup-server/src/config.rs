//! Server configuration.

use assetgroup_store::GroupingConfig;
use thiserror::Error;

pub const ENV_LOG: &str = "ASSETGROUP_LOG";
pub const ENV_REGROUP_ON_UPDATE: &str = "ASSETGROUP_REGROUP_ON_UPDATE";
pub const ENV_WARN_MULTIPLE_MATCHES: &str = "ASSETGROUP_WARN_MULTIPLE_MATCHES";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} must be a boolean, got {value:?}")]
    InvalidBool { var: &'static str, value: String },
}

/// Configuration for the server process.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `tracing` filter directives (default: `assetgroup=info`).
    pub log_filter: String,
    /// Regrouping policy handed to the store.
    pub grouping: GroupingConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            log_filter: "assetgroup=info".into(),
            grouping: GroupingConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from `ASSETGROUP_*` environment variables,
    /// falling back to defaults for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(filter) = lookup(ENV_LOG) {
            config.log_filter = filter;
        }
        if let Some(value) = lookup(ENV_REGROUP_ON_UPDATE) {
            config.grouping.regroup_on_asset_update = parse_bool(ENV_REGROUP_ON_UPDATE, value)?;
        }
        if let Some(value) = lookup(ENV_WARN_MULTIPLE_MATCHES) {
            config.grouping.warn_on_multiple_matches =
                parse_bool(ENV_WARN_MULTIPLE_MATCHES, value)?;
        }

        Ok(config)
    }
}

fn parse_bool(var: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBool { var, value }),
    }
}
