//! Loading [`RenderConfig`] from TOML files and the environment.
//!
//! Precedence is defaults, then the file named by `EMBER_CONFIG`, then
//! `EMBER_UPDATE_STRATEGY`.

use std::fs;
use std::path::{Path, PathBuf};

use ember_core::{RenderConfig, UpdateStrategy};
use thiserror::Error;

/// Path of a TOML config file.
pub const CONFIG_ENV: &str = "EMBER_CONFIG";
/// `patch` or `repaint`; overrides the file.
pub const UPDATE_STRATEGY_ENV: &str = "EMBER_UPDATE_STRATEGY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid value for {name}: {message}")]
    Env { name: &'static str, message: String },
}

/// Parses a TOML document. Missing keys keep their defaults.
pub fn parse_config(source: &str) -> Result<RenderConfig, toml::de::Error> {
    toml::from_str(source)
}

pub fn load_config(path: impl AsRef<Path>) -> Result<RenderConfig, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_owned(),
        source,
    })?;
    let config = parse_config(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_owned(),
        source,
    })?;
    log::info!("loaded render config from {}", path.display());
    log::debug!("render config: {config:?}");
    Ok(config)
}

/// Builds the config from the process environment.
pub fn load_config_from_env() -> Result<RenderConfig, ConfigError> {
    config_from_vars(|name| std::env::var(name).ok())
}

pub(crate) fn config_from_vars(
    var: impl Fn(&str) -> Option<String>,
) -> Result<RenderConfig, ConfigError> {
    let mut config = match var(CONFIG_ENV).filter(|path| !path.trim().is_empty()) {
        Some(path) => load_config(path)?,
        None => {
            log::debug!("{CONFIG_ENV} not set, using default render config");
            RenderConfig::default()
        }
    };
    if let Some(value) = var(UPDATE_STRATEGY_ENV) {
        let strategy: UpdateStrategy = value.parse().map_err(|message| ConfigError::Env {
            name: UPDATE_STRATEGY_ENV,
            message,
        })?;
        config = config.with_update_strategy(strategy);
    }
    Ok(config)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
