//! Standard runtime services backed by Rust's `std` library.
//!
//! This crate provides the host side that `ember-core` leaves abstract: a
//! frame-requesting [`StdScheduler`], configuration loaded from TOML and the
//! environment, and logger setup for binaries.

mod config;
mod logging;
mod scheduler;

pub use config::{
    load_config, load_config_from_env, parse_config, ConfigError, CONFIG_ENV, UPDATE_STRATEGY_ENV,
};
pub use logging::{init_logging, init_test_logging};
pub use scheduler::{StdRuntime, StdScheduler};
