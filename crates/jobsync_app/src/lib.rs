//! Jobsync application: configuration, logging setup and the two entry points.
pub mod config;
pub mod logging;
pub mod run;
pub mod setup;

pub use config::{AppConfig, ConfigError, StoreTarget, CONFIG_FILENAME};
