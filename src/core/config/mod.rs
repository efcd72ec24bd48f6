//! Persistent settings stored as TOML in the platform config directory.

pub mod data;
pub mod defaults;
pub mod io;
pub mod orchestrator;

pub use data::Config;
pub use defaults::{validate_endpoint, CONFIG_KEYS, DEFAULT_ENDPOINT};
pub use io::{ConfigError, CONFIG_PATH_ENV};
