//! Configuration
//!
//! Typed configuration loaded through figment: defaults, then an optional
//! TOML file, then `NESTSCOPE__`-prefixed environment variables.

pub mod loader;
pub mod types;

pub use loader::ConfigLoader;
pub use types::{AppConfig, LoggingConfig, OverrideConfig};
