//! Main application configuration

use serde::{Deserialize, Serialize};

use super::{LoggingConfig, OverrideConfig};

/// Root configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Override scope behaviour
    #[serde(default)]
    pub overrides: OverrideConfig,
}
