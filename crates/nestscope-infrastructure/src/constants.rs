//! Infrastructure layer constants
//!
//! Contract names used by the container live in `nestscope_domain::constants`.

// ============================================================================
// CONFIGURATION CONSTANTS
// ============================================================================

/// Default configuration file name
pub const DEFAULT_CONFIG_FILENAME: &str = "nestscope.toml";

/// Default configuration directory name
pub const DEFAULT_CONFIG_DIR: &str = "nestscope";

/// Environment variable prefix for configuration (`NESTSCOPE__SECTION__KEY`)
pub const CONFIG_ENV_PREFIX: &str = "NESTSCOPE";

/// Separator between nested keys in environment variable names
pub const CONFIG_ENV_SEPARATOR: &str = "__";

// ============================================================================
// LOGGING CONSTANTS
// ============================================================================

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Environment variable holding an `EnvFilter` directive
pub const LOG_FILTER_ENV: &str = "NESTSCOPE_LOG";

/// Fallback file name stem for the rolling log appender
pub const LOG_FILE_STEM: &str = "nestscope";

// ============================================================================
// OVERRIDE SCOPE CONSTANTS
// ============================================================================

/// Maximum nesting depth of override scopes
pub const DEFAULT_MAX_SCOPE_DEPTH: usize = 64;
