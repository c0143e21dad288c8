//! Domain constants
//!
//! Names of the contracts the container knows about by itself. Keys are
//! compared by name, so these must stay stable across crates.

// ============================================================================
// OPTIONS CONTRACTS
// ============================================================================

/// Write side: configures an options value
pub const CONFIGURE_OPTIONS: &str = "nestscope::options::ConfigureOptions";

/// Write side: runs after every `ConfigureOptions` for the same value
pub const POST_CONFIGURE_OPTIONS: &str = "nestscope::options::PostConfigureOptions";

/// Read side: plain value holder
pub const OPTIONS: &str = "nestscope::options::Options";

/// Read side: value computed once per resolver scope
pub const OPTIONS_SNAPSHOT: &str = "nestscope::options::OptionsSnapshot";

/// Read side: current value plus change notifications
pub const OPTIONS_MONITOR: &str = "nestscope::options::OptionsMonitor";

/// Implementation backing `Options` and `OptionsSnapshot`
pub const OPTIONS_MANAGER: &str = "nestscope::options::OptionsManager";

/// Implementation backing `OptionsMonitor`
pub const OPTIONS_MONITOR_IMPL: &str = "nestscope::options::OptionsMonitorImpl";

/// Arity of every options contract
pub const OPTIONS_ARITY: usize = 1;
