//! Override scope configuration types

use crate::constants::DEFAULT_MAX_SCOPE_DEPTH;
use serde::{Deserialize, Serialize};

/// Behaviour of nested override scopes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverrideConfig {
    /// Reject disposing a scope that is not the current one for its chain
    pub strict_disposal_order: bool,

    /// Maximum nesting depth of override scopes
    pub max_depth: usize,
}

impl Default for OverrideConfig {
    fn default() -> Self {
        Self {
            strict_disposal_order: true,
            max_depth: DEFAULT_MAX_SCOPE_DEPTH,
        }
    }
}
