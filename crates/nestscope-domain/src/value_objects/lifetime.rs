//! Service lifetime definitions

use serde::{Deserialize, Serialize};
use std::fmt;

/// How long a built value is reused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lifetime {
    /// New instance per resolution, never cached
    Transient,
    /// One instance per resolver scope
    Scoped,
    /// One instance per root provider
    Singleton,
}

impl Lifetime {
    /// Lifetime used for bindings that must be re-evaluated per scope
    ///
    /// A singleton is cached by the root forever, so it can never observe
    /// an override opened later; it becomes scoped instead.
    pub fn demoted(self) -> Self {
        match self {
            Self::Singleton => Self::Scoped,
            other => other,
        }
    }
}

impl fmt::Display for Lifetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Transient => "transient",
            Self::Scoped => "scoped",
            Self::Singleton => "singleton",
        };
        f.write_str(name)
    }
}
