//! Override registry - the explicit handle to a registry's chain index

use nestscope_domain::{Error, RegistryId, Result};
use nestscope_infrastructure::OverrideConfig;
use std::sync::Arc;
use tracing::debug;

use super::{OverrideScope, context};

struct RegistryInner {
    id: RegistryId,
    config: OverrideConfig,
}

/// Handle created by decoration and owned by the registry's root
///
/// Every push, restore and lookup of the active override scope for one
/// registry goes through here.
#[derive(Clone)]
pub struct OverrideRegistry {
    inner: Arc<RegistryInner>,
}

impl OverrideRegistry {
    pub(crate) fn new(id: RegistryId, config: OverrideConfig) -> Self {
        Self {
            inner: Arc::new(RegistryInner { id, config }),
        }
    }

    /// Identity of the decorated registry
    pub fn id(&self) -> RegistryId {
        self.inner.id
    }

    /// Settings applied to scopes of this registry
    pub fn config(&self) -> &OverrideConfig {
        &self.inner.config
    }

    /// Scope active for this registry in the calling chain
    pub fn current(&self) -> Option<Arc<OverrideScope>> {
        context::current(self.inner.id)
    }

    pub(crate) fn push(&self, scope: Arc<OverrideScope>) {
        let id = scope.id();
        let depth = scope.depth();
        context::set(self.inner.id, Some(scope));
        debug!(registry = %self.inner.id, scope = %id, depth, "Override scope pushed");
    }

    /// Make the scope that was current before `scope` current again
    ///
    /// Released scopes on the way back are skipped. With strict ordering, `scope` must be the chain's current scope;
    /// otherwise the index is left untouched and `ScopeOrder` is returned.
    pub(crate) fn restore(&self, scope: &OverrideScope) -> Result<()> {
        if self.inner.config.strict_disposal_order {
            let current = self.current();
            if !current.as_ref().is_some_and(|c| c.id() == scope.id()) {
                return Err(Error::scope_order(scope.id(), current.map(|c| c.id())));
            }
        }
        // Scopes dropped out of order were released without being popped
        let mut restored = scope.previous();
        while let Some(released) = restored.filter(|s| s.is_released()) {
            restored = released.previous();
        }
        let restored = restored.cloned();
        let restored_id = restored.as_ref().map(|s| s.id());
        context::set(self.inner.id, restored);
        debug!(
            registry = %self.inner.id,
            scope = %scope.id(),
            restored = ?restored_id,
            "Override scope popped"
        );
        Ok(())
    }
}

impl std::fmt::Debug for OverrideRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverrideRegistry")
            .field("id", &self.inner.id)
            .field("config", &self.inner.config)
            .finish()
    }
}
