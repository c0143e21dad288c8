//! Override scopes and their handles

use nestscope_domain::{Result, ScopeId, ServiceKey};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::warn;

use super::OverrideRegistry;
use crate::container::{Resolver, ResolverScope, RootCore, ServiceDescriptor};

/// Immutable layer of override bindings
///
/// `parent` is the layer of the resolver the scope was opened from and is
/// what [`nearest_definition`](Self::nearest_definition) walks. `previous`
/// is whatever was current for the chain when the scope was pushed and is
/// what disposal restores. Both are the same scope whenever a scope is
/// opened from the current scope's resolver.
pub struct OverrideScope {
    id: ScopeId,
    bindings: Vec<ServiceDescriptor>,
    parent: Option<Arc<OverrideScope>>,
    previous: Option<Arc<OverrideScope>>,
    depth: usize,
    root: Arc<RootCore>,
    cache: Arc<ResolverScope>,
}

impl OverrideScope {
    pub(crate) fn new(
        bindings: Vec<ServiceDescriptor>,
        parent: Option<Arc<OverrideScope>>,
        previous: Option<Arc<OverrideScope>>,
        root: Arc<RootCore>,
    ) -> Self {
        let depth = parent.as_ref().map_or(1, |p| p.depth + 1);
        let cache = Arc::new(ResolverScope::new());
        Self {
            id: cache.id(),
            bindings,
            parent,
            previous,
            depth,
            root,
            cache,
        }
    }

    /// Identifier, shared with the scope's resolver
    pub fn id(&self) -> ScopeId {
        self.id
    }

    /// Number of layers from the root, this one included
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Bindings registered directly in this layer
    pub fn bindings(&self) -> &[ServiceDescriptor] {
        &self.bindings
    }

    /// Layer this one was opened on top of
    pub fn parent(&self) -> Option<&Arc<OverrideScope>> {
        self.parent.as_ref()
    }

    pub(crate) fn previous(&self) -> Option<&Arc<OverrideScope>> {
        self.previous.as_ref()
    }

    /// Closest binding for `key`, walking from this layer towards the root
    ///
    /// Within one layer the last registration wins.
    pub fn nearest_definition(&self, key: &ServiceKey) -> Option<&ServiceDescriptor> {
        let mut layer = Some(self);
        while let Some(scope) = layer {
            if let Some(found) = scope.bindings.iter().rev().find(|d| d.key() == key) {
                return Some(found);
            }
            layer = scope.parent.as_deref();
        }
        None
    }

    /// Resolver reflecting this layer
    pub fn resolver(self: &Arc<Self>) -> Resolver {
        Resolver::from_parts(self.root.clone(), self.cache.clone(), Some(self.clone()))
    }

    /// Whether the scope's resolver has been released
    pub fn is_released(&self) -> bool {
        self.cache.is_disposed()
    }

    pub(crate) fn cache(&self) -> &Arc<ResolverScope> {
        &self.cache
    }

    pub(crate) fn release(&self) -> bool {
        self.cache.release()
    }
}

impl std::fmt::Debug for OverrideScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverrideScope")
            .field("id", &self.id)
            .field("depth", &self.depth)
            .field("bindings", &self.bindings.len())
            .field("parent", &self.parent.as_ref().map(|p| p.id))
            .finish()
    }
}

/// Owner of an open override scope
///
/// Disposing pops the scope from the chain and releases its resolver.
/// Dropping an undisposed handle disposes it; if it is not the current
/// scope, it is released in place and later disposals step over it.
pub struct ScopeHandle {
    scope: Arc<OverrideScope>,
    registry: OverrideRegistry,
    disposed: AtomicBool,
}

impl ScopeHandle {
    pub(crate) fn new(scope: Arc<OverrideScope>, registry: OverrideRegistry) -> Self {
        Self {
            scope,
            registry,
            disposed: AtomicBool::new(false),
        }
    }

    /// Resolver reflecting this scope and its parents
    pub fn resolver(&self) -> Resolver {
        self.scope.resolver()
    }

    /// The scope itself
    pub fn scope(&self) -> &Arc<OverrideScope> {
        &self.scope
    }

    /// Scope identifier
    pub fn id(&self) -> ScopeId {
        self.scope.id()
    }

    /// Nesting depth, 1 for a scope opened on a plain resolver
    pub fn depth(&self) -> usize {
        self.scope.depth()
    }

    /// Whether [`dispose`](Self::dispose) has completed
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    /// Pop the scope and release its resolver
    ///
    /// A second call is a no-op. An out-of-order call fails with
    /// `ScopeOrder` and leaves the handle open, so it can be disposed again
    /// once the scopes opened after it are gone.
    pub fn dispose(&self) -> Result<()> {
        if self.is_disposed() {
            return Ok(());
        }
        self.registry.restore(&self.scope)?;
        if !self.disposed.swap(true, Ordering::AcqRel) {
            self.scope.release();
        }
        Ok(())
    }
}

impl Drop for ScopeHandle {
    fn drop(&mut self) {
        if let Err(e) = self.dispose() {
            // Left in the index; restore skips it once released
            warn!(scope = %self.scope.id(), error = %e, "Override scope dropped out of order");
            self.disposed.store(true, Ordering::Release);
            self.scope.release();
        }
    }
}

impl std::fmt::Debug for ScopeHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopeHandle")
            .field("scope", &self.scope)
            .field("disposed", &self.is_disposed())
            .finish()
    }
}
