//! Scope lifecycle API

use nestscope_domain::{Error, Result, ServiceKey};
use std::sync::Arc;

use super::{OverrideRegistry, OverrideScope, ScopeHandle, decorate};
use crate::container::{Resolver, ServiceCollection};

/// Open an override scope on top of `resolver`
///
/// `configure` registers the overriding bindings; registering nothing is
/// valid and yields a layer that forwards to its parent. When `resolver`
/// belongs to an override scope, that scope becomes the new one's parent.
/// The new scope is current for the calling chain until disposed.
pub fn open_scope<F>(resolver: &Resolver, configure: F) -> Result<ScopeHandle>
where
    F: FnOnce(&mut ServiceCollection),
{
    resolver.ensure_alive()?;
    let registry = resolver.overrides().cloned().ok_or_else(|| {
        Error::invalid_argument(format!(
            "registry {} was not decorated for overrides",
            resolver.root_id()
        ))
    })?;

    let parent = resolver.overlay().cloned();
    let depth = parent.as_ref().map_or(1, |p| p.depth() + 1);
    let max_depth = registry.config().max_depth;
    if depth > max_depth {
        return Err(Error::invalid_argument(format!(
            "override scopes nested deeper than {max_depth}"
        )));
    }

    let mut overrides = ServiceCollection::new();
    configure(&mut overrides);

    let scope = Arc::new(OverrideScope::new(
        overrides.take_descriptors(),
        parent,
        registry.current(),
        resolver.core().clone(),
    ));
    registry.push(scope.clone());
    Ok(ScopeHandle::new(scope, registry))
}

/// Resolver of the innermost scope active for `resolver`'s registry in the
/// calling chain, or `resolver` itself when none is
pub fn current_resolver(resolver: &Resolver) -> Resolver {
    resolver
        .overrides()
        .and_then(OverrideRegistry::current)
        .map_or_else(|| resolver.clone(), |scope| scope.resolver())
}

/// Method syntax for the lifecycle API
pub trait ResolverOverridesExt {
    /// See [`open_scope`]
    fn open_scope<F>(&self, configure: F) -> Result<ScopeHandle>
    where
        F: FnOnce(&mut ServiceCollection);

    /// See [`current_resolver`]
    fn current_resolver(&self) -> Resolver;
}

impl ResolverOverridesExt for Resolver {
    fn open_scope<F>(&self, configure: F) -> Result<ScopeHandle>
    where
        F: FnOnce(&mut ServiceCollection),
    {
        open_scope(self, configure)
    }

    fn current_resolver(&self) -> Resolver {
        current_resolver(self)
    }
}

/// Method syntax for decoration
pub trait ServiceCollectionOverridesExt {
    /// See [`decorate`]
    fn decorate_for_overrides<P>(&mut self, predicate: P) -> Result<OverrideRegistry>
    where
        P: Fn(&ServiceKey) -> bool;
}

impl ServiceCollectionOverridesExt for ServiceCollection {
    fn decorate_for_overrides<P>(&mut self, predicate: P) -> Result<OverrideRegistry>
    where
        P: Fn(&ServiceKey) -> bool,
    {
        decorate(self, predicate)
    }
}
