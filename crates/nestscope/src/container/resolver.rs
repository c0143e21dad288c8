//! Resolver - the built, queryable side of the container
//!
//! A [`Resolver`] is a cheap handle made of three parts:
//!
//! | Part | Owns |
//! |------|------|
//! | root core | descriptors, lookup indices, singleton cache, override registry |
//! | resolver scope | scoped instance cache, disposal flag |
//! | override layer | the override scope this resolver was opened for, if any |
//!
//! Singletons are built detached from any override layer and cached in
//! the root. Scoped services are cached in the resolver scope that built
//! them, or in the active override layer's cache while one is active.
//! Transients are never cached.

use dashmap::DashMap;
use nestscope_domain::{Contract, Error, Lifetime, RegistryId, Result, ScopeId, ServiceKey};
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, trace};

use super::{Instance, ServiceDescriptor};
use crate::overrides::{OverrideRegistry, OverrideScope};

/// Cache slot: descriptor position, the key it was built for, and the
/// resolver scope that asked for it
///
/// The key is part of the slot because one open-generic descriptor serves
/// many closed keys. The owner is part of it because a value built while an
/// override layer is active lives in that layer's cache, next to the values
/// other resolver scopes built under the same layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    slot: usize,
    key: ServiceKey,
    owner: ScopeId,
}

/// Shared state of a built registry
pub(crate) struct RootCore {
    id: RegistryId,
    descriptors: Vec<ServiceDescriptor>,
    exact: HashMap<ServiceKey, Vec<usize>>,
    open: HashMap<ServiceKey, Vec<usize>>,
    singletons: DashMap<CacheKey, Instance>,
    root_scope: Arc<ResolverScope>,
    overrides: Option<OverrideRegistry>,
}

impl RootCore {
    fn new(
        id: RegistryId,
        descriptors: Vec<ServiceDescriptor>,
        overrides: Option<OverrideRegistry>,
    ) -> Self {
        let mut exact: HashMap<ServiceKey, Vec<usize>> = HashMap::new();
        let mut open: HashMap<ServiceKey, Vec<usize>> = HashMap::new();
        for (slot, descriptor) in descriptors.iter().enumerate() {
            let key = descriptor.key();
            if key.is_open_generic() {
                open.entry(key.definition()).or_default().push(slot);
            } else {
                exact.entry(key.clone()).or_default().push(slot);
            }
        }
        Self {
            id,
            descriptors,
            exact,
            open,
            singletons: DashMap::new(),
            root_scope: Arc::new(ResolverScope::new()),
            overrides,
        }
    }

    /// Slots able to build `key`, in registration order
    fn slots(&self, key: &ServiceKey) -> &[usize] {
        if let Some(slots) = self.exact.get(key) {
            return slots;
        }
        if key.is_closed_generic() {
            if let Some(slots) = self.open.get(&key.definition()) {
                return slots;
            }
        }
        &[]
    }

    pub(crate) fn overrides(&self) -> Option<&OverrideRegistry> {
        self.overrides.as_ref()
    }
}

/// Scoped instance cache with a disposal flag
pub(crate) struct ResolverScope {
    id: ScopeId,
    instances: DashMap<CacheKey, Instance>,
    disposed: AtomicBool,
}

impl ResolverScope {
    pub(crate) fn new() -> Self {
        Self {
            id: ScopeId::next(),
            instances: DashMap::new(),
            disposed: AtomicBool::new(false),
        }
    }

    pub(crate) fn id(&self) -> ScopeId {
        self.id
    }

    pub(crate) fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    /// Release cached instances; returns false when already released
    pub(crate) fn release(&self) -> bool {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.instances.clear();
        debug!(scope = %self.id, "Resolver scope released");
        true
    }
}

/// Handle used to resolve services
#[derive(Clone)]
pub struct Resolver {
    root: Arc<RootCore>,
    scope: Arc<ResolverScope>,
    overlay: Option<Arc<OverrideScope>>,
    detached: bool,
}

impl Resolver {
    pub(crate) fn root(
        id: RegistryId,
        descriptors: Vec<ServiceDescriptor>,
        overrides: Option<OverrideRegistry>,
    ) -> Self {
        let root = Arc::new(RootCore::new(id, descriptors, overrides));
        debug!(
            registry = %id,
            descriptors = root.descriptors.len(),
            "Root resolver built"
        );
        Self {
            scope: root.root_scope.clone(),
            root,
            overlay: None,
            detached: false,
        }
    }

    pub(crate) fn from_parts(
        root: Arc<RootCore>,
        scope: Arc<ResolverScope>,
        overlay: Option<Arc<OverrideScope>>,
    ) -> Self {
        Self {
            root,
            scope,
            overlay,
            detached: false,
        }
    }

    // ========================================================================
    // Resolution
    // ========================================================================

    /// Resolve the last registration for `key`
    pub fn resolve(&self, key: &ServiceKey) -> Result<Option<Instance>> {
        self.ensure_alive()?;
        match self.root.slots(key).last() {
            Some(&slot) => self.build_slot(slot, key).map(Some),
            None => {
                trace!(key = %key, "No registration");
                Ok(None)
            }
        }
    }

    /// Resolve every registration for `key`, in registration order
    pub fn resolve_all(&self, key: &ServiceKey) -> Result<Vec<Instance>> {
        self.ensure_alive()?;
        self.root
            .slots(key)
            .iter()
            .map(|&slot| self.build_slot(slot, key))
            .collect()
    }

    /// Resolve a contract, `None` when it is not registered
    pub fn get<T: ?Sized + Contract>(&self) -> Result<Option<Arc<T>>> {
        self.resolve(&T::key())?
            .map(|instance| instance.downcast_contract::<T>())
            .transpose()
    }

    /// Resolve a contract that must be registered
    pub fn get_required<T: ?Sized + Contract>(&self) -> Result<Arc<T>> {
        self.get::<T>()?
            .ok_or_else(|| Error::not_found(T::key().to_string()))
    }

    /// Resolve every registration of a contract
    pub fn get_all<T: ?Sized + Contract>(&self) -> Result<Vec<Arc<T>>> {
        self.resolve_all(&T::key())?
            .iter()
            .map(Instance::downcast_contract::<T>)
            .collect()
    }

    fn build_slot(&self, slot: usize, key: &ServiceKey) -> Result<Instance> {
        let descriptor = &self.root.descriptors[slot];
        match descriptor.lifetime() {
            Lifetime::Transient => descriptor.create_instance(self, key),
            Lifetime::Scoped => {
                // Values built under a layer are released with it
                let layer = self.active_layer();
                let cache = layer.as_ref().map_or(&self.scope, |l| l.cache());
                let cache_key = CacheKey {
                    slot,
                    key: key.clone(),
                    owner: self.scope.id(),
                };
                if let Some(hit) = cache.instances.get(&cache_key) {
                    return Ok(hit.clone());
                }
                let built = descriptor.create_instance(self, key)?;
                // Built outside the shard lock: factories resolve recursively
                Ok(cache.instances.entry(cache_key).or_insert(built).clone())
            }
            Lifetime::Singleton => {
                let cache_key = CacheKey {
                    slot,
                    key: key.clone(),
                    owner: self.root.root_scope.id(),
                };
                if let Some(hit) = self.root.singletons.get(&cache_key) {
                    return Ok(hit.clone());
                }
                let built = descriptor.create_instance(&self.detached_root(), key)?;
                Ok(self
                    .root
                    .singletons
                    .entry(cache_key)
                    .or_insert(built)
                    .clone())
            }
        }
    }

    // ========================================================================
    // Scopes
    // ========================================================================

    /// Open a child resolver scope with its own scoped cache
    ///
    /// A child of an override scope's resolver keeps that override layer.
    pub fn create_scope(&self) -> Result<Resolver> {
        self.ensure_alive()?;
        let scope = Arc::new(ResolverScope::new());
        debug!(scope = %scope.id(), parent = %self.scope.id(), "Resolver scope created");
        Ok(Self::from_parts(
            self.root.clone(),
            scope,
            self.overlay.clone(),
        ))
    }

    /// Release this resolver scope; later resolutions fail
    ///
    /// Returns false when the scope was already released.
    pub fn dispose(&self) -> bool {
        self.scope.release()
    }

    /// Whether this resolver scope was released
    pub fn is_disposed(&self) -> bool {
        self.scope.is_disposed()
    }

    /// The root resolver of this registry
    pub fn root_resolver(&self) -> Resolver {
        Self::from_parts(self.root.clone(), self.root.root_scope.clone(), None)
    }

    /// Root resolver that ignores every override layer, used for singletons
    fn detached_root(&self) -> Resolver {
        Self {
            detached: true,
            ..self.root_resolver()
        }
    }

    /// Override scope decorated bindings consult when resolved through this
    /// resolver: its own layer first, then the chain's current scope
    pub(crate) fn active_layer(&self) -> Option<Arc<OverrideScope>> {
        if let Some(overlay) = &self.overlay {
            return Some(overlay.clone());
        }
        if self.detached {
            return None;
        }
        self.root.overrides.as_ref().and_then(OverrideRegistry::current)
    }

    pub(crate) fn ensure_alive(&self) -> Result<()> {
        if self.scope.is_disposed() {
            return Err(Error::scope_disposed(self.scope.id()));
        }
        Ok(())
    }

    // ========================================================================
    // Identity
    // ========================================================================

    /// Identifier of this resolver scope
    pub fn id(&self) -> ScopeId {
        self.scope.id()
    }

    /// Identity of the registry this resolver was built from
    pub fn root_id(&self) -> RegistryId {
        self.root.id
    }

    /// Same resolver scope and same override layer
    pub fn ptr_eq(&self, other: &Resolver) -> bool {
        let same_overlay = match (&self.overlay, &other.overlay) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        Arc::ptr_eq(&self.scope, &other.scope) && same_overlay
    }

    pub(crate) fn core(&self) -> &Arc<RootCore> {
        &self.root
    }

    pub(crate) fn overlay(&self) -> Option<&Arc<OverrideScope>> {
        self.overlay.as_ref()
    }

    pub(crate) fn overrides(&self) -> Option<&OverrideRegistry> {
        self.root.overrides()
    }
}

/// Non-owning handle to a registry's root
///
/// Held by long-lived services, such as singletons, that must not keep
/// the registry alive.
#[derive(Clone)]
pub(crate) struct WeakResolver {
    root: Weak<RootCore>,
}

impl WeakResolver {
    pub(crate) fn new(resolver: &Resolver) -> Self {
        Self {
            root: Arc::downgrade(&resolver.root),
        }
    }

    /// Root resolver detached from override layers, if the registry is alive
    pub(crate) fn upgrade(&self) -> Option<Resolver> {
        let root = self.root.upgrade()?;
        Some(Resolver {
            scope: root.root_scope.clone(),
            root,
            overlay: None,
            detached: true,
        })
    }
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("registry", &self.root.id)
            .field("scope", &self.scope.id())
            .field("overlay", &self.overlay.as_ref().map(|o| o.id()))
            .finish()
    }
}
