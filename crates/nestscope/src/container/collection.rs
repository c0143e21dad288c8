//! Service collection - the mutable registry

use nestscope_domain::{Contract, Lifetime, RegistryId, Result, ServiceKey, TypeInfo};
use std::sync::Arc;

use super::{ImplementationType, Instance, Resolver, ServiceDescriptor, ServiceImpl};
use crate::options::OptionsTable;
use crate::overrides::OverrideRegistry;

/// Ordered set of service descriptors, mutable until built
///
/// # Example
///
/// ```
/// use nestscope::{ServiceCollection, contract};
/// use std::sync::Arc;
///
/// trait Greeter: Send + Sync {
///     fn greet(&self) -> String;
/// }
/// contract!(interface dyn Greeter);
///
/// struct Hello;
/// impl Greeter for Hello {
///     fn greet(&self) -> String {
///         "hello".to_string()
///     }
/// }
///
/// let mut services = ServiceCollection::new();
/// services.add_scoped::<dyn Greeter, _>(|_| Ok(Arc::new(Hello) as Arc<dyn Greeter>));
///
/// let root = services.build();
/// let greeter = root.get_required::<dyn Greeter>().unwrap();
/// assert_eq!(greeter.greet(), "hello");
/// ```
pub struct ServiceCollection {
    descriptors: Vec<ServiceDescriptor>,
    id: RegistryId,
    options: Arc<OptionsTable>,
    overrides: Option<OverrideRegistry>,
}

impl Default for ServiceCollection {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceCollection {
    /// Create an empty collection with a fresh registry identity
    pub fn new() -> Self {
        Self {
            descriptors: Vec::new(),
            id: RegistryId::new(),
            options: Arc::new(OptionsTable::default()),
            overrides: None,
        }
    }

    // ========================================================================
    // Descriptor access
    // ========================================================================

    /// Append a descriptor; a later registration for the same key wins
    pub fn add(&mut self, descriptor: ServiceDescriptor) -> &mut Self {
        self.descriptors.push(descriptor);
        self
    }

    /// Append a descriptor only when its key is not registered yet
    pub fn try_add(&mut self, descriptor: ServiceDescriptor) -> bool {
        if self.contains(descriptor.key()) {
            return false;
        }
        self.descriptors.push(descriptor);
        true
    }

    /// Remove every descriptor registered for `key`
    pub fn remove_all(&mut self, key: &ServiceKey) -> usize {
        let before = self.descriptors.len();
        self.descriptors.retain(|d| d.key() != key);
        before - self.descriptors.len()
    }

    /// Remove every descriptor
    pub fn clear(&mut self) {
        self.descriptors.clear();
    }

    /// Whether any descriptor is registered for exactly `key`
    pub fn contains(&self, key: &ServiceKey) -> bool {
        self.descriptors.iter().any(|d| d.key() == key)
    }

    /// Descriptors in registration order
    pub fn iter(&self) -> std::slice::Iter<'_, ServiceDescriptor> {
        self.descriptors.iter()
    }

    /// Number of descriptors
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// True when nothing is registered
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Identity shared with the resolver built from this collection
    pub fn id(&self) -> RegistryId {
        self.id
    }

    /// Whether override decoration has been applied
    pub fn is_decorated(&self) -> bool {
        self.overrides.is_some()
    }

    pub(crate) fn options_table(&self) -> &Arc<OptionsTable> {
        &self.options
    }

    pub(crate) fn take_descriptors(&mut self) -> Vec<ServiceDescriptor> {
        std::mem::take(&mut self.descriptors)
    }

    pub(crate) fn mark_decorated(&mut self, registry: OverrideRegistry) {
        self.overrides = Some(registry);
    }

    /// Build the root resolver
    pub fn build(self) -> Resolver {
        Resolver::root(self.id, self.descriptors, self.overrides)
    }

    // ========================================================================
    // Typed registration helpers
    // ========================================================================

    /// Register a fixed instance
    pub fn add_instance<T: ?Sized + Contract>(&mut self, value: Arc<T>) -> &mut Self {
        self.add(ServiceDescriptor::from_parts(
            T::key(),
            Lifetime::Singleton,
            ServiceImpl::Instance(Instance::new(value)),
        ))
    }

    /// Register a factory with the given lifetime
    pub fn add_factory<T, F>(&mut self, lifetime: Lifetime, factory: F) -> &mut Self
    where
        T: ?Sized + Contract,
        F: Fn(&Resolver) -> Result<Arc<T>> + Send + Sync + 'static,
    {
        self.add(ServiceDescriptor::from_parts(
            T::key(),
            lifetime,
            ServiceImpl::Factory(Arc::new(move |resolver: &Resolver| {
                factory(resolver).map(Instance::new)
            })),
        ))
    }

    /// Register a factory built once per root
    pub fn add_singleton<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: ?Sized + Contract,
        F: Fn(&Resolver) -> Result<Arc<T>> + Send + Sync + 'static,
    {
        self.add_factory::<T, F>(Lifetime::Singleton, factory)
    }

    /// Register a factory built once per resolver scope
    pub fn add_scoped<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: ?Sized + Contract,
        F: Fn(&Resolver) -> Result<Arc<T>> + Send + Sync + 'static,
    {
        self.add_factory::<T, F>(Lifetime::Scoped, factory)
    }

    /// Register a factory called on every resolution
    pub fn add_transient<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: ?Sized + Contract,
        F: Fn(&Resolver) -> Result<Arc<T>> + Send + Sync + 'static,
    {
        self.add_factory::<T, F>(Lifetime::Transient, factory)
    }

    /// Register implementation type `I` for contract `T`
    ///
    /// `constructor` receives the resolver so it can pull dependencies.
    pub fn add_type<T, I, F>(&mut self, lifetime: Lifetime, constructor: F) -> &mut Self
    where
        T: ?Sized + Contract,
        I: Contract,
        F: Fn(&Resolver) -> Result<Arc<T>> + Send + Sync + 'static,
    {
        let info = TypeInfo::of::<I>().implementing(T::key());
        let implementation = ImplementationType::new(info, move |resolver, _| {
            constructor(resolver).map(Instance::new)
        });
        self.add(ServiceDescriptor::from_parts(
            T::key(),
            lifetime,
            ServiceImpl::Type(implementation),
        ))
    }
}

impl<'a> IntoIterator for &'a ServiceCollection {
    type Item = &'a ServiceDescriptor;
    type IntoIter = std::slice::Iter<'a, ServiceDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.descriptors.iter()
    }
}

impl std::fmt::Debug for ServiceCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceCollection")
            .field("id", &self.id)
            .field("descriptors", &self.descriptors)
            .field("decorated", &self.is_decorated())
            .finish()
    }
}
