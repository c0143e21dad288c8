//! Service descriptors
//!
//! A descriptor binds a [`ServiceKey`] to a [`Lifetime`] and exactly one
//! construction mode. Holding the mode in an enum makes "exactly one mode"
//! a property of the type rather than a runtime check.

use nestscope_domain::{Error, Lifetime, Result, ServiceKey, TypeInfo};
use std::fmt;
use std::sync::Arc;

use super::{Activator, Factory, Instance, Resolver};

/// Concrete implementation type together with the code that builds it
#[derive(Clone)]
pub struct ImplementationType {
    info: TypeInfo,
    activator: Activator,
}

impl ImplementationType {
    /// Describe an implementation type and how to activate it
    pub fn new<F>(info: TypeInfo, activator: F) -> Self
    where
        F: Fn(&Resolver, &ServiceKey) -> Result<Instance> + Send + Sync + 'static,
    {
        Self {
            info,
            activator: Arc::new(activator),
        }
    }

    /// Build from an already shared activator
    pub fn from_activator(info: TypeInfo, activator: Activator) -> Self {
        Self { info, activator }
    }

    /// Type descriptor of the implementation
    pub fn info(&self) -> &TypeInfo {
        &self.info
    }

    /// Activate for the requested key
    pub fn activate(&self, resolver: &Resolver, requested: &ServiceKey) -> Result<Instance> {
        (self.activator)(resolver, requested)
    }
}

impl fmt::Debug for ImplementationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImplementationType")
            .field("type", &self.info.key().to_string())
            .finish_non_exhaustive()
    }
}

/// Construction mode of a descriptor
#[derive(Clone)]
pub enum ServiceImpl {
    /// Pre-built value, always a singleton
    Instance(Instance),
    /// Factory function
    Factory(Factory),
    /// Implementation type activated on demand
    Type(ImplementationType),
}

impl ServiceImpl {
    fn mode_name(&self) -> &'static str {
        match self {
            Self::Instance(_) => "instance",
            Self::Factory(_) => "factory",
            Self::Type(_) => "type",
        }
    }
}

/// A binding from a key to a construction recipe
#[derive(Clone)]
pub struct ServiceDescriptor {
    key: ServiceKey,
    lifetime: Lifetime,
    implementation: ServiceImpl,
}

impl ServiceDescriptor {
    /// Bind a fixed instance; instances are always singletons
    pub fn instance(key: ServiceKey, instance: Instance) -> Result<Self> {
        reject_open_key(&key, "an instance")?;
        Ok(Self::from_parts(
            key,
            Lifetime::Singleton,
            ServiceImpl::Instance(instance),
        ))
    }

    /// Bind a factory function
    pub fn factory(key: ServiceKey, lifetime: Lifetime, factory: Factory) -> Result<Self> {
        reject_open_key(&key, "a factory")?;
        Ok(Self::from_parts(key, lifetime, ServiceImpl::Factory(factory)))
    }

    /// Bind an implementation type
    ///
    /// The implementation must satisfy the contract, and an open-generic
    /// contract needs an open-generic implementation.
    pub fn implementation(
        key: ServiceKey,
        lifetime: Lifetime,
        implementation: ImplementationType,
    ) -> Result<Self> {
        if !implementation.info().satisfies(&key) {
            return Err(Error::invalid_argument(format!(
                "{} does not implement {}",
                implementation.info().key(),
                key
            )));
        }
        if key.is_open_generic() && !implementation.info().key().is_open_generic() {
            return Err(Error::invalid_argument(format!(
                "open-generic {} requires an open-generic implementation, got {}",
                key,
                implementation.info().key()
            )));
        }
        Ok(Self::from_parts(
            key,
            lifetime,
            ServiceImpl::Type(implementation),
        ))
    }

    /// Unchecked constructor for descriptors built from typed helpers
    pub(crate) fn from_parts(key: ServiceKey, lifetime: Lifetime, implementation: ServiceImpl) -> Self {
        Self {
            key,
            lifetime,
            implementation,
        }
    }

    /// Contract key
    pub fn key(&self) -> &ServiceKey {
        &self.key
    }

    /// Caching policy
    pub fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    /// Construction mode
    pub fn service_impl(&self) -> &ServiceImpl {
        &self.implementation
    }

    /// Copy with another lifetime; instances keep their singleton lifetime
    pub fn with_lifetime(&self, lifetime: Lifetime) -> Self {
        let lifetime = match self.implementation {
            ServiceImpl::Instance(_) => Lifetime::Singleton,
            _ => lifetime,
        };
        Self::from_parts(self.key.clone(), lifetime, self.implementation.clone())
    }

    /// True for fixed-instance bindings
    pub fn is_instance(&self) -> bool {
        matches!(self.implementation, ServiceImpl::Instance(_))
    }

    /// True for factory bindings
    pub fn is_factory(&self) -> bool {
        matches!(self.implementation, ServiceImpl::Factory(_))
    }

    /// Build a value from this descriptor, ignoring its lifetime
    pub fn create_instance(&self, resolver: &Resolver, requested: &ServiceKey) -> Result<Instance> {
        match &self.implementation {
            ServiceImpl::Instance(instance) => Ok(instance.clone()),
            ServiceImpl::Factory(factory) => factory(resolver),
            ServiceImpl::Type(implementation) => implementation.activate(resolver, requested),
        }
    }
}

impl fmt::Debug for ServiceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceDescriptor")
            .field("key", &self.key.to_string())
            .field("lifetime", &self.lifetime)
            .field("mode", &self.implementation.mode_name())
            .finish()
    }
}

fn reject_open_key(key: &ServiceKey, mode: &str) -> Result<()> {
    if key.is_open_generic() {
        return Err(Error::invalid_argument(format!(
            "open-generic {key} cannot be bound to {mode}"
        )));
    }
    Ok(())
}
