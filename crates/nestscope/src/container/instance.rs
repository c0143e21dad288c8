//! Type-erased service instances and construction callbacks

use nestscope_domain::{Contract, Error, Result, ServiceKey};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

use super::Resolver;

/// Builds an instance from a resolver
pub type Factory = Arc<dyn Fn(&Resolver) -> Result<Instance> + Send + Sync>;

/// Builds an instance of an implementation type for the requested key
///
/// The key matters for open-generic implementations, which receive the
/// closed key they are being activated for.
pub type Activator = Arc<dyn Fn(&Resolver, &ServiceKey) -> Result<Instance> + Send + Sync>;

/// A built service, stored as `Arc<T>` behind `dyn Any`
#[derive(Clone)]
pub struct Instance(Arc<dyn Any + Send + Sync>);

impl Instance {
    /// Wrap a shared value, which may be a trait object
    pub fn new<T: ?Sized + Send + Sync + 'static>(value: Arc<T>) -> Self {
        Self(Arc::new(value))
    }

    /// Recover the shared value when `T` is the type it was created with
    pub fn downcast<T: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.0.downcast_ref::<Arc<T>>().cloned()
    }

    /// Downcast to a contract, reporting a mismatch against its key
    pub fn downcast_contract<T: ?Sized + Contract>(&self) -> Result<Arc<T>> {
        self.downcast::<T>()
            .ok_or_else(|| Error::type_mismatch(T::key(), std::any::type_name::<T>()))
    }

    /// Same underlying allocation
    pub fn ptr_eq(&self, other: &Instance) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Instance")
            .field(&Arc::as_ptr(&self.0).cast::<()>())
            .finish()
    }
}
