//! Value objects
//!
//! Immutable descriptions the container and the override engine pass
//! around: service keys, type descriptors, lifetimes and identities.

pub mod identity;
pub mod lifetime;
pub mod service_key;

pub use identity::{RegistryId, ScopeId};
pub use lifetime::Lifetime;
pub use service_key::{Contract, GenericArg, KeyKind, ServiceKey, TypeInfo};
