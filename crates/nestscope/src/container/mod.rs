//! Base container
//!
//! The registry/resolver pair the override engine augments:
//!
//! ```text
//! ServiceCollection (mutable, ordered descriptors)
//!        │ build()
//!        ▼
//! Resolver (root) ──create_scope()──▶ Resolver (scope)
//!    │ singletons                        │ scoped instances
//!    └──── RootCore ◀────────────────────┘
//! ```
//!
//! Last registration for a key wins. A closed generic key with no exact
//! registration falls back to the last open-generic registration sharing
//! its definition.

pub mod collection;
pub mod descriptor;
pub mod instance;
pub mod resolver;

pub use collection::ServiceCollection;
pub use descriptor::{ImplementationType, ServiceDescriptor, ServiceImpl};
pub use instance::{Activator, Factory, Instance};
pub use resolver::Resolver;
pub(crate) use resolver::{ResolverScope, RootCore, WeakResolver};
