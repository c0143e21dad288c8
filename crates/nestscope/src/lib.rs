//! # nestscope
//!
//! Scoped override resolution for a dependency injection container.
//!
//! A registry is decorated once, before it is built. Afterwards any caller
//! can open a nested override scope against a resolver: bindings registered
//! in the scope take precedence over the shared registry for the lifetime
//! of the scope, and only for the async call chain that opened it.
//!
//! ```text
//! ServiceCollection ──decorate()──▶ ServiceCollection' ──build()──▶ Resolver (root)
//!                                                                     │
//!                             open_scope(&root, |o| o.add_instance(..)) │
//!                                                                     ▼
//!                  chain-local index[root] = OverrideScope ──▶ ScopeHandle::resolver()
//! ```
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`container`] | Registry, descriptors and resolver the overrides augment |
//! | [`options`] | Configuration binder: configure / value / snapshot / monitor |
//! | [`overrides`] | Override scopes, chain context, decoration, lifecycle API |
//! | [`testing`] | In-process test host built on the above |

pub mod container;
pub mod options;
pub mod overrides;
pub mod testing;

pub use container::{
    Activator, Factory, ImplementationType, Instance, Resolver, ServiceCollection,
    ServiceDescriptor, ServiceImpl,
};
pub use nestscope_domain::{
    Contract, Error, GenericArg, KeyKind, Lifetime, RegistryId, Result, ScopeId, ServiceKey,
    TypeInfo, contract,
};
pub use options::{
    ConfigureOptions, Options, OptionsMonitor, OptionsSnapshot, PostConfigureOptions,
};
pub use overrides::{
    OverrideRegistry, OverrideScope, ResolverOverridesExt, ScopeHandle,
    ServiceCollectionOverridesExt, current_resolver, decorate, decorate_with_config, open_scope,
};
