//! Registry decoration
//!
//! Rewrites a collection once, right before it is built, so that selected
//! bindings consult the active override scope at resolution time:
//!
//! | Binding | Predicate | Result |
//! |---------|-----------|--------|
//! | any | no | unchanged |
//! | class or open-generic key | yes | unchanged apart from the lifetime |
//! | interface or closed-generic key | yes | redirecting factory |
//!
//! Selected singletons become scoped, since a root-cached value could never
//! observe a scope opened after it was built.

use nestscope_domain::constants::{CONFIGURE_OPTIONS, OPTIONS_ARITY};
use nestscope_domain::{Error, Result, ServiceKey};
use nestscope_infrastructure::OverrideConfig;
use std::sync::Arc;
use tracing::{debug, info, trace};

use super::OverrideRegistry;
use crate::container::{
    Factory, ImplementationType, Instance, Resolver, ServiceCollection, ServiceDescriptor,
    ServiceImpl,
};
use crate::options::ReadSide;

/// Decorate `services` with the default [`OverrideConfig`]
///
/// Must be the last change made to the collection before it is built.
pub fn decorate<P>(services: &mut ServiceCollection, predicate: P) -> Result<OverrideRegistry>
where
    P: Fn(&ServiceKey) -> bool,
{
    decorate_with_config(services, predicate, OverrideConfig::default())
}

/// Decorate `services`, selecting bindings with `predicate`
///
/// Fails when the collection was already decorated.
pub fn decorate_with_config<P>(
    services: &mut ServiceCollection,
    predicate: P,
    config: OverrideConfig,
) -> Result<OverrideRegistry>
where
    P: Fn(&ServiceKey) -> bool,
{
    if services.is_decorated() {
        return Err(Error::invalid_argument(format!(
            "registry {} is already decorated",
            services.id()
        )));
    }

    register_options_read_side(services);

    let registry = OverrideRegistry::new(services.id(), config);
    let mut redirected = 0_usize;
    let mut carried = 0_usize;
    for descriptor in services.take_descriptors() {
        let rewritten = if !predicate(descriptor.key()) {
            descriptor
        } else if descriptor.key().is_class() || descriptor.key().is_open_generic() {
            carried += 1;
            descriptor.with_lifetime(descriptor.lifetime().demoted())
        } else {
            redirected += 1;
            redirecting(descriptor)
        };
        services.add(rewritten);
    }
    services.mark_decorated(registry.clone());

    info!(
        registry = %registry.id(),
        redirected,
        carried,
        total = services.len(),
        "Registry decorated for scoped overrides"
    );
    Ok(registry)
}

/// Replace `original` with a factory that prefers the nearest override
fn redirecting(original: ServiceDescriptor) -> ServiceDescriptor {
    let key = original.key().clone();
    let lifetime = original.lifetime().demoted();
    let requested = key.clone();
    let factory: Factory = Arc::new(move |resolver: &Resolver| -> Result<Instance> {
        let layer = resolver.active_layer();
        match layer.as_ref().and_then(|l| l.nearest_definition(&requested)) {
            Some(definition) => {
                trace!(key = %requested, "Resolved from override scope");
                definition.create_instance(resolver, &requested)
            }
            None => original.create_instance(resolver, &requested),
        }
    });
    ServiceDescriptor::from_parts(key, lifetime, ServiceImpl::Factory(factory))
}

/// Register closed read-side contracts for every configured options type
///
/// Without them an override of `Options<T>` would have no binding of its
/// own to redirect, since `T` is otherwise served by the open generic.
fn register_options_read_side(services: &mut ServiceCollection) {
    let configure = ServiceKey::open_interface(CONFIGURE_OPTIONS, OPTIONS_ARITY);
    let configured: Vec<ServiceKey> = services
        .iter()
        .filter(|d| d.key().is_closed_type_of(&configure))
        .filter_map(|d| d.key().type_arg(0).cloned())
        .collect();

    let table = services.options_table().clone();
    for options in configured {
        for side in ReadSide::ALL {
            let closed = side.closed_key(&options);
            if services.contains(&closed) {
                continue;
            }
            let Some(activator) = table.activator(side, &options) else {
                debug!(options = %options, "Configured outside the options binder, skipped");
                break;
            };
            let implementation =
                ImplementationType::from_activator(side.implementation_info(Some(&options)), activator);
            services.add(ServiceDescriptor::from_parts(
                closed,
                side.lifetime(),
                ServiceImpl::Type(implementation),
            ));
        }
    }
}
