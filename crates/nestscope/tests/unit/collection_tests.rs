//! Service collection tests

use nestscope::{Contract, Instance, Lifetime, ServiceCollection, ServiceDescriptor, contract};
use std::sync::Arc;

trait Clock: Send + Sync {
    fn now(&self) -> u64;
}
contract!(interface dyn Clock);

struct Frozen(u64);

impl Clock for Frozen {
    fn now(&self) -> u64 {
        self.0
    }
}

fn frozen(at: u64) -> Arc<dyn Clock> {
    Arc::new(Frozen(at))
}

#[test]
fn test_try_add_keeps_first_registration() {
    let mut services = ServiceCollection::new();
    services.add_instance::<dyn Clock>(frozen(1));

    let second = ServiceDescriptor::instance(<dyn Clock>::key(), Instance::new(frozen(2))).unwrap();
    assert!(!services.try_add(second));
    assert_eq!(services.len(), 1);

    let clock = services.build().get_required::<dyn Clock>().unwrap();
    assert_eq!(clock.now(), 1);
}

#[test]
fn test_remove_all_and_clear() {
    let mut services = ServiceCollection::new();
    services
        .add_instance::<dyn Clock>(frozen(1))
        .add_transient::<dyn Clock, _>(|_| Ok(frozen(2)));
    assert!(services.contains(&<dyn Clock>::key()));

    assert_eq!(services.remove_all(&<dyn Clock>::key()), 2);
    assert!(services.is_empty());

    services.add_instance::<dyn Clock>(frozen(3));
    services.clear();
    assert!(services.is_empty());
}

#[test]
fn test_helpers_record_lifetimes() {
    let mut services = ServiceCollection::new();
    services
        .add_singleton::<dyn Clock, _>(|_| Ok(frozen(1)))
        .add_scoped::<dyn Clock, _>(|_| Ok(frozen(2)))
        .add_transient::<dyn Clock, _>(|_| Ok(frozen(3)))
        .add_instance::<dyn Clock>(frozen(4));

    let lifetimes: Vec<Lifetime> = services.iter().map(ServiceDescriptor::lifetime).collect();
    assert_eq!(
        lifetimes,
        [
            Lifetime::Singleton,
            Lifetime::Scoped,
            Lifetime::Transient,
            Lifetime::Singleton
        ]
    );
    assert!(services.iter().last().unwrap().is_instance());
}

#[test]
fn test_add_type_declares_the_contract() {
    contract!(class Frozen);

    let mut services = ServiceCollection::new();
    services.add_type::<dyn Clock, Frozen, _>(Lifetime::Scoped, |_| Ok(frozen(7)));

    let descriptor = services.iter().next().unwrap();
    assert!(!descriptor.is_factory());
    assert_eq!(services.build().get_required::<dyn Clock>().unwrap().now(), 7);
}

#[test]
fn test_collections_have_distinct_identities() {
    let a = ServiceCollection::new();
    let b = ServiceCollection::new();
    assert_ne!(a.id(), b.id());

    let id = a.id();
    assert_eq!(a.build().root_id(), id);
}
