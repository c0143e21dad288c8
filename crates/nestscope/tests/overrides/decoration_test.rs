//! How decoration rewrites each kind of binding

use crate::common::{APP_PREFIX, Greeter, fixed, greet};
use nestscope::testing::is_mockable;
use nestscope::{
    Contract, Lifetime, ResolverOverridesExt, ServiceCollection, contract, decorate,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

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

struct Catalog {
    items: usize,
}
contract!(class Catalog);

#[test]
fn test_unselected_binding_is_untouched() {
    let mut services = ServiceCollection::new();
    services.add_singleton::<dyn Clock, _>(|_| Ok(Arc::new(Frozen(1)) as Arc<dyn Clock>));
    services.add_scoped::<dyn Greeter, _>(|_| Ok(fixed("hello")));
    decorate(&mut services, |key| key.name().contains("Greeter")).unwrap();

    let clock = services
        .iter()
        .find(|d| d.key() == &<dyn Clock>::key())
        .unwrap();
    assert_eq!(clock.lifetime(), Lifetime::Singleton);

    let root = services.build();
    let before = root.get_required::<dyn Clock>().unwrap();
    let scope = root
        .open_scope(|o| {
            o.add_instance::<dyn Clock>(Arc::new(Frozen(2)));
        })
        .unwrap();
    let inside = scope.resolver().get_required::<dyn Clock>().unwrap();

    assert_eq!(inside.now(), 1);
    assert!(Arc::ptr_eq(&before, &inside));
}

#[test]
fn test_selected_singleton_is_demoted() {
    let builds = Arc::new(AtomicUsize::new(0));
    let seen = builds.clone();
    let mut services = ServiceCollection::new();
    services.add_singleton::<dyn Greeter, _>(move |_| {
        seen.fetch_add(1, Ordering::SeqCst);
        Ok(fixed("hello"))
    });
    decorate(&mut services, is_mockable(APP_PREFIX)).unwrap();

    let descriptor = services.iter().next().unwrap();
    assert_eq!(descriptor.lifetime(), Lifetime::Scoped);
    assert!(descriptor.is_factory());

    let root = services.build();
    greet(&root.create_scope().unwrap());
    greet(&root.create_scope().unwrap());
    assert_eq!(builds.load(Ordering::SeqCst), 2);
}

#[test]
fn test_class_bindings_are_carried_without_redirect() {
    let mut services = ServiceCollection::new();
    services.add_singleton::<Catalog, _>(|_| Ok(Arc::new(Catalog { items: 1 })));
    decorate(&mut services, |_| true).unwrap();

    let descriptor = services.iter().next().unwrap();
    assert_eq!(descriptor.lifetime(), Lifetime::Scoped);

    let root = services.build();
    let scope = root
        .open_scope(|o| {
            o.add_instance::<Catalog>(Arc::new(Catalog { items: 2 }));
        })
        .unwrap();
    // Class bindings are overridden through their dependents, not directly
    assert_eq!(scope.resolver().get_required::<Catalog>().unwrap().items, 1);
}

#[test]
fn test_class_instance_stays_singleton() {
    let mut services = ServiceCollection::new();
    services.add_instance::<Catalog>(Arc::new(Catalog { items: 3 }));
    decorate(&mut services, |_| true).unwrap();

    let descriptor = services.iter().next().unwrap();
    assert!(descriptor.is_instance());
    assert_eq!(descriptor.lifetime(), Lifetime::Singleton);
}

#[test]
fn test_dependents_pick_up_overrides() {
    let mut services = ServiceCollection::new();
    services
        .add_scoped::<dyn Clock, _>(|_| Ok(Arc::new(Frozen(1)) as Arc<dyn Clock>))
        .add_transient::<dyn Greeter, _>(|resolver| {
            let clock = resolver.get_required::<dyn Clock>()?;
            Ok(fixed(format!("hello at {}", clock.now())))
        });
    decorate(&mut services, |_| true).unwrap();
    let root = services.build();

    let scope = root
        .open_scope(|o| {
            o.add_instance::<dyn Clock>(Arc::new(Frozen(42)));
        })
        .unwrap();
    assert_eq!(greet(&scope.resolver()), "hello at 42");
    scope.dispose().unwrap();
    assert_eq!(greet(&root), "hello at 1");
}

#[test]
fn test_undecorated_and_decorated_agree_without_scope() {
    let register = |services: &mut ServiceCollection| {
        services.add_transient::<dyn Greeter, _>(|_| Ok(fixed("hello")));
        services.add_scoped::<dyn Clock, _>(|_| Ok(Arc::new(Frozen(9)) as Arc<dyn Clock>));
    };

    let mut plain = ServiceCollection::new();
    register(&mut plain);
    let plain = plain.build();

    let mut decorated = ServiceCollection::new();
    register(&mut decorated);
    decorate(&mut decorated, |_| true).unwrap();
    let decorated = decorated.build();

    assert_eq!(greet(&plain), greet(&decorated));
    assert_eq!(
        plain.get_required::<dyn Clock>().unwrap().now(),
        decorated.get_required::<dyn Clock>().unwrap().now()
    );
}
