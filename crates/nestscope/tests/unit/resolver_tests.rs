//! Resolver tests: lookup order, caching, scopes

use nestscope::{
    Contract, Error, ImplementationType, Instance, Lifetime, ServiceCollection, ServiceDescriptor,
    ServiceKey, TypeInfo, contract,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

trait Counter: Send + Sync {
    fn serial(&self) -> usize;
}
contract!(interface dyn Counter);

struct Serial(usize);

impl Counter for Serial {
    fn serial(&self) -> usize {
        self.0
    }
}

/// Collection with one `Counter` registration numbering each build
fn counting(lifetime: Lifetime) -> (ServiceCollection, Arc<AtomicUsize>) {
    let builds = Arc::new(AtomicUsize::new(0));
    let seen = builds.clone();
    let mut services = ServiceCollection::new();
    services.add_factory::<dyn Counter, _>(lifetime, move |_| {
        Ok(Arc::new(Serial(seen.fetch_add(1, Ordering::SeqCst))) as Arc<dyn Counter>)
    });
    (services, builds)
}

#[test]
fn test_last_registration_wins() {
    let mut services = ServiceCollection::new();
    services
        .add_transient::<dyn Counter, _>(|_| Ok(Arc::new(Serial(1)) as Arc<dyn Counter>))
        .add_transient::<dyn Counter, _>(|_| Ok(Arc::new(Serial(2)) as Arc<dyn Counter>));
    let root = services.build();

    assert_eq!(root.get_required::<dyn Counter>().unwrap().serial(), 2);
    let all: Vec<usize> = root
        .get_all::<dyn Counter>()
        .unwrap()
        .iter()
        .map(|c| c.serial())
        .collect();
    assert_eq!(all, [1, 2]);
}

#[test]
fn test_missing_service() {
    let root = ServiceCollection::new().build();
    assert!(root.get::<dyn Counter>().unwrap().is_none());
    assert!(matches!(
        root.get_required::<dyn Counter>(),
        Err(Error::NotFound { .. })
    ));
}

#[test]
fn test_transient_is_never_cached() {
    let (services, builds) = counting(Lifetime::Transient);
    let root = services.build();
    root.get_required::<dyn Counter>().unwrap();
    root.get_required::<dyn Counter>().unwrap();
    assert_eq!(builds.load(Ordering::SeqCst), 2);
}

#[test]
fn test_scoped_is_cached_per_scope() {
    let (services, builds) = counting(Lifetime::Scoped);
    let root = services.build();
    let first = root.create_scope().unwrap();
    let second = root.create_scope().unwrap();

    let a = first.get_required::<dyn Counter>().unwrap();
    let b = first.get_required::<dyn Counter>().unwrap();
    let c = second.get_required::<dyn Counter>().unwrap();

    assert!(Arc::ptr_eq(&a, &b));
    assert!(!Arc::ptr_eq(&a, &c));
    assert_eq!(builds.load(Ordering::SeqCst), 2);
}

#[test]
fn test_singleton_is_shared_across_scopes() {
    let (services, builds) = counting(Lifetime::Singleton);
    let root = services.build();
    let scope = root.create_scope().unwrap();

    let a = root.get_required::<dyn Counter>().unwrap();
    let b = scope.get_required::<dyn Counter>().unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(builds.load(Ordering::SeqCst), 1);
}

#[test]
fn test_open_generic_fallback_receives_requested_key() {
    let repository = ServiceKey::open_interface("Repository", 1);
    let implementation = ImplementationType::new(
        TypeInfo::new(ServiceKey::open_class("MemoryRepository", 1))
            .implementing(repository.clone()),
        |_, requested| Ok(Instance::new(Arc::new(requested.to_string()))),
    );
    let mut services = ServiceCollection::new();
    services.add(
        ServiceDescriptor::implementation(repository.clone(), Lifetime::Transient, implementation)
            .unwrap(),
    );

    let users = repository
        .make_closed(&[ServiceKey::class("User")])
        .unwrap();
    let orders = repository
        .make_closed(&[ServiceKey::class("Order")])
        .unwrap();
    services.add(
        ServiceDescriptor::instance(orders.clone(), Instance::new(Arc::new("exact".to_string())))
            .unwrap(),
    );
    let root = services.build();

    let built = root.resolve(&users).unwrap().unwrap();
    assert_eq!(*built.downcast::<String>().unwrap(), "Repository<User>");

    let exact = root.resolve(&orders).unwrap().unwrap();
    assert_eq!(*exact.downcast::<String>().unwrap(), "exact");
}

#[test]
fn test_type_mismatch_is_reported() {
    let mut services = ServiceCollection::new();
    services.add(
        ServiceDescriptor::instance(<dyn Counter>::key(), Instance::new(Arc::new(5_u32))).unwrap(),
    );
    let root = services.build();
    assert!(matches!(
        root.get::<dyn Counter>(),
        Err(Error::TypeMismatch { .. })
    ));
}

#[test]
fn test_disposed_scope_rejects_resolution() {
    let (services, _) = counting(Lifetime::Scoped);
    let root = services.build();
    let scope = root.create_scope().unwrap();

    assert!(scope.dispose());
    assert!(!scope.dispose());
    assert!(scope.is_disposed());
    assert!(matches!(
        scope.get::<dyn Counter>(),
        Err(Error::ScopeDisposed { .. })
    ));
    assert!(scope.create_scope().is_err());

    // The root is unaffected
    assert!(root.get::<dyn Counter>().unwrap().is_some());
}

#[test]
fn test_factories_receive_the_resolving_scope() {
    trait Label: Send + Sync {
        fn text(&self) -> String;
    }
    contract!(interface dyn Label);
    struct Text(String);
    impl Label for Text {
        fn text(&self) -> String {
            self.0.clone()
        }
    }

    let (mut services, _) = counting(Lifetime::Scoped);
    services.add_transient::<dyn Label, _>(|resolver| {
        let counter = resolver.get_required::<dyn Counter>()?;
        Ok(Arc::new(Text(format!("#{}", counter.serial()))) as Arc<dyn Label>)
    });
    let root = services.build();
    let first = root.create_scope().unwrap();
    let second = root.create_scope().unwrap();

    assert_eq!(first.get_required::<dyn Label>().unwrap().text(), "#0");
    assert_eq!(first.get_required::<dyn Label>().unwrap().text(), "#0");
    assert_eq!(second.get_required::<dyn Label>().unwrap().text(), "#1");
}

#[test]
fn test_resolver_identity() {
    let root = ServiceCollection::new().build();
    let scope = root.create_scope().unwrap();
    assert!(root.ptr_eq(&root.clone()));
    assert!(!root.ptr_eq(&scope));
    assert!(scope.root_resolver().ptr_eq(&root));
    assert_ne!(root.id(), scope.id());
    assert_eq!(root.root_id(), scope.root_id());
}
