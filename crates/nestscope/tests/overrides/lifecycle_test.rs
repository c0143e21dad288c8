//! Scope disposal, ordering and preconditions

use crate::common::{Greeter, fixed, greet, hello_root};
use nestscope::{
    Error, ResolverOverridesExt, ServiceCollection, current_resolver, decorate,
    decorate_with_config,
};
use nestscope_infrastructure::OverrideConfig;
use std::sync::Arc;

#[test]
fn test_double_dispose_is_a_no_op() {
    let root = hello_root();
    let scope = root.open_scope(|_| {}).unwrap();

    scope.dispose().unwrap();
    assert!(scope.is_disposed());
    scope.dispose().unwrap();
    assert!(current_resolver(&root).ptr_eq(&root));
}

#[test]
fn test_dispose_releases_scope_resolver() {
    let root = hello_root();
    let scope = root
        .open_scope(|o| {
            o.add_instance::<dyn Greeter>(fixed("mock"));
        })
        .unwrap();
    let resolver = scope.resolver();
    scope.dispose().unwrap();

    assert!(scope.scope().is_released());
    assert!(matches!(
        resolver.get::<dyn Greeter>(),
        Err(Error::ScopeDisposed { .. })
    ));
    assert!(resolver.open_scope(|_| {}).is_err());
}

#[test]
fn test_drop_disposes() {
    let root = hello_root();
    {
        let _scope = root
            .open_scope(|o| {
                o.add_instance::<dyn Greeter>(fixed("mock"));
            })
            .unwrap();
        assert_eq!(greet(&current_resolver(&root)), "mock");
    }
    assert_eq!(greet(&current_resolver(&root)), "hello");
}

#[test]
fn test_out_of_order_dispose_is_rejected() {
    let root = hello_root();
    let outer = root.open_scope(|_| {}).unwrap();
    let inner = outer.resolver().open_scope(|_| {}).unwrap();

    let err = outer.dispose().unwrap_err();
    assert!(matches!(err, Error::ScopeOrder { .. }));
    assert!(!outer.is_disposed());
    assert!(current_resolver(&root).ptr_eq(&inner.resolver()));

    inner.dispose().unwrap();
    outer.dispose().unwrap();
    assert!(current_resolver(&root).ptr_eq(&root));
}

#[test]
fn test_relaxed_order_skips_disposed_scopes() {
    let mut services = ServiceCollection::new();
    services.add_scoped::<dyn Greeter, _>(|_| Ok(fixed("hello")));
    let config = OverrideConfig {
        strict_disposal_order: false,
        ..OverrideConfig::default()
    };
    decorate_with_config(&mut services, |_| true, config).unwrap();
    let root = services.build();

    let outer = root
        .open_scope(|o| {
            o.add_instance::<dyn Greeter>(fixed("outer"));
        })
        .unwrap();
    let inner = outer.resolver().open_scope(|_| {}).unwrap();

    outer.dispose().unwrap();
    assert!(current_resolver(&root).ptr_eq(&root));
    inner.dispose().unwrap();
    // `outer` was current when `inner` opened, but is gone by now
    assert!(current_resolver(&root).ptr_eq(&root));
    assert_eq!(greet(&root), "hello");
}

#[test]
fn test_out_of_order_drop_restores_prior_state() {
    let root = hello_root();
    let first = root
        .open_scope(|o| {
            o.add_instance::<dyn Greeter>(fixed("first"));
        })
        .unwrap();
    let second = root
        .open_scope(|o| {
            o.add_instance::<dyn Greeter>(fixed("second"));
        })
        .unwrap();

    drop(first);
    assert_eq!(greet(&current_resolver(&root)), "second");
    drop(second);

    assert!(current_resolver(&root).ptr_eq(&root));
    assert_eq!(greet(&root), "hello");
}

#[test]
fn test_out_of_order_drop_keeps_outer_scope_current() {
    let root = hello_root();
    let outer = root
        .open_scope(|o| {
            o.add_instance::<dyn Greeter>(fixed("outer"));
        })
        .unwrap();
    let middle = root.open_scope(|_| {}).unwrap();
    let inner = root
        .open_scope(|o| {
            o.add_instance::<dyn Greeter>(fixed("inner"));
        })
        .unwrap();

    drop(middle);
    inner.dispose().unwrap();
    assert_eq!(greet(&current_resolver(&root)), "outer");

    outer.dispose().unwrap();
    assert_eq!(greet(&current_resolver(&root)), "hello");
}

#[test]
fn test_values_built_through_root_are_released_with_scope() {
    let root = hello_root();
    let mut released = Vec::new();

    for i in 0..3 {
        let mock = fixed(format!("mock{i}"));
        released.push(Arc::downgrade(&mock));
        let scope = root
            .open_scope(move |o| {
                o.add_instance::<dyn Greeter>(mock);
            })
            .unwrap();
        assert_eq!(greet(&root), format!("mock{i}"));
        scope.dispose().unwrap();
        drop(scope);
        assert_eq!(greet(&root), "hello");
    }

    let alive = released.iter().filter(|w| w.upgrade().is_some()).count();
    assert_eq!(alive, 0);
}

#[test]
fn test_max_depth_is_enforced() {
    let mut services = ServiceCollection::new();
    let config = OverrideConfig {
        max_depth: 2,
        ..OverrideConfig::default()
    };
    decorate_with_config(&mut services, |_| true, config).unwrap();
    let root = services.build();

    let first = root.open_scope(|_| {}).unwrap();
    let second = first.resolver().open_scope(|_| {}).unwrap();
    let third = second.resolver().open_scope(|_| {});
    assert!(matches!(third, Err(Error::InvalidArgument { .. })));
}

#[test]
fn test_undecorated_registry_cannot_open_scopes() {
    let root = ServiceCollection::new().build();
    assert!(matches!(
        root.open_scope(|_| {}),
        Err(Error::InvalidArgument { .. })
    ));
    assert!(current_resolver(&root).ptr_eq(&root));
}

#[test]
fn test_decorating_twice_fails() {
    let mut services = ServiceCollection::new();
    decorate(&mut services, |_| true).unwrap();
    assert!(services.is_decorated());
    assert!(matches!(
        decorate(&mut services, |_| true),
        Err(Error::InvalidArgument { .. })
    ));
}
