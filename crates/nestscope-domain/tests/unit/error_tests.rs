//! Error Tests

use nestscope_domain::{Error, ScopeId, ServiceKey};
use std::error::Error as _;

#[test]
fn test_not_found_display() {
    let err = Error::not_found("dyn app::Greeter");
    assert_eq!(err.to_string(), "Not found: dyn app::Greeter");
}

#[test]
fn test_activation_with_source_keeps_cause() {
    let cause = std::io::Error::other("socket closed");
    let err = Error::activation_with_source(ServiceKey::interface("Client"), cause);

    assert!(err.to_string().contains("Client"));
    assert!(err.to_string().contains("socket closed"));
    assert!(err.source().is_some());
}

#[test]
fn test_scope_order_without_current() {
    let scope = ScopeId::next();
    let err = Error::scope_order(scope, None::<ScopeId>);
    match err {
        Error::ScopeOrder { scope: s, current } => {
            assert_eq!(s, scope.to_string());
            assert_eq!(current, "none");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_scope_order_with_current() {
    let scope = ScopeId::next();
    let current = ScopeId::next();
    let err = Error::scope_order(scope, Some(current));
    assert!(err.to_string().contains(&current.to_string()));
}

#[test]
fn test_type_mismatch_names_expected_type() {
    let err = Error::type_mismatch(ServiceKey::class("Clock"), "u32");
    assert_eq!(err.to_string(), "Type mismatch for Clock: expected u32");
}

#[test]
fn test_io_error_conversion() {
    let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let err: Error = io.into();
    assert!(matches!(err, Error::Io { .. }));
    assert!(err.source().is_some());
}
