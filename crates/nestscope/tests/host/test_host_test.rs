//! Requests served by the in-process test host

use crate::common::{APP_PREFIX, Greeter, fixed, greet};
use futures::future::join_all;
use nestscope::open_scope;
use nestscope::overrides::context;
use nestscope::testing::{TestHost, is_mockable};
use nestscope_domain::Error;

fn host() -> TestHost {
    TestHost::builder()
        .without_logging()
        .configure_services(|services| {
            services.add_scoped::<dyn Greeter, _>(|_| Ok(fixed("hello")));
        })
        .decorate_when(is_mockable(APP_PREFIX))
        .build()
        .unwrap()
}

async fn request(host: &TestHost) -> String {
    host.dispatch(|r| async move { Ok(greet(&r)) }).await.unwrap()
}

#[tokio::test]
async fn test_request_without_scope_uses_registered_binding() {
    let host = host();
    assert_eq!(request(&host).await, "hello");
}

#[tokio::test]
async fn test_request_sees_scope_opened_by_test() {
    let host = host();
    let scope = host
        .open_scope(|o| {
            o.add_instance::<dyn Greeter>(fixed("mock"));
        })
        .unwrap();

    assert_eq!(request(&host).await, "mock");
    assert_eq!(greet(&host.current_resolver()), "mock");

    scope.dispose().unwrap();
    assert_eq!(request(&host).await, "hello");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_tests_share_one_host() {
    let host = std::sync::Arc::new(host());
    let tests = (0..8).map(|i| {
        let host = host.clone();
        context::spawn(async move {
            let label = format!("mock{i}");
            let scope = host
                .open_scope(|o| {
                    o.add_instance::<dyn Greeter>(fixed(label.clone()));
                })
                .unwrap();
            tokio::task::yield_now().await;
            let seen = request(&host).await;
            scope.dispose().unwrap();
            (label, seen)
        })
    });

    for result in join_all(tests).await {
        let (label, seen) = result.unwrap();
        assert_eq!(seen, label);
    }
    assert_eq!(request(&host).await, "hello");
}

#[tokio::test]
async fn test_handler_error_is_returned() {
    let host = host();
    let result: nestscope_domain::Result<()> = host
        .dispatch(|_| async { Err(Error::invalid_argument("bad request")) })
        .await;
    assert!(matches!(result, Err(Error::InvalidArgument { .. })));
}

#[tokio::test]
async fn test_request_scopes_are_released() {
    let host = host();
    let request_resolver = host.dispatch(|r| async move { Ok(r) }).await.unwrap();
    assert!(request_resolver.is_disposed());
    assert!(!host.root_scope().is_disposed());
}

#[test]
fn test_host_reads_override_settings_from_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("nestscope.toml");
    std::fs::write(&path, "[overrides]\nmax_depth = 1\n").unwrap();

    let host = TestHost::builder()
        .without_logging()
        .with_config_file(&path)
        .unwrap()
        .configure_services(|services| {
            services.add_scoped::<dyn Greeter, _>(|_| Ok(fixed("hello")));
        })
        .build()
        .unwrap();
    assert_eq!(host.registry().config().max_depth, 1);

    let outer = host.open_scope(|_| {}).unwrap();
    let nested = open_scope(&outer.resolver(), |_| {});
    assert!(matches!(nested, Err(Error::InvalidArgument { .. })));
}

#[test]
fn test_host_rejects_invalid_config_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("nestscope.toml");
    std::fs::write(&path, "[overrides]\nmax_depth = 0\n").unwrap();

    let result = TestHost::builder().with_config_file(&path);
    assert!(matches!(result, Err(Error::Configuration { .. })));
}
