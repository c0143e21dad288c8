//! In-process test host
//!
//! Builds an application's registry the way its startup code does,
//! decorates it for overrides, and dispatches "requests" the way an
//! in-process server that preserves the caller's execution context would:
//! each request runs on its own task, in a fresh request scope of the root
//! provider, starting from a snapshot of the test's chain.
//!
//! ```text
//! test chain ── open_scope(host.root_scope(), mocks) ──┐
//!                                                       │ fork
//! host.dispatch(handler) ──▶ spawned request task ◀─────┘
//!                             └─ request scope of root ─▶ sees the mocks
//! ```

use nestscope_domain::{Result, ServiceKey};
use nestscope_infrastructure::logging::init_logging;
use nestscope_infrastructure::{AppConfig, ConfigLoader, ErrorContext};
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use crate::container::{Resolver, ServiceCollection};
use crate::options::is_options_contract;
use crate::overrides::{
    OverrideRegistry, ScopeHandle, context, current_resolver, decorate_with_config, open_scope,
};

type Startup = Box<dyn FnOnce(&mut ServiceCollection) + Send>;
type Predicate = Box<dyn Fn(&ServiceKey) -> bool + Send + Sync>;

/// Builder for [`TestHost`]
pub struct TestHostBuilder {
    config: AppConfig,
    startup: Vec<Startup>,
    predicate: Predicate,
    logging: bool,
}

impl Default for TestHostBuilder {
    fn default() -> Self {
        Self {
            config: AppConfig::default(),
            startup: Vec::new(),
            predicate: Box::new(|_: &ServiceKey| true),
            logging: true,
        }
    }
}

impl TestHostBuilder {
    /// Use `config` for logging and override settings
    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    /// Load settings from `path`, with `NESTSCOPE__` variables on top
    ///
    /// A missing file leaves the defaults in place.
    pub fn with_config_file(self, path: impl AsRef<Path>) -> Result<Self> {
        let config = ConfigLoader::new().with_config_path(path).load()?;
        Ok(self.with_config(config))
    }

    /// Load settings from the default `nestscope.toml` locations and the
    /// environment
    pub fn with_loaded_config(self) -> Result<Self> {
        let config = ConfigLoader::new().load()?;
        Ok(self.with_config(config))
    }

    /// Add a startup step registering application services
    pub fn configure_services<F>(mut self, startup: F) -> Self
    where
        F: FnOnce(&mut ServiceCollection) + Send + 'static,
    {
        self.startup.push(Box::new(startup));
        self
    }

    /// Select which bindings may be overridden; everything by default
    pub fn decorate_when<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&ServiceKey) -> bool + Send + Sync + 'static,
    {
        self.predicate = Box::new(predicate);
        self
    }

    /// Skip installing the global tracing subscriber
    pub fn without_logging(mut self) -> Self {
        self.logging = false;
        self
    }

    /// Run startup, decorate and build
    pub fn build(self) -> Result<TestHost> {
        if self.logging {
            init_logging(&self.config.logging)?;
        }

        let mut services = ServiceCollection::new();
        for startup in self.startup {
            startup(&mut services);
        }
        let predicate = self.predicate;
        let registry = decorate_with_config(
            &mut services,
            |key: &ServiceKey| predicate(key),
            self.config.overrides,
        )?;

        let provider = services.build();
        let root_scope = provider.create_scope()?;
        debug!(registry = %registry.id(), "Test host started");
        Ok(TestHost {
            provider,
            root_scope,
            registry,
        })
    }
}

/// Application host for tests, with a shared decorated provider
pub struct TestHost {
    provider: Resolver,
    root_scope: Resolver,
    registry: OverrideRegistry,
}

impl TestHost {
    /// Start building a host
    pub fn builder() -> TestHostBuilder {
        TestHostBuilder::default()
    }

    /// Scope of the root provider that tests open override scopes on
    pub fn root_scope(&self) -> &Resolver {
        &self.root_scope
    }

    /// Root provider requests are served from
    pub fn provider(&self) -> &Resolver {
        &self.provider
    }

    /// Handle to the provider's override index
    pub fn registry(&self) -> &OverrideRegistry {
        &self.registry
    }

    /// Open an override scope on [`root_scope`](Self::root_scope)
    pub fn open_scope<F>(&self, configure: F) -> Result<ScopeHandle>
    where
        F: FnOnce(&mut ServiceCollection),
    {
        open_scope(&self.root_scope, configure)
    }

    /// Resolver reflecting the scope active for the calling chain
    pub fn current_resolver(&self) -> Resolver {
        current_resolver(&self.root_scope)
    }

    /// Run `handler` as a request
    ///
    /// The handler gets a fresh request scope of the root provider and runs
    /// on a spawned task forked from the caller's chain. The request scope
    /// is released once the handler finishes.
    pub async fn dispatch<F, Fut, T>(&self, handler: F) -> Result<T>
    where
        F: FnOnce(Resolver) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
        T: Send + 'static,
    {
        let request = self.provider.create_scope()?;
        let task = context::spawn(async move {
            let output = handler(request.clone()).await;
            request.dispose();
            output
        });
        task.await.context("request task failed")?
    }
}

impl Drop for TestHost {
    fn drop(&mut self) {
        self.root_scope.dispose();
    }
}

impl std::fmt::Debug for TestHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestHost")
            .field("registry", &self.registry)
            .field("root_scope", &self.root_scope)
            .finish()
    }
}

/// Predicate selecting application types for decoration
///
/// Matches keys whose name starts with `prefix`, and options contracts
/// over such types. A `dyn ` prefix on trait object names is ignored.
pub fn is_mockable(
    prefix: impl Into<String>,
) -> impl Fn(&ServiceKey) -> bool + Clone + Send + Sync + 'static {
    let prefix: Arc<str> = prefix.into().into();
    move |key: &ServiceKey| {
        from_prefix(key, &prefix)
            || (is_options_contract(key)
                && key.type_arg(0).is_some_and(|t| from_prefix(t, &prefix)))
    }
}

fn from_prefix(key: &ServiceKey, prefix: &str) -> bool {
    let name = key.name();
    name.strip_prefix("dyn ").unwrap_or(name).starts_with(prefix)
}
