//! Options binder
//!
//! Writers and readers of a typed configuration value are registered
//! separately:
//!
//! | Contract | Side | Lifetime | Backed by |
//! |----------|------|----------|-----------|
//! | `dyn ConfigureOptions<T>` | write | singleton | user callback |
//! | `dyn PostConfigureOptions<T>` | write | singleton | user callback |
//! | `dyn Options<T>` | read | singleton | [`OptionsManager`] |
//! | `dyn OptionsSnapshot<T>` | read | scoped | [`OptionsManager`] |
//! | `dyn OptionsMonitor<T>` | read | singleton | [`OptionsMonitorImpl`] |
//!
//! Read-side contracts are registered once as open generics. Rust cannot
//! instantiate a generic at run time, so every `configure::<T>()` records
//! the activators for `T` in an [`OptionsTable`] the open-generic
//! bindings dispatch through.

mod binder;
mod manager;
mod table;

pub use manager::{OptionsManager, OptionsMonitorImpl};
pub use table::OptionsTable;
pub(crate) use table::ReadSide;

use nestscope_domain::constants::{
    CONFIGURE_OPTIONS, OPTIONS, OPTIONS_ARITY, OPTIONS_MONITOR, OPTIONS_SNAPSHOT,
    POST_CONFIGURE_OPTIONS,
};
use nestscope_domain::{Contract, Result, ServiceKey};
use std::sync::Arc;
use tokio::sync::watch;

/// Configures an options value before it is first read
pub trait ConfigureOptions<T>: Send + Sync {
    /// Apply this configuration step
    fn configure(&self, options: &mut T);
}

/// Runs after every [`ConfigureOptions`] for the same value
pub trait PostConfigureOptions<T>: Send + Sync {
    /// Apply this post-configuration step
    fn post_configure(&self, options: &mut T);
}

/// Plain value holder
pub trait Options<T>: Send + Sync {
    /// The configured value
    fn value(&self) -> Arc<T>;
}

/// Value computed once per resolver scope
pub trait OptionsSnapshot<T>: Send + Sync {
    /// The value as configured when this scope first asked for it
    fn value(&self) -> Arc<T>;
}

/// Current value plus change notifications
pub trait OptionsMonitor<T>: Send + Sync {
    /// The latest value
    fn current_value(&self) -> Arc<T>;

    /// Receiver notified on every reload
    fn subscribe(&self) -> watch::Receiver<Arc<T>>;

    /// Re-run the configuration steps and publish the result
    fn reload(&self) -> Result<()>;
}

/// Key of an options contract closed over `options`
pub(crate) fn closed_key(name: &str, options: ServiceKey) -> ServiceKey {
    ServiceKey::open_interface(name, OPTIONS_ARITY).with_args([options])
}

impl<T: Contract> Contract for dyn ConfigureOptions<T> {
    fn key() -> ServiceKey {
        closed_key(CONFIGURE_OPTIONS, T::key())
    }
}

impl<T: Contract> Contract for dyn PostConfigureOptions<T> {
    fn key() -> ServiceKey {
        closed_key(POST_CONFIGURE_OPTIONS, T::key())
    }
}

impl<T: Contract> Contract for dyn Options<T> {
    fn key() -> ServiceKey {
        closed_key(OPTIONS, T::key())
    }
}

impl<T: Contract> Contract for dyn OptionsSnapshot<T> {
    fn key() -> ServiceKey {
        closed_key(OPTIONS_SNAPSHOT, T::key())
    }
}

impl<T: Contract> Contract for dyn OptionsMonitor<T> {
    fn key() -> ServiceKey {
        closed_key(OPTIONS_MONITOR, T::key())
    }
}

/// True for any options contract, write or read side, closed over a type
pub fn is_options_contract(key: &ServiceKey) -> bool {
    [
        CONFIGURE_OPTIONS,
        POST_CONFIGURE_OPTIONS,
        OPTIONS,
        OPTIONS_SNAPSHOT,
        OPTIONS_MONITOR,
    ]
    .iter()
    .any(|name| key.is_closed_type_of(&ServiceKey::open_interface(*name, OPTIONS_ARITY)))
}
