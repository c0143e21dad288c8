//! Read-side implementations

use nestscope_domain::{Contract, Error, Result};
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

use super::{ConfigureOptions, Options, OptionsMonitor, OptionsSnapshot, PostConfigureOptions};
use crate::container::{Resolver, WeakResolver};

/// Builds an options value from the registered configuration steps
///
/// Starts from `T::default()`, applies every `ConfigureOptions<T>` then
/// every `PostConfigureOptions<T>`, each in registration order.
pub struct OptionsManager<T> {
    value: Arc<T>,
}

impl<T: Contract + Default> OptionsManager<T> {
    /// Compute the value through `resolver`
    pub fn build(resolver: &Resolver) -> Result<Self> {
        Ok(Self {
            value: Arc::new(compute::<T>(resolver)?),
        })
    }
}

impl<T: Contract> Options<T> for OptionsManager<T> {
    fn value(&self) -> Arc<T> {
        self.value.clone()
    }
}

impl<T: Contract> OptionsSnapshot<T> for OptionsManager<T> {
    fn value(&self) -> Arc<T> {
        self.value.clone()
    }
}

impl<T> fmt::Debug for OptionsManager<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionsManager")
            .field("type", &std::any::type_name::<T>())
            .finish_non_exhaustive()
    }
}

/// Monitor publishing each recomputed value on a watch channel
pub struct OptionsMonitorImpl<T> {
    registry: WeakResolver,
    sender: watch::Sender<Arc<T>>,
}

impl<T: Contract + Default> OptionsMonitorImpl<T> {
    /// Compute the initial value and open the channel
    pub fn build(resolver: &Resolver) -> Result<Self> {
        let initial = Arc::new(compute::<T>(resolver)?);
        let (sender, _) = watch::channel(initial);
        Ok(Self {
            registry: WeakResolver::new(resolver),
            sender,
        })
    }
}

impl<T: Contract + Default> OptionsMonitor<T> for OptionsMonitorImpl<T> {
    fn current_value(&self) -> Arc<T> {
        self.sender.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Arc<T>> {
        self.sender.subscribe()
    }

    fn reload(&self) -> Result<()> {
        let resolver = self
            .registry
            .upgrade()
            .ok_or_else(|| Error::infrastructure("options registry has been dropped"))?;
        let value = Arc::new(compute::<T>(&resolver)?);
        self.sender.send_replace(value);
        debug!(
            options = std::any::type_name::<T>(),
            subscribers = self.sender.receiver_count(),
            "Options reloaded"
        );
        Ok(())
    }
}

impl<T> fmt::Debug for OptionsMonitorImpl<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionsMonitorImpl")
            .field("type", &std::any::type_name::<T>())
            .field("subscribers", &self.sender.receiver_count())
            .finish()
    }
}

fn compute<T: Contract + Default>(resolver: &Resolver) -> Result<T> {
    let mut value = T::default();
    for step in resolver.get_all::<dyn ConfigureOptions<T>>()? {
        step.configure(&mut value);
    }
    for step in resolver.get_all::<dyn PostConfigureOptions<T>>()? {
        step.post_configure(&mut value);
    }
    Ok(value)
}
