//! Per-type read-side activators

use dashmap::DashMap;
use nestscope_domain::constants::{
    OPTIONS, OPTIONS_ARITY, OPTIONS_MANAGER, OPTIONS_MONITOR, OPTIONS_MONITOR_IMPL,
    OPTIONS_SNAPSHOT,
};
use nestscope_domain::{Contract, Error, Lifetime, Result, ServiceKey, TypeInfo};
use std::sync::Arc;

use super::{Options, OptionsManager, OptionsMonitor, OptionsMonitorImpl, OptionsSnapshot};
use crate::container::{Activator, Instance, Resolver};

/// One of the three read-side options contracts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReadSide {
    Value,
    Snapshot,
    Monitor,
}

impl ReadSide {
    pub(crate) const ALL: [Self; 3] = [Self::Value, Self::Snapshot, Self::Monitor];

    fn contract_name(self) -> &'static str {
        match self {
            Self::Value => OPTIONS,
            Self::Snapshot => OPTIONS_SNAPSHOT,
            Self::Monitor => OPTIONS_MONITOR,
        }
    }

    fn implementation_name(self) -> &'static str {
        match self {
            Self::Value | Self::Snapshot => OPTIONS_MANAGER,
            Self::Monitor => OPTIONS_MONITOR_IMPL,
        }
    }

    pub(crate) fn lifetime(self) -> Lifetime {
        match self {
            Self::Value | Self::Monitor => Lifetime::Singleton,
            Self::Snapshot => Lifetime::Scoped,
        }
    }

    pub(crate) fn open_key(self) -> ServiceKey {
        ServiceKey::open_interface(self.contract_name(), OPTIONS_ARITY)
    }

    pub(crate) fn closed_key(self, options: &ServiceKey) -> ServiceKey {
        super::closed_key(self.contract_name(), options.clone())
    }

    /// Implementation type: open when `options` is `None`
    pub(crate) fn implementation_info(self, options: Option<&ServiceKey>) -> TypeInfo {
        let open = ServiceKey::open_class(self.implementation_name(), OPTIONS_ARITY);
        match options {
            None => TypeInfo::new(open).implementing(self.open_key()),
            Some(options) => TypeInfo::new(open.with_args([options.clone()]))
                .implementing(self.closed_key(options)),
        }
    }
}

/// Read-side activators for one options type
#[derive(Clone)]
struct OptionsBinding {
    value: Activator,
    snapshot: Activator,
    monitor: Activator,
}

impl OptionsBinding {
    fn of<T: Contract + Default>() -> Self {
        Self {
            value: Arc::new(|resolver: &Resolver, _: &ServiceKey| -> Result<Instance> {
                let manager = OptionsManager::<T>::build(resolver)?;
                Ok(Instance::new(Arc::new(manager) as Arc<dyn Options<T>>))
            }),
            snapshot: Arc::new(|resolver: &Resolver, _: &ServiceKey| -> Result<Instance> {
                let manager = OptionsManager::<T>::build(resolver)?;
                Ok(Instance::new(Arc::new(manager) as Arc<dyn OptionsSnapshot<T>>))
            }),
            monitor: Arc::new(|resolver: &Resolver, _: &ServiceKey| -> Result<Instance> {
                let monitor = OptionsMonitorImpl::<T>::build(resolver)?;
                Ok(Instance::new(Arc::new(monitor) as Arc<dyn OptionsMonitor<T>>))
            }),
        }
    }

    fn get(&self, side: ReadSide) -> Activator {
        match side {
            ReadSide::Value => self.value.clone(),
            ReadSide::Snapshot => self.snapshot.clone(),
            ReadSide::Monitor => self.monitor.clone(),
        }
    }
}

/// Options types known to a collection, keyed by the type's key
#[derive(Default)]
pub struct OptionsTable {
    bindings: DashMap<ServiceKey, OptionsBinding>,
}

impl OptionsTable {
    /// Record the read-side activators for `T`
    pub(crate) fn register<T: Contract + Default>(&self) {
        self.bindings
            .entry(T::key())
            .or_insert_with(OptionsBinding::of::<T>);
    }

    /// Whether `options` was registered
    pub fn contains(&self, options: &ServiceKey) -> bool {
        self.bindings.contains_key(options)
    }

    /// Number of registered options types
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// True when no options type was registered
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub(crate) fn activator(&self, side: ReadSide, options: &ServiceKey) -> Option<Activator> {
        self.bindings.get(options).map(|binding| binding.get(side))
    }

    /// Activator for an open-generic read-side binding
    ///
    /// Dispatches on the requested key's type argument.
    pub(crate) fn open_activator(table: Arc<Self>, side: ReadSide) -> Activator {
        Arc::new(move |resolver: &Resolver, requested: &ServiceKey| -> Result<Instance> {
            let options = requested.type_arg(0).ok_or_else(|| {
                Error::activation(requested, "open-generic options need a type argument")
            })?;
            let activator = table.activator(side, options).ok_or_else(|| {
                Error::activation(requested, format!("{options} was never configured"))
            })?;
            activator(resolver, requested)
        })
    }
}

impl std::fmt::Debug for OptionsTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let types: Vec<String> = self.bindings.iter().map(|e| e.key().to_string()).collect();
        f.debug_struct("OptionsTable").field("types", &types).finish()
    }
}
