//! Options registration helpers on [`ServiceCollection`]

use nestscope_domain::Contract;
use std::marker::PhantomData;
use std::sync::Arc;

use super::{ConfigureOptions, OptionsTable, PostConfigureOptions, ReadSide};
use crate::container::{ImplementationType, ServiceCollection, ServiceDescriptor, ServiceImpl};

/// Adapts a closure to a configuration step
struct ConfigureFn<T, F> {
    apply: F,
    _options: PhantomData<fn(&mut T)>,
}

impl<T, F> ConfigureFn<T, F> {
    fn new(apply: F) -> Self {
        Self {
            apply,
            _options: PhantomData,
        }
    }
}

impl<T, F> ConfigureOptions<T> for ConfigureFn<T, F>
where
    F: Fn(&mut T) + Send + Sync,
{
    fn configure(&self, options: &mut T) {
        (self.apply)(options);
    }
}

impl<T, F> PostConfigureOptions<T> for ConfigureFn<T, F>
where
    F: Fn(&mut T) + Send + Sync,
{
    fn post_configure(&self, options: &mut T) {
        (self.apply)(options);
    }
}

impl ServiceCollection {
    /// Register the open-generic read-side contracts, once
    pub fn add_options(&mut self) -> &mut Self {
        for side in ReadSide::ALL {
            let activator = OptionsTable::open_activator(self.options_table().clone(), side);
            let implementation =
                ImplementationType::from_activator(side.implementation_info(None), activator);
            self.try_add(ServiceDescriptor::from_parts(
                side.open_key(),
                side.lifetime(),
                ServiceImpl::Type(implementation),
            ));
        }
        self
    }

    /// Configure `T` with a closure
    pub fn configure<T, F>(&mut self, configure: F) -> &mut Self
    where
        T: Contract + Default,
        F: Fn(&mut T) + Send + Sync + 'static,
    {
        self.configure_with::<T>(Arc::new(ConfigureFn::new(configure)))
    }

    /// Register a configuration step for `T`
    pub fn configure_with<T>(&mut self, step: Arc<dyn ConfigureOptions<T>>) -> &mut Self
    where
        T: Contract + Default,
    {
        self.add_options();
        self.options_table().register::<T>();
        self.add_instance::<dyn ConfigureOptions<T>>(step)
    }

    /// Post-configure `T` with a closure
    pub fn post_configure<T, F>(&mut self, post_configure: F) -> &mut Self
    where
        T: Contract + Default,
        F: Fn(&mut T) + Send + Sync + 'static,
    {
        self.post_configure_with::<T>(Arc::new(ConfigureFn::new(post_configure)))
    }

    /// Register a post-configuration step for `T`
    pub fn post_configure_with<T>(&mut self, step: Arc<dyn PostConfigureOptions<T>>) -> &mut Self
    where
        T: Contract + Default,
    {
        self.add_options();
        self.options_table().register::<T>();
        self.add_instance::<dyn PostConfigureOptions<T>>(step)
    }
}
