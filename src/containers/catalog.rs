use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use log::trace;
use crate::error::InjectError;
use crate::injector::Injector;
use crate::interfaces::member::{Declared, Injectable, MemberProvider};

type InjectFn = dyn Fn(&Injector<'_>, &mut dyn Any) -> Result<(), InjectError> + Send + Sync;

struct Entry {
    target: &'static str,
    inject: Box<InjectFn>,
}

fn erase<F>(inject: F) -> Box<InjectFn>
where
    F: Fn(&Injector<'_>, &mut dyn Any) -> Result<(), InjectError> + Send + Sync + 'static,
{
    Box::new(inject)
}

/// Maps a target's runtime type to the provider of its injectable members,
/// so objects held as `dyn Any` can be injected.
///
/// ```rust
/// use std::any::Any;
/// use rinject::{Injectable, Injector, ProviderCatalog, ServiceRegistry};
///
/// #[derive(Injectable, Default)]
/// struct Spawner {
///     #[inject]
///     seed: u64,
/// }
///
/// let mut catalog = ProviderCatalog::new();
/// catalog.register::<Spawner>();
///
/// let registry = ServiceRegistry::new();
/// registry.insert(7u64);
///
/// let mut objects: Vec<Box<dyn Any>> = vec![
///     Box::new(Spawner::default()) as Box<dyn Any>,
///     Box::new("label"),
/// ];
/// let injector = Injector::new(&registry);
/// for object in objects.iter_mut() {
///     catalog.inject(&injector, object.as_mut()).unwrap();
/// }
/// assert_eq!(objects[0].downcast_ref::<Spawner>().unwrap().seed, 7);
/// ```
#[derive(Default)]
pub struct ProviderCatalog {
    entries: HashMap<TypeId, Entry>,
}

impl ProviderCatalog {
    pub fn new() -> Self {
        ProviderCatalog {
            entries: HashMap::new(),
        }
    }

    /// Registers a type that declares its own members.
    pub fn register<T: Injectable>(&mut self) -> &mut Self {
        self.register_with::<T, _>(Declared)
    }

    /// Registers `provider` for targets of type `T`, replacing any earlier one.
    pub fn register_with<T, P>(&mut self, provider: P) -> &mut Self
    where
        T: Any,
        P: MemberProvider<T> + Send + Sync + 'static,
    {
        let inject = erase(move |injector, target| match target.downcast_mut::<T>() {
            Some(target) => injector.inject_with(&provider, target),
            None => Ok(()),
        });
        self.entries.insert(
            TypeId::of::<T>(),
            Entry {
                target: type_name::<T>(),
                inject,
            },
        );
        self
    }

    pub fn contains<T: Any>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Injects `target` using the provider registered for its runtime type.
    /// Returns `Ok(false)` without touching the target when none is registered.
    pub fn inject(
        &self,
        injector: &Injector<'_>,
        target: &mut dyn Any,
    ) -> Result<bool, InjectError> {
        let type_id = (*target).type_id();
        match self.entries.get(&type_id) {
            Some(entry) => {
                trace!("Injecting catalog target '{}'", entry.target);
                (entry.inject)(injector, target)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl fmt::Debug for ProviderCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.values().map(|entry| entry.target))
            .finish()
    }
}
