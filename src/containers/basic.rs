use std::any::{Any, TypeId};
use std::sync::Arc;
use dashmap::DashMap;
use crate::interfaces::registry::{Registry, Service, ServiceType};

/// Thread-safe registry holding one instance per service type.
///
/// Registration takes `&self` so a single registry can be shared between
/// loader threads while a scene is being assembled.
pub struct ServiceRegistry {
    services: DashMap<TypeId, Service>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        ServiceRegistry {
            services: DashMap::new(),
        }
    }

    /// Registers `value` under its own type, returning the instance it replaced.
    pub fn insert<S: Any + Send + Sync>(&self, value: S) -> Option<Service> {
        self.insert_shared(Arc::new(value))
    }

    /// Registers an instance the caller keeps a handle to.
    pub fn insert_shared<S: Any + Send + Sync>(&self, value: Arc<S>) -> Option<Service> {
        self.services.insert(TypeId::of::<S>(), value)
    }

    pub fn get<S: Any + Send + Sync>(&self) -> Option<Arc<S>> {
        self.services
            .get(&TypeId::of::<S>())
            .and_then(|entry| Arc::clone(entry.value()).downcast::<S>().ok())
    }

    pub fn contains<S: Any + Send + Sync>(&self) -> bool {
        self.services.contains_key(&TypeId::of::<S>())
    }

    pub fn remove<S: Any + Send + Sync>(&self) -> Option<Service> {
        self.services
            .remove(&TypeId::of::<S>())
            .map(|(_, service)| service)
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl Registry for ServiceRegistry {
    fn try_get(&self, service: ServiceType) -> Option<Service> {
        self.services
            .get(&service.id())
            .map(|entry| Arc::clone(entry.value()))
    }
}

impl Default for ServiceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
