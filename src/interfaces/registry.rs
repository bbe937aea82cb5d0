use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A type-erased service instance as handed out by a [`Registry`].
pub type Service = Arc<dyn Any + Send + Sync>;

/// Identifies the type a member expects from the registry.
#[derive(Clone, Copy)]
pub struct ServiceType {
    id: TypeId,
    name: &'static str,
}

impl ServiceType {
    pub fn of<S: ?Sized + 'static>() -> Self {
        ServiceType {
            id: TypeId::of::<S>(),
            name: type_name::<S>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

// Names are diagnostic only, identity is the TypeId.
impl PartialEq for ServiceType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ServiceType {}

impl Hash for ServiceType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ServiceType").field(&self.name).finish()
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Read side of a service registry: at most one instance per type.
pub trait Registry {
    fn try_get(&self, service: ServiceType) -> Option<Service>;
}

impl<R: Registry + ?Sized> Registry for &R {
    fn try_get(&self, service: ServiceType) -> Option<Service> {
        (**self).try_get(service)
    }
}

impl<R: Registry + ?Sized> Registry for Arc<R> {
    fn try_get(&self, service: ServiceType) -> Option<Service> {
        (**self).try_get(service)
    }
}
