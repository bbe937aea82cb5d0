use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

use crate::error::AssignError;
use crate::interfaces::registry::{Service, ServiceType};

type AssignFn<T> = dyn Fn(&mut T, &Service) -> Result<(), AssignError> + Send + Sync;

/// A type-checked setter that writes a resolved service into a target.
pub struct Assign<T> {
    apply: Arc<AssignFn<T>>,
}

impl<T: 'static> Assign<T> {
    pub fn new<F>(apply: F) -> Self
    where
        F: Fn(&mut T, &Service) -> Result<(), AssignError> + Send + Sync + 'static,
    {
        Assign {
            apply: Arc::new(apply),
        }
    }

    /// Writes the registry's own instance, so the target shares it.
    pub fn shared<S, F>(set: F) -> Self
    where
        S: Any + Send + Sync,
        F: Fn(&mut T, Arc<S>) + Send + Sync + 'static,
    {
        Self::try_shared(move |target: &mut T, value: Arc<S>| {
            set(target, value);
            Ok(())
        })
    }

    pub fn try_shared<S, F>(set: F) -> Self
    where
        S: Any + Send + Sync,
        F: Fn(&mut T, Arc<S>) -> Result<(), AssignError> + Send + Sync + 'static,
    {
        Self::new(move |target, service| {
            let value = Arc::clone(service)
                .downcast::<S>()
                .map_err(|_| AssignError::TypeMismatch {
                    expected: type_name::<S>(),
                })?;
            set(target, value)
        })
    }

    /// Writes a clone of the stored value. Used for plain values and for
    /// services registered as `Arc<dyn Trait>`.
    pub fn cloned<S, F>(set: F) -> Self
    where
        S: Any + Send + Sync + Clone,
        F: Fn(&mut T, S) + Send + Sync + 'static,
    {
        Self::try_cloned(move |target: &mut T, value: S| {
            set(target, value);
            Ok(())
        })
    }

    pub fn try_cloned<S, F>(set: F) -> Self
    where
        S: Any + Send + Sync + Clone,
        F: Fn(&mut T, S) -> Result<(), AssignError> + Send + Sync + 'static,
    {
        Self::new(move |target, service| {
            let value = (**service)
                .downcast_ref::<S>()
                .cloned()
                .ok_or(AssignError::TypeMismatch {
                    expected: type_name::<S>(),
                })?;
            set(target, value)
        })
    }
}

impl<T> Assign<T> {
    pub fn apply(&self, target: &mut T, service: &Service) -> Result<(), AssignError> {
        (self.apply)(target, service)
    }
}

impl<T> Clone for Assign<T> {
    fn clone(&self) -> Self {
        Assign {
            apply: Arc::clone(&self.apply),
        }
    }
}

impl<T> fmt::Debug for Assign<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Assign")
    }
}

/// How a member is written.
pub enum Access<T> {
    /// The member can be assigned directly.
    Writable(Assign<T>),
    /// Read-only at the interface; written through backing storage the
    /// provider resolves.
    ReadOnly,
}

impl<T> Clone for Access<T> {
    fn clone(&self) -> Self {
        match self {
            Access::Writable(assign) => Access::Writable(assign.clone()),
            Access::ReadOnly => Access::ReadOnly,
        }
    }
}

/// One member of a target that is eligible for injection.
pub struct Member<T> {
    name: &'static str,
    service: ServiceType,
    required: bool,
    access: Access<T>,
}

impl<T: 'static> Member<T> {
    pub fn new(name: &'static str, service: ServiceType, access: Access<T>) -> Self {
        Member {
            name,
            service,
            required: true,
            access,
        }
    }

    pub fn shared<S, F>(name: &'static str, set: F) -> Self
    where
        S: Any + Send + Sync,
        F: Fn(&mut T, Arc<S>) + Send + Sync + 'static,
    {
        Self::new(
            name,
            ServiceType::of::<S>(),
            Access::Writable(Assign::shared(set)),
        )
    }

    pub fn cloned<S, F>(name: &'static str, set: F) -> Self
    where
        S: Any + Send + Sync + Clone,
        F: Fn(&mut T, S) + Send + Sync + 'static,
    {
        Self::new(
            name,
            ServiceType::of::<S>(),
            Access::Writable(Assign::cloned(set)),
        )
    }

    pub fn read_only<S: ?Sized + 'static>(name: &'static str) -> Self {
        Self::new(name, ServiceType::of::<S>(), Access::ReadOnly)
    }
}

impl<T> Member<T> {
    /// Leave the member untouched when the registry has no entry.
    pub fn optional(self) -> Self {
        self.with_required(false)
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn service(&self) -> ServiceType {
        self.service
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_writable(&self) -> bool {
        matches!(self.access, Access::Writable(_))
    }

    pub fn access(&self) -> &Access<T> {
        &self.access
    }
}

impl<T> Clone for Member<T> {
    fn clone(&self) -> Self {
        Member {
            name: self.name,
            service: self.service,
            required: self.required,
            access: self.access.clone(),
        }
    }
}

impl<T> fmt::Debug for Member<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Member")
            .field("name", &self.name)
            .field("service", &self.service)
            .field("required", &self.required)
            .field("writable", &self.is_writable())
            .finish()
    }
}

/// Supplies the injectable members of a target type.
pub trait MemberProvider<T> {
    /// Members of `target` eligible for injection, in injection order.
    fn injectable_members(&self, target: &T) -> Vec<Member<T>>;

    /// Storage behind a read-only member.
    fn backing_storage(&self, target: &T, member: &Member<T>) -> Result<Assign<T>, AssignError>;
}

/// Implemented by `#[derive(Injectable)]`: a type that declares its own
/// injectable members.
pub trait Injectable: Sized + 'static {
    fn injectable_members(&self) -> Vec<Member<Self>>;

    fn backing_storage(&self, member: &Member<Self>) -> Result<Assign<Self>, AssignError> {
        Err(AssignError::NoBackingStorage {
            member: member.name(),
        })
    }
}

/// Provider that defers to the target's [`Injectable`] impl.
#[derive(Debug, Clone, Copy, Default)]
pub struct Declared;

impl<T: Injectable> MemberProvider<T> for Declared {
    fn injectable_members(&self, target: &T) -> Vec<Member<T>> {
        target.injectable_members()
    }

    fn backing_storage(&self, target: &T, member: &Member<T>) -> Result<Assign<T>, AssignError> {
        target.backing_storage(member)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Probe {
        shared: Option<Arc<String>>,
        level: u8,
    }

    #[test]
    fn test_shared_assign_keeps_instance() {
        let service: Service = Arc::new(String::from("atlas"));
        let assign = Assign::shared(|probe: &mut Probe, value: Arc<String>| {
            probe.shared = Some(value)
        });

        let mut probe = Probe::default();
        assign.apply(&mut probe, &service).unwrap();

        let expected = Arc::clone(&service).downcast::<String>().unwrap();
        assert!(Arc::ptr_eq(probe.shared.as_ref().unwrap(), &expected));
    }

    #[test]
    fn test_cloned_assign_type_mismatch() {
        let service: Service = Arc::new(7u32);
        let assign = Assign::cloned(|probe: &mut Probe, value: u8| probe.level = value);

        let mut probe = Probe::default();
        let err = assign.apply(&mut probe, &service).unwrap_err();
        assert_eq!(err, AssignError::TypeMismatch { expected: "u8" });
        assert_eq!(probe.level, 0);
    }

    #[test]
    fn test_try_assign_rejects() {
        let service: Service = Arc::new(200u8);
        let assign = Assign::try_cloned(|probe: &mut Probe, value: u8| {
            if value > 100 {
                return Err(AssignError::rejected("level out of range"));
            }
            probe.level = value;
            Ok(())
        });

        let mut probe = Probe::default();
        let err = assign.apply(&mut probe, &service).unwrap_err();
        assert_eq!(err, AssignError::Rejected("level out of range".into()));
    }

    #[test]
    fn test_member_flags() {
        let member = Member::cloned("level", |probe: &mut Probe, value: u8| probe.level = value);
        assert!(member.is_required());
        assert!(member.is_writable());
        assert_eq!(member.service(), ServiceType::of::<u8>());

        let member = Member::<Probe>::read_only::<String>("shared").optional();
        assert!(!member.is_required());
        assert!(!member.is_writable());
        assert_eq!(member.name(), "shared");
    }
}
