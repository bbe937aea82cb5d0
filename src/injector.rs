//! The injection pass.
//!
//! A pass walks the members a provider reports for a target, in the order the
//! provider reports them, and stops at the first member that fails. Members
//! written before the failure keep their new values.

use std::any::type_name;

use log::{debug, error, warn};

use crate::error::InjectError;
use crate::interfaces::member::{Access, Declared, Injectable, Member, MemberProvider};
use crate::interfaces::registry::{Registry, Service};

/// What to do when an optional member has no registry entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingOptional {
    /// Leave the member at its current value.
    #[default]
    Skip,
    /// Leave the member at its current value and log a warning.
    Warn,
    /// Fail as if the member were required.
    Deny,
}

/// Injects services from a registry into targets.
///
/// Holds no state between calls besides the borrowed registry and the
/// missing-optional policy.
#[derive(Clone, Copy)]
pub struct Injector<'r> {
    registry: &'r dyn Registry,
    missing_optional: MissingOptional,
}

impl<'r> Injector<'r> {
    pub fn new(registry: &'r dyn Registry) -> Self {
        Injector {
            registry,
            missing_optional: MissingOptional::default(),
        }
    }

    pub fn missing_optional(mut self, policy: MissingOptional) -> Self {
        self.missing_optional = policy;
        self
    }

    /// Injects the members `target` declares through [`Injectable`].
    pub fn inject<T: Injectable>(&self, target: &mut T) -> Result<(), InjectError> {
        self.inject_with(&Declared, target)
    }

    /// Injects the members `provider` reports for `target`.
    pub fn inject_with<T, P>(&self, provider: &P, target: &mut T) -> Result<(), InjectError>
    where
        P: MemberProvider<T> + ?Sized,
    {
        let members = provider.injectable_members(target);
        for member in &members {
            self.inject_member(provider, target, member)?;
        }
        Ok(())
    }

    fn inject_member<T, P>(
        &self,
        provider: &P,
        target: &mut T,
        member: &Member<T>,
    ) -> Result<(), InjectError>
    where
        P: MemberProvider<T> + ?Sized,
    {
        let service = match self.registry.try_get(member.service()) {
            Some(service) => service,
            None => return self.missing(member),
        };

        match member.access() {
            Access::Writable(assign) => {
                assign
                    .apply(target, &service)
                    .map_err(|source| InjectError::InjectionFailure {
                        member: member.name(),
                        target: type_name::<T>(),
                        source,
                    })?;
            }
            Access::ReadOnly => self.inject_backing_storage(provider, target, member, &service)?,
        }

        debug!(
            "Injected '{}' into '{}' on '{}'",
            member.service(),
            member.name(),
            type_name::<T>()
        );
        Ok(())
    }

    fn missing<T>(&self, member: &Member<T>) -> Result<(), InjectError> {
        let denied = self.missing_optional == MissingOptional::Deny;
        if member.is_required() || denied {
            return Err(InjectError::MissingService {
                service: member.service().name(),
                member: member.name(),
                target: type_name::<T>(),
            });
        }

        if self.missing_optional == MissingOptional::Warn {
            warn!(
                "No service of type '{}' for optional member '{}' on '{}'",
                member.service(),
                member.name(),
                type_name::<T>()
            );
        } else {
            debug!(
                "Skipping optional member '{}' on '{}'",
                member.name(),
                type_name::<T>()
            );
        }
        Ok(())
    }

    fn inject_backing_storage<T, P>(
        &self,
        provider: &P,
        target: &mut T,
        member: &Member<T>,
        service: &Service,
    ) -> Result<(), InjectError>
    where
        P: MemberProvider<T> + ?Sized,
    {
        let result = provider
            .backing_storage(target, member)
            .and_then(|storage| storage.apply(target, service));

        result.map_err(|source| {
            error!(
                "Unable to inject '{}' into '{}': {source}",
                member.name(),
                type_name::<T>()
            );
            InjectError::InjectionFailure {
                member: member.name(),
                target: type_name::<T>(),
                source,
            }
        })
    }
}

/// Runs one injection pass over `target` with the members it declares.
pub fn inject<R, T>(registry: &R, target: &mut T) -> Result<(), InjectError>
where
    R: Registry,
    T: Injectable,
{
    Injector::new(registry).inject(target)
}
