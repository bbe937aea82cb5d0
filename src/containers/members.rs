use std::collections::HashMap;
use std::fmt;
use crate::error::AssignError;
use crate::interfaces::member::{Access, Assign, Member, MemberProvider};

/// Hand-registered injectable members of a target type, for types that
/// cannot or should not derive [`Injectable`](crate::Injectable).
///
/// ```rust
/// use std::sync::Arc;
/// use rinject::{Assign, Injector, Member, MemberTable, ServiceRegistry};
///
/// struct Physics;
///
/// #[derive(Default)]
/// struct Body {
///     physics: Option<Arc<Physics>>,
///     mass: f32,
/// }
///
/// impl Body {
///     pub fn physics(&self) -> Option<&Arc<Physics>> {
///         self.physics.as_ref()
///     }
/// }
///
/// let table = MemberTable::new()
///     .read_only(
///         Member::read_only::<Physics>("physics"),
///         Assign::shared(|body: &mut Body, physics: Arc<Physics>| body.physics = Some(physics)),
///     )
///     .member(Member::cloned("mass", |body: &mut Body, mass: f32| body.mass = mass).optional());
///
/// let registry = ServiceRegistry::new();
/// registry.insert(Physics);
///
/// let mut body = Body::default();
/// Injector::new(&registry).inject_with(&table, &mut body).unwrap();
/// assert!(body.physics().is_some());
/// ```
pub struct MemberTable<T> {
    members: Vec<Member<T>>,
    backing: HashMap<&'static str, Assign<T>>,
}

impl<T> MemberTable<T> {
    pub fn new() -> Self {
        MemberTable {
            members: Vec::new(),
            backing: HashMap::new(),
        }
    }

    /// Appends a member. Members are injected in insertion order.
    pub fn member(mut self, member: Member<T>) -> Self {
        self.members.push(member);
        self
    }

    /// Appends a read-only member together with the setter for its storage.
    pub fn read_only(mut self, member: Member<T>, storage: Assign<T>) -> Self {
        self.backing.insert(member.name(), storage);
        self.members.push(member);
        self
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl<T> MemberProvider<T> for MemberTable<T> {
    fn injectable_members(&self, _target: &T) -> Vec<Member<T>> {
        self.members.clone()
    }

    fn backing_storage(&self, _target: &T, member: &Member<T>) -> Result<Assign<T>, AssignError> {
        // Writable members have no separate storage to resolve
        if let Access::Writable(assign) = member.access() {
            return Ok(assign.clone());
        }
        self.backing
            .get(member.name())
            .cloned()
            .ok_or(AssignError::NoBackingStorage {
                member: member.name(),
            })
    }
}

impl<T> Default for MemberTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for MemberTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberTable")
            .field("members", &self.members)
            .field("backing", &self.backing.keys().collect::<Vec<_>>())
            .finish()
    }
}
