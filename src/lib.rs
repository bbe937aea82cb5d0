//! Service injection for engine objects.
//!
//! An [`Injector`] walks the members a target marks for injection, looks up
//! each member's service type in a [`Registry`] and writes the instance it
//! finds into the member. Members that are read-only at the public interface
//! are written through the backing storage their provider exposes.
//!
//! ```rust
//! use std::sync::Arc;
//! use rinject::{Injectable, ServiceRegistry};
//!
//! struct Logger;
//!
//! #[derive(Injectable, Default)]
//! struct Player {
//!     #[inject]
//!     logger: Option<Arc<Logger>>,
//!     #[inject(optional)]
//!     spawn_delay: u32,
//! }
//!
//! let registry = ServiceRegistry::new();
//! registry.insert(Logger);
//!
//! let mut player = Player {
//!     spawn_delay: 30,
//!     ..Player::default()
//! };
//! rinject::inject(&registry, &mut player).unwrap();
//! assert!(player.logger.is_some());
//! assert_eq!(player.spawn_delay, 30);
//! ```

extern crate self as rinject;

pub mod containers;
pub mod error;
pub mod injector;
pub mod interfaces;

pub use containers::basic::ServiceRegistry;
pub use containers::catalog::ProviderCatalog;
pub use containers::members::MemberTable;
pub use error::{AssignError, InjectError};
pub use injector::{inject, Injector, MissingOptional};
pub use interfaces::member::{Access, Assign, Declared, Injectable, Member, MemberProvider};
pub use interfaces::registry::{Registry, Service, ServiceType};

pub use rinject_derive::Injectable;
