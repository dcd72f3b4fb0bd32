//! Permission engine.
//!
//! [`resolver`] holds the pure precedence and exact-match logic;
//! [`engine`] binds it to a [`crate::roles::RoleStore`].

pub mod engine;
pub mod resolver;

pub use engine::PermissionEngine;
pub use resolver::{authorize, is_admin_or_above, resolve_role, RoleSnapshot, PRECEDENCE};
