//! `ChannelAcl`
//!
//! Role resolution and authorization engine for channel-based collaboration.
//!
//! Users hold per-channel roles (member, admin, owner) plus a global
//! super-user designation. [`permissions::PermissionEngine`] resolves a
//! user's effective role by precedence and [`admin::ChannelAdminOps`] gates
//! every membership mutation on an admin-or-above check.
//!
//! Transport, login flow and session handling live in the embedding
//! application; this crate only decides and mutates role state.

pub mod admin;
pub mod config;
pub mod db;
pub mod error;
pub mod permissions;
pub mod roles;

pub use error::{AclError, AclResult};
pub use roles::ChannelRole;
