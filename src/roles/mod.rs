//! Membership relations and their storage.
//!
//! Four independent relations back the role model: Member, Admin and Owner
//! per channel (one generic row with a kind tag) plus the global SuperUser
//! grant. [`RoleStore`] exposes existence, enumeration and idempotent
//! mutation over them; [`Directory`] resolves users and channels owned by
//! the enclosing application.

pub mod memory;
pub mod models;
pub mod pg;
pub mod store;

pub use memory::MemoryRoleStore;
pub use models::{Channel, ChannelRelation, ChannelRole, RelationKind, SuperUser, User};
pub use pg::PgRoleStore;
pub use store::{Directory, RoleStore};
