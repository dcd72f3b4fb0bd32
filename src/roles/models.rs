//! Role and membership models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// User model, owned by the enclosing application.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub display_name: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Channel model, owned by the enclosing application.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Channel {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Kind tag for a channel-scoped membership relation.
///
/// The three kinds are structurally identical rows; they differ only in the
/// rank they confer, which is decided by the permission resolver, never here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "relation_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RelationKind {
    Member,
    Admin,
    Owner,
}

/// A scoped membership row linking a user to a channel under one kind.
///
/// At most one row per `(user_id, channel_id, kind)`. A user may hold rows
/// of several kinds for the same channel (e.g. a stale Member row left
/// behind by a promotion); the resolver's precedence order masks the lower
/// ones.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ChannelRelation {
    pub id: Uuid,
    pub user_id: Uuid,
    pub channel_id: Uuid,
    pub kind: RelationKind,
    pub created_at: DateTime<Utc>,
}

/// Global super-user grant. At most one row per user; no channel scope.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SuperUser {
    pub id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Effective role of a user for a channel. Derived, never stored.
///
/// Ordered by rank: `NotAllowed < Member < Admin < Owner < SuperUser`.
/// `SuperUser` is a global designation that outranks every channel-scoped
/// role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelRole {
    NotAllowed,
    Member,
    Admin,
    Owner,
    SuperUser,
}

impl ChannelRole {
    /// Relation kind backing this role, if it is channel-scoped.
    #[must_use]
    pub const fn relation_kind(self) -> Option<RelationKind> {
        match self {
            Self::Member => Some(RelationKind::Member),
            Self::Admin => Some(RelationKind::Admin),
            Self::Owner => Some(RelationKind::Owner),
            Self::NotAllowed | Self::SuperUser => None,
        }
    }
}
