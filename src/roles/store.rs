//! Storage abstraction for membership relations.

use async_trait::async_trait;
use uuid::Uuid;

use super::models::{ChannelRelation, RelationKind, SuperUser, User};
use crate::error::AclResult;

/// Storage of membership relations.
///
/// Pure existence/uniqueness semantics per relation kind; no cross-relation
/// logic lives behind this trait. Each mutating method is atomic within its
/// backend: a concurrent duplicate `create_relation` for the same
/// `(user, channel, kind)` yields exactly one success, the other call
/// observes [`crate::AclError::AlreadyRelated`].
#[async_trait]
pub trait RoleStore: Send + Sync {
    /// True iff a relation of `kind` exists for the pair.
    async fn relation_exists(
        &self,
        user_id: Uuid,
        channel_id: Uuid,
        kind: RelationKind,
    ) -> AclResult<bool>;

    /// All relations of `kind` for a channel, in insertion order.
    async fn list_relations(
        &self,
        channel_id: Uuid,
        kind: RelationKind,
    ) -> AclResult<Vec<ChannelRelation>>;

    /// Look up a relation by its row id.
    async fn find_relation(&self, relation_id: Uuid) -> AclResult<Option<ChannelRelation>>;

    /// Create a relation of `kind` for the pair.
    ///
    /// Fails with `AlreadyRelated` if one already exists.
    async fn create_relation(
        &self,
        user_id: Uuid,
        channel_id: Uuid,
        kind: RelationKind,
    ) -> AclResult<ChannelRelation>;

    /// Delete a relation by id. Fails with `RelationNotFound` if absent.
    async fn delete_relation(&self, relation_id: Uuid) -> AclResult<()>;

    /// True iff the user holds the global super-user grant.
    async fn is_super_user(&self, user_id: Uuid) -> AclResult<bool>;

    /// All super-user grants, in grant order.
    async fn list_super_users(&self) -> AclResult<Vec<SuperUser>>;

    /// Grant the global super-user designation.
    ///
    /// Fails with `AlreadyRelated` if the user already holds it. Intended
    /// for out-of-band provisioning; no operation in this crate calls it on
    /// behalf of a request.
    async fn grant_super_user(&self, user_id: Uuid) -> AclResult<SuperUser>;

    /// Revoke a super-user grant by id. Fails with `RelationNotFound` if absent.
    async fn revoke_super_user(&self, id: Uuid) -> AclResult<()>;
}

/// External user/channel lookup collaborator.
///
/// Authentication is out of scope; the engine only resolves an already
/// authenticated principal's identifier to a [`User`] and validates foreign
/// keys before creating relations.
#[async_trait]
pub trait Directory: Send + Sync {
    async fn find_user_by_username(&self, username: &str) -> AclResult<Option<User>>;

    async fn find_user_by_id(&self, user_id: Uuid) -> AclResult<Option<User>>;

    async fn channel_exists(&self, channel_id: Uuid) -> AclResult<bool>;
}
