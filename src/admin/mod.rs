//! Channel administration use-cases.
//!
//! Every operation resolves the acting username through the directory and
//! passes the admin-or-above gate before touching the store. Gate failures
//! are [`AclError::Forbidden`] with no mutation attempted; the error never
//! says which role the actor actually holds, and an unknown acting
//! username fails the same way (fail-closed).

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::error::{AclError, AclResult};
use crate::permissions::PermissionEngine;
use crate::roles::{ChannelRelation, Directory, RelationKind, RoleStore, User};

/// Mutating channel membership/administration operations.
#[derive(Debug)]
pub struct ChannelAdminOps<S> {
    store: Arc<S>,
    engine: PermissionEngine<S>,
}

impl<S> Clone for ChannelAdminOps<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            engine: self.engine.clone(),
        }
    }
}

impl<S: RoleStore + Directory> ChannelAdminOps<S> {
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self {
            engine: PermissionEngine::new(Arc::clone(&store)),
            store,
        }
    }

    /// The permission engine bound to the same store.
    #[must_use]
    pub const fn engine(&self) -> &PermissionEngine<S> {
        &self.engine
    }

    /// Member relations for the channel, in insertion order.
    #[tracing::instrument(skip(self))]
    pub async fn list_members(
        &self,
        actor: &str,
        channel_id: Uuid,
    ) -> AclResult<Vec<ChannelRelation>> {
        self.list_relations(actor, channel_id, RelationKind::Member)
            .await
    }

    /// Add a user as a channel member.
    #[tracing::instrument(skip(self))]
    pub async fn add_member(
        &self,
        actor: &str,
        channel_id: Uuid,
        new_user_id: Uuid,
    ) -> AclResult<ChannelRelation> {
        self.add_relation(actor, channel_id, new_user_id, RelationKind::Member)
            .await
    }

    /// Remove a member relation by its row id.
    #[tracing::instrument(skip(self))]
    pub async fn remove_member(
        &self,
        actor: &str,
        channel_id: Uuid,
        relation_id: Uuid,
    ) -> AclResult<()> {
        self.remove_relation(actor, channel_id, relation_id, RelationKind::Member)
            .await
    }

    /// Admin relations for the channel, in insertion order.
    #[tracing::instrument(skip(self))]
    pub async fn list_admins(
        &self,
        actor: &str,
        channel_id: Uuid,
    ) -> AclResult<Vec<ChannelRelation>> {
        self.list_relations(actor, channel_id, RelationKind::Admin)
            .await
    }

    /// Add a user as a channel admin.
    #[tracing::instrument(skip(self))]
    pub async fn add_admin(
        &self,
        actor: &str,
        channel_id: Uuid,
        user_id: Uuid,
    ) -> AclResult<ChannelRelation> {
        self.add_relation(actor, channel_id, user_id, RelationKind::Admin)
            .await
    }

    /// Remove an admin relation by its row id.
    #[tracing::instrument(skip(self))]
    pub async fn remove_admin(
        &self,
        actor: &str,
        channel_id: Uuid,
        relation_id: Uuid,
    ) -> AclResult<()> {
        self.remove_relation(actor, channel_id, relation_id, RelationKind::Admin)
            .await
    }

    /// Resolve the actor and require admin-or-above for the channel.
    ///
    /// An unknown username is indistinguishable from an insufficient role.
    async fn require_admin_or_above(&self, actor: &str, channel_id: Uuid) -> AclResult<User> {
        let Some(user) = self.store.find_user_by_username(actor).await? else {
            return Err(AclError::Forbidden);
        };
        if self.engine.is_admin_or_above(user.id, channel_id).await? {
            Ok(user)
        } else {
            Err(AclError::Forbidden)
        }
    }

    async fn list_relations(
        &self,
        actor: &str,
        channel_id: Uuid,
        kind: RelationKind,
    ) -> AclResult<Vec<ChannelRelation>> {
        self.require_admin_or_above(actor, channel_id).await?;
        self.store.list_relations(channel_id, kind).await
    }

    async fn add_relation(
        &self,
        actor: &str,
        channel_id: Uuid,
        target_user_id: Uuid,
        kind: RelationKind,
    ) -> AclResult<ChannelRelation> {
        let acting = self.require_admin_or_above(actor, channel_id).await?;

        if self.store.find_user_by_id(target_user_id).await?.is_none() {
            return Err(AclError::UserNotFound);
        }
        if !self.store.channel_exists(channel_id).await? {
            return Err(AclError::ChannelNotFound);
        }

        // The store enforces uniqueness atomically as well; this check just
        // reports the conflict without attempting the insert.
        if self
            .store
            .relation_exists(target_user_id, channel_id, kind)
            .await?
        {
            return Err(AclError::AlreadyRelated);
        }

        let relation = self
            .store
            .create_relation(target_user_id, channel_id, kind)
            .await?;
        info!(
            actor = %acting.username,
            user_id = %target_user_id,
            channel_id = %channel_id,
            ?kind,
            "Channel relation created"
        );
        Ok(relation)
    }

    async fn remove_relation(
        &self,
        actor: &str,
        channel_id: Uuid,
        relation_id: Uuid,
        kind: RelationKind,
    ) -> AclResult<()> {
        let acting = self.require_admin_or_above(actor, channel_id).await?;

        // A relation id belonging to another channel or kind is treated as
        // absent, so ids cannot be replayed across channels.
        let relation = self
            .store
            .find_relation(relation_id)
            .await?
            .filter(|r| r.channel_id == channel_id && r.kind == kind)
            .ok_or(AclError::RelationNotFound)?;

        self.store.delete_relation(relation.id).await?;
        info!(
            actor = %acting.username,
            user_id = %relation.user_id,
            channel_id = %channel_id,
            ?kind,
            "Channel relation removed"
        );
        Ok(())
    }
}
