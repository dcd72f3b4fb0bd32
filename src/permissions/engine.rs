//! Store-backed permission engine.
//!
//! Captures a [`RoleSnapshot`] from the [`RoleStore`] and delegates every
//! decision to the pure resolver.

use std::sync::Arc;

use uuid::Uuid;

use super::resolver::{self, RoleSnapshot};
use crate::error::AclResult;
use crate::roles::{ChannelRole, RelationKind, RoleStore};

/// Resolves effective roles and authorizes actions against a store.
///
/// Stateless over a shared store; cloning is cheap and clones observe the
/// same relations.
#[derive(Debug)]
pub struct PermissionEngine<S> {
    store: Arc<S>,
}

impl<S> Clone for PermissionEngine<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: RoleStore> PermissionEngine<S> {
    #[must_use]
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Capture the existence of all four relations for the pair.
    ///
    /// Four point queries; reads may observe slightly stale data, which
    /// only affects display, never the atomicity of a concurrent mutation.
    #[tracing::instrument(skip(self))]
    pub async fn snapshot(&self, user_id: Uuid, channel_id: Uuid) -> AclResult<RoleSnapshot> {
        Ok(RoleSnapshot {
            super_user: self.store.is_super_user(user_id).await?,
            owner: self
                .store
                .relation_exists(user_id, channel_id, RelationKind::Owner)
                .await?,
            admin: self
                .store
                .relation_exists(user_id, channel_id, RelationKind::Admin)
                .await?,
            member: self
                .store
                .relation_exists(user_id, channel_id, RelationKind::Member)
                .await?,
        })
    }

    /// Effective role of the user for the channel, by precedence.
    #[tracing::instrument(skip(self))]
    pub async fn resolve_role(&self, user_id: Uuid, channel_id: Uuid) -> AclResult<ChannelRole> {
        let snapshot = self.snapshot(user_id, channel_id).await?;
        Ok(resolver::resolve_role(&snapshot))
    }

    /// Exact-relation role gate; see [`resolver::authorize`].
    #[tracing::instrument(skip(self))]
    pub async fn authorize(
        &self,
        user_id: Uuid,
        channel_id: Uuid,
        required: ChannelRole,
    ) -> AclResult<bool> {
        let snapshot = self.snapshot(user_id, channel_id).await?;
        Ok(resolver::authorize(&snapshot, required))
    }

    /// True iff the user's resolved role is Admin, Owner or SuperUser.
    #[tracing::instrument(skip(self))]
    pub async fn is_admin_or_above(&self, user_id: Uuid, channel_id: Uuid) -> AclResult<bool> {
        let snapshot = self.snapshot(user_id, channel_id).await?;
        Ok(resolver::is_admin_or_above(&snapshot))
    }

    /// Shared store handle.
    #[must_use]
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::MemoryRoleStore;

    #[tokio::test]
    async fn snapshot_reflects_store_rows() {
        let store = Arc::new(MemoryRoleStore::new());
        let engine = PermissionEngine::new(Arc::clone(&store));
        let user = store.add_user("alice", "Alice");
        let channel = store.add_channel("general");

        assert_eq!(
            engine.snapshot(user.id, channel.id).await.unwrap(),
            RoleSnapshot::default()
        );

        store
            .create_relation(user.id, channel.id, RelationKind::Admin)
            .await
            .unwrap();
        let snap = engine.snapshot(user.id, channel.id).await.unwrap();
        assert!(snap.admin);
        assert!(!snap.member && !snap.owner && !snap.super_user);
    }

    #[tokio::test]
    async fn resolve_role_masks_stale_member_row() {
        let store = Arc::new(MemoryRoleStore::new());
        let engine = PermissionEngine::new(Arc::clone(&store));
        let user = store.add_user("bob", "Bob");
        let channel = store.add_channel("general");

        store
            .create_relation(user.id, channel.id, RelationKind::Member)
            .await
            .unwrap();
        store
            .create_relation(user.id, channel.id, RelationKind::Admin)
            .await
            .unwrap();

        assert_eq!(
            engine.resolve_role(user.id, channel.id).await.unwrap(),
            ChannelRole::Admin
        );
        assert!(engine.is_admin_or_above(user.id, channel.id).await.unwrap());
        // Exact-match gate still sees the member row.
        assert!(engine
            .authorize(user.id, channel.id, ChannelRole::Member)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn global_super_user_outranks_without_channel_rows() {
        let store = Arc::new(MemoryRoleStore::new());
        let engine = PermissionEngine::new(Arc::clone(&store));
        let user = store.add_user("root", "Root");
        let channel = store.add_channel("ops");

        store.grant_super_user(user.id).await.unwrap();

        assert_eq!(
            engine.resolve_role(user.id, channel.id).await.unwrap(),
            ChannelRole::SuperUser
        );
        assert!(engine.is_admin_or_above(user.id, channel.id).await.unwrap());
        assert!(!engine
            .authorize(user.id, channel.id, ChannelRole::Member)
            .await
            .unwrap());
    }
}
