//! In-memory role store.
//!
//! Backs the integration tests and lets embedders prototype without
//! `PostgreSQL`. Uniqueness is serialized through the dashmap entry API:
//! the `(user, channel, kind)` index entry is held while the row is
//! inserted, so of two concurrent duplicate creates exactly one wins.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

use super::models::{Channel, ChannelRelation, RelationKind, SuperUser, User};
use super::store::{Directory, RoleStore};
use crate::error::{AclError, AclResult};

/// Role store and directory held entirely in process memory.
#[derive(Debug, Default)]
pub struct MemoryRoleStore {
    relations: DashMap<Uuid, ChannelRelation>,
    relation_index: DashMap<(Uuid, Uuid, RelationKind), Uuid>,
    super_users: DashMap<Uuid, SuperUser>,
    super_index: DashMap<Uuid, Uuid>,
    users: DashMap<Uuid, User>,
    username_index: DashMap<String, Uuid>,
    channels: DashMap<Uuid, Channel>,
}

impl MemoryRoleStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a user into the directory.
    pub fn add_user(&self, username: &str, display_name: &str) -> User {
        let user = User {
            id: Uuid::now_v7(),
            username: username.to_string(),
            display_name: display_name.to_string(),
            email: None,
            created_at: Utc::now(),
        };
        self.username_index.insert(user.username.clone(), user.id);
        self.users.insert(user.id, user.clone());
        user
    }

    /// Seed a channel into the directory.
    pub fn add_channel(&self, name: &str) -> Channel {
        let channel = Channel {
            id: Uuid::now_v7(),
            name: name.to_string(),
            created_at: Utc::now(),
        };
        self.channels.insert(channel.id, channel.clone());
        channel
    }
}

#[async_trait]
impl RoleStore for MemoryRoleStore {
    async fn relation_exists(
        &self,
        user_id: Uuid,
        channel_id: Uuid,
        kind: RelationKind,
    ) -> AclResult<bool> {
        Ok(self
            .relation_index
            .contains_key(&(user_id, channel_id, kind)))
    }

    async fn list_relations(
        &self,
        channel_id: Uuid,
        kind: RelationKind,
    ) -> AclResult<Vec<ChannelRelation>> {
        let mut rows: Vec<ChannelRelation> = self
            .relations
            .iter()
            .filter(|r| r.channel_id == channel_id && r.kind == kind)
            .map(|r| r.value().clone())
            .collect();
        // v7 ids are time-ordered; (created_at, id) reproduces insertion order
        rows.sort_by_key(|r| (r.created_at, r.id));
        Ok(rows)
    }

    async fn find_relation(&self, relation_id: Uuid) -> AclResult<Option<ChannelRelation>> {
        Ok(self.relations.get(&relation_id).map(|r| r.value().clone()))
    }

    async fn create_relation(
        &self,
        user_id: Uuid,
        channel_id: Uuid,
        kind: RelationKind,
    ) -> AclResult<ChannelRelation> {
        match self.relation_index.entry((user_id, channel_id, kind)) {
            Entry::Occupied(_) => Err(AclError::AlreadyRelated),
            Entry::Vacant(slot) => {
                let relation = ChannelRelation {
                    id: Uuid::now_v7(),
                    user_id,
                    channel_id,
                    kind,
                    created_at: Utc::now(),
                };
                self.relations.insert(relation.id, relation.clone());
                slot.insert(relation.id);
                Ok(relation)
            }
        }
    }

    async fn delete_relation(&self, relation_id: Uuid) -> AclResult<()> {
        let Some((_, relation)) = self.relations.remove(&relation_id) else {
            return Err(AclError::RelationNotFound);
        };
        self.relation_index.remove_if(
            &(relation.user_id, relation.channel_id, relation.kind),
            |_, id| *id == relation_id,
        );
        Ok(())
    }

    async fn is_super_user(&self, user_id: Uuid) -> AclResult<bool> {
        Ok(self.super_index.contains_key(&user_id))
    }

    async fn list_super_users(&self) -> AclResult<Vec<SuperUser>> {
        let mut rows: Vec<SuperUser> = self
            .super_users
            .iter()
            .map(|r| r.value().clone())
            .collect();
        rows.sort_by_key(|r| (r.created_at, r.id));
        Ok(rows)
    }

    async fn grant_super_user(&self, user_id: Uuid) -> AclResult<SuperUser> {
        match self.super_index.entry(user_id) {
            Entry::Occupied(_) => Err(AclError::AlreadyRelated),
            Entry::Vacant(slot) => {
                let grant = SuperUser {
                    id: Uuid::now_v7(),
                    user_id,
                    created_at: Utc::now(),
                };
                self.super_users.insert(grant.id, grant.clone());
                slot.insert(grant.id);
                Ok(grant)
            }
        }
    }

    async fn revoke_super_user(&self, id: Uuid) -> AclResult<()> {
        let Some((_, grant)) = self.super_users.remove(&id) else {
            return Err(AclError::RelationNotFound);
        };
        self.super_index
            .remove_if(&grant.user_id, |_, grant_id| *grant_id == id);
        Ok(())
    }
}

#[async_trait]
impl Directory for MemoryRoleStore {
    async fn find_user_by_username(&self, username: &str) -> AclResult<Option<User>> {
        let Some(id) = self.username_index.get(username).map(|id| *id) else {
            return Ok(None);
        };
        Ok(self.users.get(&id).map(|u| u.value().clone()))
    }

    async fn find_user_by_id(&self, user_id: Uuid) -> AclResult<Option<User>> {
        Ok(self.users.get(&user_id).map(|u| u.value().clone()))
    }

    async fn channel_exists(&self, channel_id: Uuid) -> AclResult<bool> {
        Ok(self.channels.contains_key(&channel_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_is_unique_per_kind() {
        tokio_test::block_on(async {
            let store = MemoryRoleStore::new();
            let user = store.add_user("alice", "Alice");
            let channel = store.add_channel("general");

            store
                .create_relation(user.id, channel.id, RelationKind::Member)
                .await
                .unwrap();

            // Same kind conflicts, a different kind does not.
            let dup = store
                .create_relation(user.id, channel.id, RelationKind::Member)
                .await;
            assert!(matches!(dup, Err(AclError::AlreadyRelated)));

            store
                .create_relation(user.id, channel.id, RelationKind::Admin)
                .await
                .unwrap();
        });
    }

    #[test]
    fn delete_missing_relation_is_not_found() {
        tokio_test::block_on(async {
            let store = MemoryRoleStore::new();
            let result = store.delete_relation(Uuid::now_v7()).await;
            assert!(matches!(result, Err(AclError::RelationNotFound)));
        });
    }

    #[test]
    fn delete_frees_the_pair_for_reinsertion() {
        tokio_test::block_on(async {
            let store = MemoryRoleStore::new();
            let user = store.add_user("bob", "Bob");
            let channel = store.add_channel("random");

            let relation = store
                .create_relation(user.id, channel.id, RelationKind::Member)
                .await
                .unwrap();
            store.delete_relation(relation.id).await.unwrap();

            assert!(!store
                .relation_exists(user.id, channel.id, RelationKind::Member)
                .await
                .unwrap());
            store
                .create_relation(user.id, channel.id, RelationKind::Member)
                .await
                .unwrap();
        });
    }

    #[test]
    fn list_relations_preserves_insertion_order() {
        tokio_test::block_on(async {
            let store = MemoryRoleStore::new();
            let channel = store.add_channel("ops");
            let mut expected = Vec::new();
            for name in ["u1", "u2", "u3"] {
                let user = store.add_user(name, name);
                let rel = store
                    .create_relation(user.id, channel.id, RelationKind::Member)
                    .await
                    .unwrap();
                expected.push(rel.id);
            }

            let listed: Vec<Uuid> = store
                .list_relations(channel.id, RelationKind::Member)
                .await
                .unwrap()
                .iter()
                .map(|r| r.id)
                .collect();
            assert_eq!(listed, expected);
        });
    }

    #[test]
    fn super_user_grant_is_unique_per_user() {
        tokio_test::block_on(async {
            let store = MemoryRoleStore::new();
            let user = store.add_user("root", "Root");

            let grant = store.grant_super_user(user.id).await.unwrap();
            assert!(store.is_super_user(user.id).await.unwrap());
            assert!(matches!(
                store.grant_super_user(user.id).await,
                Err(AclError::AlreadyRelated)
            ));

            store.revoke_super_user(grant.id).await.unwrap();
            assert!(!store.is_super_user(user.id).await.unwrap());
            assert!(matches!(
                store.revoke_super_user(grant.id).await,
                Err(AclError::RelationNotFound)
            ));
        });
    }
}
