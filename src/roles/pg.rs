//! `PostgreSQL` role store.
//!
//! Runtime queries (no compile-time `DATABASE_URL` required). Uniqueness
//! races on create are settled by the `(user_id, channel_id, kind)` unique
//! constraint: `ON CONFLICT DO NOTHING` returning no row means another
//! writer won.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::error;
use uuid::Uuid;

use super::models::{ChannelRelation, RelationKind, SuperUser, User};
use super::store::{Directory, RoleStore};
use crate::error::{AclError, AclResult};

/// Log and return a database error with context.
///
/// Ensures all database errors are logged with relevant context before
/// being propagated, making production debugging easier.
macro_rules! db_error {
    ($query:expr) => {
        |e| {
            error!(query = $query, error = %e, "Database query failed");
            AclError::Database(e)
        }
    };
    ($query:expr, $($field:tt)*) => {
        |e| {
            error!(query = $query, $($field)*, error = %e, "Database query failed");
            AclError::Database(e)
        }
    };
}

/// Role store and directory backed by `PostgreSQL`.
#[derive(Debug, Clone)]
pub struct PgRoleStore {
    pool: PgPool,
}

impl PgRoleStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Underlying pool, for embedders that share it.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl RoleStore for PgRoleStore {
    async fn relation_exists(
        &self,
        user_id: Uuid,
        channel_id: Uuid,
        kind: RelationKind,
    ) -> AclResult<bool> {
        let result: (bool,) = sqlx::query_as(
            r"
            SELECT EXISTS(
                SELECT 1 FROM channel_relations
                WHERE user_id = $1
                  AND channel_id = $2
                  AND kind = $3
            )
            ",
        )
        .bind(user_id)
        .bind(channel_id)
        .bind(kind)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error!("relation_exists", user_id = %user_id, channel_id = %channel_id))?;

        Ok(result.0)
    }

    async fn list_relations(
        &self,
        channel_id: Uuid,
        kind: RelationKind,
    ) -> AclResult<Vec<ChannelRelation>> {
        sqlx::query_as::<_, ChannelRelation>(
            r"
            SELECT id, user_id, channel_id, kind, created_at
            FROM channel_relations
            WHERE channel_id = $1
              AND kind = $2
            ORDER BY created_at ASC, id ASC
            ",
        )
        .bind(channel_id)
        .bind(kind)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error!("list_relations", channel_id = %channel_id))
    }

    async fn find_relation(&self, relation_id: Uuid) -> AclResult<Option<ChannelRelation>> {
        sqlx::query_as::<_, ChannelRelation>(
            r"
            SELECT id, user_id, channel_id, kind, created_at
            FROM channel_relations
            WHERE id = $1
            ",
        )
        .bind(relation_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error!("find_relation", relation_id = %relation_id))
    }

    async fn create_relation(
        &self,
        user_id: Uuid,
        channel_id: Uuid,
        kind: RelationKind,
    ) -> AclResult<ChannelRelation> {
        let created: Option<ChannelRelation> = sqlx::query_as(
            r"
            INSERT INTO channel_relations (id, user_id, channel_id, kind)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, channel_id, kind) DO NOTHING
            RETURNING id, user_id, channel_id, kind, created_at
            ",
        )
        .bind(Uuid::now_v7())
        .bind(user_id)
        .bind(channel_id)
        .bind(kind)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error!("create_relation", user_id = %user_id, channel_id = %channel_id))?;

        created.ok_or(AclError::AlreadyRelated)
    }

    async fn delete_relation(&self, relation_id: Uuid) -> AclResult<()> {
        let result = sqlx::query("DELETE FROM channel_relations WHERE id = $1")
            .bind(relation_id)
            .execute(&self.pool)
            .await
            .map_err(db_error!("delete_relation", relation_id = %relation_id))?;

        if result.rows_affected() == 0 {
            return Err(AclError::RelationNotFound);
        }
        Ok(())
    }

    async fn is_super_user(&self, user_id: Uuid) -> AclResult<bool> {
        let result: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM super_users WHERE user_id = $1)")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await
                .map_err(db_error!("is_super_user", user_id = %user_id))?;

        Ok(result.0)
    }

    async fn list_super_users(&self) -> AclResult<Vec<SuperUser>> {
        sqlx::query_as::<_, SuperUser>(
            r"
            SELECT id, user_id, created_at
            FROM super_users
            ORDER BY created_at ASC, id ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error!("list_super_users"))
    }

    async fn grant_super_user(&self, user_id: Uuid) -> AclResult<SuperUser> {
        let granted: Option<SuperUser> = sqlx::query_as(
            r"
            INSERT INTO super_users (id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO NOTHING
            RETURNING id, user_id, created_at
            ",
        )
        .bind(Uuid::now_v7())
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error!("grant_super_user", user_id = %user_id))?;

        granted.ok_or(AclError::AlreadyRelated)
    }

    async fn revoke_super_user(&self, id: Uuid) -> AclResult<()> {
        let result = sqlx::query("DELETE FROM super_users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error!("revoke_super_user", id = %id))?;

        if result.rows_affected() == 0 {
            return Err(AclError::RelationNotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl Directory for PgRoleStore {
    async fn find_user_by_username(&self, username: &str) -> AclResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error!("find_user_by_username", username = %username))
    }

    async fn find_user_by_id(&self, user_id: Uuid) -> AclResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error!("find_user_by_id", user_id = %user_id))
    }

    async fn channel_exists(&self, channel_id: Uuid) -> AclResult<bool> {
        let result: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM channels WHERE id = $1)")
                .bind(channel_id)
                .fetch_one(&self.pool)
                .await
                .map_err(db_error!("channel_exists", channel_id = %channel_id))?;

        Ok(result.0)
    }
}
