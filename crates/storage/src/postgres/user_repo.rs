//! User repository implementation for PostgreSQL.

use async_trait::async_trait;
use sqlx::PgPool;

use kennel_core::error::StorageResult;
use kennel_core::models::{EntityId, Pet, User};
use kennel_core::ports::UserRepository;

use super::database::Database;
use super::helpers::map_sqlx_error;
use super::pet_repo::PetRow;

/// PostgreSQL implementation of UserRepository.
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn get_user(&self, id: EntityId) -> StorageResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(User::from))
    }

    async fn pet_ids(&self, user_id: EntityId) -> StorageResult<Vec<EntityId>> {
        sqlx::query_scalar::<_, i64>("SELECT id FROM pets WHERE owner_id = $1 ORDER BY id")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }

    async fn list_pets(&self, user_id: EntityId) -> StorageResult<Vec<Pet>> {
        let rows = sqlx::query_as::<_, PetRow>(
            r#"
            SELECT id, owner_id, name, created_at, updated_at
            FROM pets
            WHERE owner_id = $1
            ORDER BY id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(Pet::from).collect())
    }
}

/// Database row representation for User.
#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    name: String,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
