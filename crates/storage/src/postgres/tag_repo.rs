//! Tag repository implementation for PostgreSQL.

use async_trait::async_trait;
use sqlx::PgPool;

use kennel_core::error::StorageResult;
use kennel_core::models::{EntityId, Pet, Tag};
use kennel_core::ports::TagRepository;

use super::database::Database;
use super::helpers::map_sqlx_error;
use super::pet_repo::PetRow;

/// PostgreSQL implementation of TagRepository.
pub struct PgTagRepository {
    pool: PgPool,
}

impl PgTagRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }
}

#[async_trait]
impl TagRepository for PgTagRepository {
    async fn get_tag_by_title(&self, title: &str) -> StorageResult<Option<Tag>> {
        let row = sqlx::query_as::<_, TagRow>(
            "SELECT id, title, created_at, updated_at FROM tags WHERE title = $1",
        )
        .bind(title)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(Tag::from))
    }

    async fn get_tags_by_ids(&self, ids: &[EntityId]) -> StorageResult<Vec<Tag>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, TagRow>(
            "SELECT id, title, created_at, updated_at FROM tags WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(Tag::from).collect())
    }

    async fn pet_ids(&self, tag_id: EntityId) -> StorageResult<Vec<EntityId>> {
        sqlx::query_scalar::<_, i64>(
            "SELECT pet_id FROM pet_tags WHERE tag_id = $1 ORDER BY pet_id",
        )
        .bind(tag_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }

    async fn list_pets(&self, tag_id: EntityId) -> StorageResult<Vec<Pet>> {
        let rows = sqlx::query_as::<_, PetRow>(
            r#"
            SELECT p.id, p.owner_id, p.name, p.created_at, p.updated_at
            FROM pets p
            JOIN pet_tags pt ON pt.pet_id = p.id
            WHERE pt.tag_id = $1
            ORDER BY p.id
            "#,
        )
        .bind(tag_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(Pet::from).collect())
    }
}

/// Database row representation for Tag.
#[derive(sqlx::FromRow)]
pub(super) struct TagRow {
    id: i64,
    title: String,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<TagRow> for Tag {
    fn from(row: TagRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
