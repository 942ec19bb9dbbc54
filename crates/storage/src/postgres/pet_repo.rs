//! Pet repository implementation for PostgreSQL.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;

use kennel_core::error::{StorageError, StorageResult};
use kennel_core::models::{EntityId, Pet, PetInput, Tag};
use kennel_core::ports::PetRepository;

use super::database::Database;
use super::helpers::{map_sqlx_error, map_tx_error};
use super::tag_repo::TagRow;

const SELECT_PET: &str = "SELECT id, owner_id, name, created_at, updated_at FROM pets";

/// PostgreSQL implementation of PetRepository.
pub struct PgPetRepository {
    pool: PgPool,
}

impl PgPetRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }
}

#[async_trait]
impl PetRepository for PgPetRepository {
    async fn get_pet(&self, id: EntityId) -> StorageResult<Option<Pet>> {
        let row = sqlx::query_as::<_, PetRow>(&format!("{SELECT_PET} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(Pet::from))
    }

    async fn get_pets_by_ids(&self, ids: &[EntityId]) -> StorageResult<Vec<Pet>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, PetRow>(&format!("{SELECT_PET} WHERE id = ANY($1)"))
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(Pet::from).collect())
    }

    async fn tag_ids(&self, pet_id: EntityId) -> StorageResult<Vec<EntityId>> {
        sqlx::query_scalar::<_, i64>(
            "SELECT tag_id FROM pet_tags WHERE pet_id = $1 ORDER BY tag_id",
        )
        .bind(pet_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }

    async fn list_tags(&self, pet_id: EntityId) -> StorageResult<Vec<Tag>> {
        let rows = sqlx::query_as::<_, TagRow>(
            r#"
            SELECT t.id, t.title, t.created_at, t.updated_at
            FROM tags t
            JOIN pet_tags pt ON pt.tag_id = t.id
            WHERE pt.pet_id = $1
            ORDER BY t.id
            "#,
        )
        .bind(pet_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(Tag::from).collect())
    }

    async fn add_pet(&self, input: &PetInput) -> StorageResult<Pet> {
        let mut tx = self.pool.begin().await.map_err(map_tx_error)?;

        let row = sqlx::query_as::<_, PetRow>(
            r#"
            INSERT INTO pets (owner_id, name)
            VALUES ($1, $2)
            RETURNING id, owner_id, name, created_at, updated_at
            "#,
        )
        .bind(input.owner_id)
        .bind(&input.name)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        if let Some(tag_ids) = input.tag_ids.as_deref() {
            let linked = link_existing_tags(&mut tx, row.id, tag_ids).await?;
            debug!(pet = row.id, requested = tag_ids.len(), linked, "Tags attached");
        }

        tx.commit().await.map_err(map_tx_error)?;

        Ok(Pet::from(row))
    }

    async fn update_pet(&self, id: EntityId, input: &PetInput) -> StorageResult<Pet> {
        let mut tx = self.pool.begin().await.map_err(map_tx_error)?;

        let row = sqlx::query_as::<_, PetRow>(
            r#"
            UPDATE pets
            SET name = $1, owner_id = $2, updated_at = NOW()
            WHERE id = $3
            RETURNING id, owner_id, name, created_at, updated_at
            "#,
        )
        .bind(&input.name)
        .bind(input.owner_id)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_sqlx_error)?
        .ok_or_else(|| StorageError::NotFound(format!("Pet {id}")))?;

        // Replace the tag set only when new tags were supplied
        if let Some(tag_ids) = input.tag_ids.as_deref().filter(|ids| !ids.is_empty()) {
            sqlx::query("DELETE FROM pet_tags WHERE pet_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(map_sqlx_error)?;

            link_existing_tags(&mut tx, id, tag_ids).await?;
        }

        tx.commit().await.map_err(map_tx_error)?;

        Ok(Pet::from(row))
    }

    async fn delete_pet(&self, user_id: EntityId, pet_id: EntityId) -> StorageResult<bool> {
        let mut tx = self.pool.begin().await.map_err(map_tx_error)?;

        let owned: Option<i64> =
            sqlx::query_scalar("SELECT id FROM pets WHERE id = $1 AND owner_id = $2 FOR UPDATE")
                .bind(pet_id)
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(map_sqlx_error)?;

        if owned.is_none() {
            tx.rollback().await.map_err(map_tx_error)?;
            return Ok(false);
        }

        sqlx::query("DELETE FROM pet_tags WHERE pet_id = $1")
            .bind(pet_id)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        sqlx::query("DELETE FROM pets WHERE id = $1")
            .bind(pet_id)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_tx_error)?;

        Ok(true)
    }
}

/// Link a pet to every tag in `tag_ids` that exists. Unknown IDs are skipped.
///
/// Returns the number of links created.
async fn link_existing_tags(
    tx: &mut Transaction<'_, Postgres>,
    pet_id: EntityId,
    tag_ids: &[EntityId],
) -> StorageResult<u64> {
    if tag_ids.is_empty() {
        return Ok(0);
    }

    let result = sqlx::query(
        r#"
        INSERT INTO pet_tags (pet_id, tag_id)
        SELECT $1, t.id FROM tags t WHERE t.id = ANY($2)
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(pet_id)
    .bind(tag_ids)
    .execute(&mut **tx)
    .await
    .map_err(map_sqlx_error)?;

    Ok(result.rows_affected())
}

/// Database row representation for Pet.
#[derive(sqlx::FromRow)]
pub(super) struct PetRow {
    id: i64,
    owner_id: i64,
    name: String,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<PetRow> for Pet {
    fn from(row: PetRow) -> Self {
        Self {
            id: row.id,
            owner_id: row.owner_id,
            name: row.name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
