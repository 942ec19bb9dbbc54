//! Relation adapters binding repositories to the connection resolver.
//!
//! Each adapter borrows the request's [`Repositories`] handle and pairs one
//! identifier query with the matching batch loader.

use async_trait::async_trait;

use crate::error::StorageResult;
use crate::models::{EntityId, Pet, Tag};
use crate::ports::{NodeLoader, RelatedIds, Repositories};

/// Pets owned by a user.
pub struct UserPets<'a>(pub &'a dyn Repositories);

/// Tags attached to a pet.
pub struct PetTags<'a>(pub &'a dyn Repositories);

/// Pets carrying a tag.
pub struct TagPets<'a>(pub &'a dyn Repositories);

#[async_trait]
impl RelatedIds for UserPets<'_> {
    fn relation(&self) -> &'static str {
        "user_pets"
    }

    async fn related_ids(&self, parent_id: EntityId) -> StorageResult<Vec<EntityId>> {
        self.0.users().pet_ids(parent_id).await
    }
}

#[async_trait]
impl NodeLoader<Pet> for UserPets<'_> {
    async fn load_nodes(&self, ids: &[EntityId]) -> StorageResult<Vec<Pet>> {
        self.0.pets().get_pets_by_ids(ids).await
    }
}

#[async_trait]
impl RelatedIds for PetTags<'_> {
    fn relation(&self) -> &'static str {
        "pet_tags"
    }

    async fn related_ids(&self, parent_id: EntityId) -> StorageResult<Vec<EntityId>> {
        self.0.pets().tag_ids(parent_id).await
    }
}

#[async_trait]
impl NodeLoader<Tag> for PetTags<'_> {
    async fn load_nodes(&self, ids: &[EntityId]) -> StorageResult<Vec<Tag>> {
        self.0.tags().get_tags_by_ids(ids).await
    }
}

#[async_trait]
impl RelatedIds for TagPets<'_> {
    fn relation(&self) -> &'static str {
        "tag_pets"
    }

    async fn related_ids(&self, parent_id: EntityId) -> StorageResult<Vec<EntityId>> {
        self.0.tags().pet_ids(parent_id).await
    }
}

#[async_trait]
impl NodeLoader<Pet> for TagPets<'_> {
    async fn load_nodes(&self, ids: &[EntityId]) -> StorageResult<Vec<Pet>> {
        self.0.pets().get_pets_by_ids(ids).await
    }
}
