//! Pet write operations.
//!
//! Thin validation on top of [`PetRepository`]; persistence details and
//! transactions belong to the storage adapter.

use tracing::{debug, instrument};

use crate::error::{ResolveError, ResolveResult};
use crate::models::{EntityId, Pet, PetInput};
use crate::ports::PetRepository;

/// Create a pet, attaching whichever of `input.tag_ids` exist.
#[instrument(skip(pets, input), fields(owner = input.owner_id))]
pub async fn add_pet(pets: &dyn PetRepository, input: &PetInput) -> ResolveResult<Pet> {
    validate_name(&input.name)?;

    let pet = pets.add_pet(input).await?;
    debug!(pet = pet.id, "Pet created");
    Ok(pet)
}

/// Update a pet. Both `id` and `tag_ids` must be present; an empty tag
/// list keeps the current tags.
#[instrument(skip(pets, input), fields(pet = ?input.id))]
pub async fn update_pet(pets: &dyn PetRepository, input: &PetInput) -> ResolveResult<Pet> {
    let id = input
        .id
        .ok_or_else(|| ResolveError::InvalidArgument("pet id is required for update".into()))?;
    if input.tag_ids.is_none() {
        return Err(ResolveError::InvalidArgument(
            "tagIds is required for update".into(),
        ));
    }
    validate_name(&input.name)?;

    if pets.get_pet(id).await?.is_none() {
        return Err(ResolveError::NotFound(format!("Pet {id}")));
    }

    let pet = pets.update_pet(id, input).await?;
    debug!(pet = pet.id, "Pet updated");
    Ok(pet)
}

/// Delete a pet owned by `user_id`.
#[instrument(skip(pets))]
pub async fn delete_pet(
    pets: &dyn PetRepository,
    user_id: EntityId,
    pet_id: EntityId,
) -> ResolveResult<bool> {
    if !pets.delete_pet(user_id, pet_id).await? {
        return Err(ResolveError::NotFound(format!(
            "Pet {pet_id} owned by user {user_id}"
        )));
    }

    debug!("Pet deleted");
    Ok(true)
}

fn validate_name(name: &str) -> ResolveResult<()> {
    if name.trim().is_empty() {
        return Err(ResolveError::InvalidArgument("name cannot be empty".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Utc;

    use super::*;
    use crate::error::StorageResult;
    use crate::models::Tag;

    #[derive(Default)]
    struct FakePetRepo {
        pets: Mutex<Vec<Pet>>,
    }

    impl FakePetRepo {
        fn with_pet(id: EntityId, owner_id: EntityId) -> Self {
            let now = Utc::now();
            let repo = Self::default();
            repo.pets.lock().unwrap().push(Pet {
                id,
                owner_id,
                name: "Rex".into(),
                created_at: now,
                updated_at: now,
            });
            repo
        }
    }

    #[async_trait]
    impl PetRepository for FakePetRepo {
        async fn get_pet(&self, id: EntityId) -> StorageResult<Option<Pet>> {
            Ok(self.pets.lock().unwrap().iter().find(|p| p.id == id).cloned())
        }

        async fn get_pets_by_ids(&self, _ids: &[EntityId]) -> StorageResult<Vec<Pet>> {
            unimplemented!()
        }

        async fn tag_ids(&self, _pet_id: EntityId) -> StorageResult<Vec<EntityId>> {
            unimplemented!()
        }

        async fn list_tags(&self, _pet_id: EntityId) -> StorageResult<Vec<Tag>> {
            unimplemented!()
        }

        async fn add_pet(&self, input: &PetInput) -> StorageResult<Pet> {
            let now = Utc::now();
            let mut pets = self.pets.lock().unwrap();
            let pet = Pet {
                id: pets.len() as EntityId + 1,
                owner_id: input.owner_id,
                name: input.name.clone(),
                created_at: now,
                updated_at: now,
            };
            pets.push(pet.clone());
            Ok(pet)
        }

        async fn update_pet(&self, id: EntityId, input: &PetInput) -> StorageResult<Pet> {
            let mut pets = self.pets.lock().unwrap();
            let pet = pets.iter_mut().find(|p| p.id == id).unwrap();
            pet.name = input.name.clone();
            pet.owner_id = input.owner_id;
            Ok(pet.clone())
        }

        async fn delete_pet(&self, user_id: EntityId, pet_id: EntityId) -> StorageResult<bool> {
            let mut pets = self.pets.lock().unwrap();
            let before = pets.len();
            pets.retain(|p| !(p.id == pet_id && p.owner_id == user_id));
            Ok(pets.len() < before)
        }
    }

    fn input(id: Option<EntityId>, name: &str, tag_ids: Option<Vec<EntityId>>) -> PetInput {
        PetInput {
            id,
            owner_id: 1,
            name: name.into(),
            tag_ids,
        }
    }

    #[tokio::test]
    async fn add_rejects_blank_name() {
        let repo = FakePetRepo::default();
        let err = add_pet(&repo, &input(None, "  ", None)).await.unwrap_err();
        assert!(matches!(err, ResolveError::InvalidArgument(_)));

        let pet = add_pet(&repo, &input(None, "Rex", Some(vec![]))).await.unwrap();
        assert_eq!(pet.name, "Rex");
    }

    #[tokio::test]
    async fn update_requires_id_and_tags() {
        let repo = FakePetRepo::with_pet(5, 1);

        let err = update_pet(&repo, &input(None, "Max", Some(vec![]))).await.unwrap_err();
        assert!(matches!(err, ResolveError::InvalidArgument(ref m) if m.contains("id")));

        let err = update_pet(&repo, &input(Some(5), "Max", None)).await.unwrap_err();
        assert!(matches!(err, ResolveError::InvalidArgument(ref m) if m.contains("tagIds")));

        let pet = update_pet(&repo, &input(Some(5), "Max", Some(vec![]))).await.unwrap();
        assert_eq!(pet.name, "Max");
    }

    #[tokio::test]
    async fn update_missing_pet_is_not_found() {
        let repo = FakePetRepo::default();
        let err = update_pet(&repo, &input(Some(42), "Max", Some(vec![]))).await.unwrap_err();
        assert!(matches!(err, ResolveError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_is_scoped_to_owner() {
        let repo = FakePetRepo::with_pet(5, 1);

        let err = delete_pet(&repo, 2, 5).await.unwrap_err();
        assert!(matches!(err, ResolveError::NotFound(_)));

        assert!(delete_pet(&repo, 1, 5).await.unwrap());
        assert!(repo.get_pet(5).await.unwrap().is_none());
    }
}
