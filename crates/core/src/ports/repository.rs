//! Port traits for data repositories.
//!
//! These traits define the storage interface used by the domain layer.
//! Implementations live in the infrastructure layer (e.g., `kennel-storage`).

use async_trait::async_trait;

use crate::error::StorageResult;
use crate::models::{EntityId, Node, Pet, PetInput, Tag, User};

// =============================================================================
// Connection Collaborators
// =============================================================================

/// Source of the ordered identifier list behind a connection.
///
/// Implementations must return identifiers only, never full entities.
#[async_trait]
pub trait RelatedIds: Send + Sync {
    /// Relation name used in logs and metrics (e.g. `"user_pets"`).
    fn relation(&self) -> &'static str;

    /// All identifiers related to `parent_id`, in a stable order.
    async fn related_ids(&self, parent_id: EntityId) -> StorageResult<Vec<EntityId>>;
}

/// Batch loader for connection nodes.
#[async_trait]
pub trait NodeLoader<N: Node>: Send + Sync {
    /// Load all nodes with the given identifiers in a single round trip.
    ///
    /// The result may come back in any order; missing rows are simply absent.
    async fn load_nodes(&self, ids: &[EntityId]) -> StorageResult<Vec<N>>;
}

// =============================================================================
// Repository Traits
// =============================================================================

/// Repository for user data.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Get user by ID.
    async fn get_user(&self, id: EntityId) -> StorageResult<Option<User>>;

    /// IDs of the pets owned by a user, in primary-key order.
    async fn pet_ids(&self, user_id: EntityId) -> StorageResult<Vec<EntityId>>;

    /// All pets owned by a user.
    async fn list_pets(&self, user_id: EntityId) -> StorageResult<Vec<Pet>>;
}

/// Repository for pet data.
#[async_trait]
pub trait PetRepository: Send + Sync {
    /// Get pet by ID.
    async fn get_pet(&self, id: EntityId) -> StorageResult<Option<Pet>>;

    /// Batch-load pets by ID. Order is not guaranteed.
    async fn get_pets_by_ids(&self, ids: &[EntityId]) -> StorageResult<Vec<Pet>>;

    /// IDs of the tags attached to a pet, in primary-key order.
    async fn tag_ids(&self, pet_id: EntityId) -> StorageResult<Vec<EntityId>>;

    /// All tags attached to a pet.
    async fn list_tags(&self, pet_id: EntityId) -> StorageResult<Vec<Tag>>;

    /// Create a pet and attach the existing tags among `input.tag_ids`.
    async fn add_pet(&self, input: &PetInput) -> StorageResult<Pet>;

    /// Update a pet's name and owner, replacing its tags when a non-empty
    /// tag list is given. Returns the re-read pet.
    async fn update_pet(&self, id: EntityId, input: &PetInput) -> StorageResult<Pet>;

    /// Delete a pet owned by `user_id` along with its tag links.
    ///
    /// Returns `false` when no such pet exists for that user.
    async fn delete_pet(&self, user_id: EntityId, pet_id: EntityId) -> StorageResult<bool>;
}

/// Repository for tag data.
#[async_trait]
pub trait TagRepository: Send + Sync {
    /// Get tag by its unique title.
    async fn get_tag_by_title(&self, title: &str) -> StorageResult<Option<Tag>>;

    /// Batch-load tags by ID. Order is not guaranteed.
    async fn get_tags_by_ids(&self, ids: &[EntityId]) -> StorageResult<Vec<Tag>>;

    /// IDs of the pets carrying a tag, in primary-key order.
    async fn pet_ids(&self, tag_id: EntityId) -> StorageResult<Vec<EntityId>>;

    /// All pets carrying a tag.
    async fn list_pets(&self, tag_id: EntityId) -> StorageResult<Vec<Pet>>;
}

// =============================================================================
// Composite Repository
// =============================================================================

/// Combined repository access for resolvers.
pub trait Repositories: Send + Sync {
    /// Access the user repository.
    fn users(&self) -> &dyn UserRepository;

    /// Access the pet repository.
    fn pets(&self) -> &dyn PetRepository;

    /// Access the tag repository.
    fn tags(&self) -> &dyn TagRepository;
}
