//! Domain models for the users/pets/tags graph.
//!
//! These models are storage-agnostic and represent the canonical
//! form of entities within the domain layer.

use chrono::{DateTime, Utc};

/// Primary key of every entity in the graph.
pub type EntityId = i64;

// =============================================================================
// Node Capability
// =============================================================================

/// An entity that can appear as the node of a connection edge.
pub trait Node: Send + Sync {
    /// GraphQL/type name used in logs and error messages.
    const TYPE_NAME: &'static str;

    /// Primary key of this node.
    fn id(&self) -> EntityId;
}

// =============================================================================
// Entities
// =============================================================================

/// A user owning zero or more pets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: EntityId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A pet, owned by exactly one user and tagged with any number of tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pet {
    pub id: EntityId,
    /// Owning user.
    pub owner_id: EntityId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A tag shared between pets. Titles are unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub id: EntityId,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Node for User {
    const TYPE_NAME: &'static str = "User";

    fn id(&self) -> EntityId {
        self.id
    }
}

impl Node for Pet {
    const TYPE_NAME: &'static str = "Pet";

    fn id(&self) -> EntityId {
        self.id
    }
}

impl Node for Tag {
    const TYPE_NAME: &'static str = "Tag";

    fn id(&self) -> EntityId {
        self.id
    }
}

// =============================================================================
// Write Inputs
// =============================================================================

/// Everything needed to create or update a pet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PetInput {
    /// Pet to update. Ignored on create.
    pub id: Option<EntityId>,
    pub owner_id: EntityId,
    pub name: String,
    /// Tags to attach. On update, a non-empty list replaces the tag set.
    pub tag_ids: Option<Vec<EntityId>>,
}
