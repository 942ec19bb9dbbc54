//! GraphQL schema definition.
//!
//! Query and mutation roots for users, pets and tags. Relation fields on
//! the node types are paginated through the connection resolver in
//! `kennel-core`.

use std::sync::Arc;

use async_graphql::{Context, EmptySubscription, Object, Result, Schema, ID};

use kennel_core::error::ResolveError;
use kennel_core::models::{EntityId, PetInput};
use kennel_core::ports::{ConnectionArgs, Repositories};
use kennel_core::services::pets;

use crate::error::{gql_error, storage_error};
use crate::types::{KennelSchema, Pet, PetInputObject, Tag, User};

// -----------------------------------------------------------------------------
// Schema Configuration
// -----------------------------------------------------------------------------

/// Maximum query depth to prevent deeply nested queries (DoS protection).
/// Note: GraphQL introspection requires depth ~13, so we use 15 to allow it.
pub const MAX_QUERY_DEPTH: usize = 15;

/// Maximum query complexity score (DoS protection).
/// Each field has a default complexity of 1, nested objects multiply.
pub const MAX_QUERY_COMPLEXITY: usize = 500;

/// Maximum length for a tag title argument.
const MAX_TITLE_LENGTH: usize = 128;

// -----------------------------------------------------------------------------
// Schema Builder
// -----------------------------------------------------------------------------

/// Build the Kennel schema over the given repositories.
///
/// Includes query depth and complexity limits for DoS protection.
pub fn build_schema<R: Repositories + 'static>(repositories: Arc<R>) -> KennelSchema {
    let repos: Arc<dyn Repositories> = repositories;
    Schema::build(Query, Mutation, EmptySubscription)
        .data(repos)
        .limit_depth(MAX_QUERY_DEPTH)
        .limit_complexity(MAX_QUERY_COMPLEXITY)
        .finish()
}

// -----------------------------------------------------------------------------
// Query Root
// -----------------------------------------------------------------------------

#[derive(Default)]
pub struct Query;

#[Object]
impl Query {
    /// Get a user by ID.
    async fn get_user<'ctx>(&self, ctx: &Context<'ctx>, id: ID) -> Result<Option<User>> {
        let repos = ctx.data::<Arc<dyn Repositories>>()?;

        let user = repos
            .users()
            .get_user(parse_id(&id)?)
            .await
            .map_err(storage_error)?;
        Ok(user.map(User))
    }

    /// Get a pet by ID.
    async fn get_pet<'ctx>(&self, ctx: &Context<'ctx>, id: ID) -> Result<Option<Pet>> {
        let repos = ctx.data::<Arc<dyn Repositories>>()?;

        let pet = repos
            .pets()
            .get_pet(parse_id(&id)?)
            .await
            .map_err(storage_error)?;
        Ok(pet.map(Pet))
    }

    /// Get a tag by its title.
    async fn get_tag<'ctx>(&self, ctx: &Context<'ctx>, title: String) -> Result<Option<Tag>> {
        validate_title(&title)?;
        let repos = ctx.data::<Arc<dyn Repositories>>()?;

        let tag = repos
            .tags()
            .get_tag_by_title(&title)
            .await
            .map_err(storage_error)?;
        Ok(tag.map(Tag))
    }
}

// -----------------------------------------------------------------------------
// Mutation Root
// -----------------------------------------------------------------------------

#[derive(Default)]
pub struct Mutation;

#[Object]
impl Mutation {
    /// Create a pet. Unknown tag IDs are ignored.
    async fn add_pet<'ctx>(&self, ctx: &Context<'ctx>, pet: PetInputObject) -> Result<Pet> {
        let repos = ctx.data::<Arc<dyn Repositories>>()?;
        let input = PetInput::try_from(pet)?;

        let pet = pets::add_pet(repos.pets(), &input)
            .await
            .map_err(gql_error)?;
        Ok(Pet(pet))
    }

    /// Update a pet. `id` and `tagIds` are required; an empty `tagIds`
    /// keeps the current tags.
    async fn update_pet<'ctx>(&self, ctx: &Context<'ctx>, pet: PetInputObject) -> Result<Pet> {
        let repos = ctx.data::<Arc<dyn Repositories>>()?;
        let input = PetInput::try_from(pet)?;

        let pet = pets::update_pet(repos.pets(), &input)
            .await
            .map_err(gql_error)?;
        Ok(Pet(pet))
    }

    /// Delete a pet owned by the given user.
    async fn delete_pet<'ctx>(
        &self,
        ctx: &Context<'ctx>,
        user_id: ID,
        pet_id: ID,
    ) -> Result<bool> {
        let repos = ctx.data::<Arc<dyn Repositories>>()?;

        pets::delete_pet(repos.pets(), parse_id(&user_id)?, parse_id(&pet_id)?)
            .await
            .map_err(gql_error)
    }
}

// -----------------------------------------------------------------------------
// Helpers & Validation
// -----------------------------------------------------------------------------

/// Parse a GraphQL ID as a decimal entity identifier.
pub(crate) fn parse_id(id: &ID) -> Result<EntityId> {
    id.as_str()
        .parse::<EntityId>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| {
            gql_error(ResolveError::InvalidArgument(format!(
                "invalid ID {:?}: expected a positive integer",
                id.as_str()
            )))
        })
}

/// Build connection arguments from the raw GraphQL values.
///
/// A negative `first` is rejected; zero is allowed and yields an empty page.
pub(crate) fn connection_args(first: Option<i32>, after: Option<String>) -> Result<ConnectionArgs> {
    let first = first
        .map(|n| {
            usize::try_from(n).map_err(|_| {
                gql_error(ResolveError::InvalidArgument(format!(
                    "first must be non-negative, got {n}"
                )))
            })
        })
        .transpose()?;

    Ok(ConnectionArgs::new(first, after))
}

/// Validate a tag title argument.
fn validate_title(title: &str) -> Result<()> {
    if title.is_empty() {
        return Err(gql_error(ResolveError::InvalidArgument(
            "title cannot be empty".into(),
        )));
    }
    if title.len() > MAX_TITLE_LENGTH {
        return Err(gql_error(ResolveError::InvalidArgument(format!(
            "title too long: maximum {MAX_TITLE_LENGTH} characters allowed"
        ))));
    }
    Ok(())
}
