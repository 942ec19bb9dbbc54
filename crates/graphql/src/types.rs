//! GraphQL type definitions.
//!
//! Node types wrap the domain models and resolve their relations through
//! the `Repositories` handle stored in the schema data.

use std::sync::Arc;

use async_graphql::{
    Context, EmptySubscription, InputObject, Object, Result, Schema, SimpleObject, ID,
};
use chrono::{DateTime, Utc};

use kennel_core::models;
use kennel_core::ports::{self, Repositories};
use kennel_core::services::{connection, ConnectionPage, PetTags, TagPets, UserPets};

use crate::error::{gql_error, storage_error};
use crate::schema::{connection_args, parse_id, Mutation, Query};

/// The Kennel GraphQL schema type.
pub type KennelSchema = Schema<Query, Mutation, EmptySubscription>;

fn repositories<'a>(ctx: &Context<'a>) -> Result<&'a dyn Repositories> {
    Ok(ctx.data::<Arc<dyn Repositories>>()?.as_ref())
}

// -----------------------------------------------------------------------------
// Node Types
// -----------------------------------------------------------------------------

pub struct User(pub models::User);

#[Object]
impl User {
    async fn id(&self) -> ID {
        ID(self.0.id.to_string())
    }

    async fn name(&self) -> &str {
        &self.0.name
    }

    async fn created_at(&self) -> DateTime<Utc> {
        self.0.created_at
    }

    async fn updated_at(&self) -> DateTime<Utc> {
        self.0.updated_at
    }

    /// All pets owned by this user.
    async fn pets<'ctx>(&self, ctx: &Context<'ctx>) -> Result<Vec<Pet>> {
        let pets = repositories(ctx)?
            .users()
            .list_pets(self.0.id)
            .await
            .map_err(storage_error)?;

        Ok(pets.into_iter().map(Pet).collect())
    }

    /// Pets owned by this user, paginated.
    async fn pets_connection<'ctx>(
        &self,
        ctx: &Context<'ctx>,
        first: Option<i32>,
        after: Option<String>,
    ) -> Result<PetConnection> {
        let args = connection_args(first, after)?;
        PetConnection::load(ctx, &UserPets(repositories(ctx)?), self.0.id, &args).await
    }
}

pub struct Pet(pub models::Pet);

#[Object]
impl Pet {
    async fn id(&self) -> ID {
        ID(self.0.id.to_string())
    }

    async fn name(&self) -> &str {
        &self.0.name
    }

    async fn created_at(&self) -> DateTime<Utc> {
        self.0.created_at
    }

    async fn updated_at(&self) -> DateTime<Utc> {
        self.0.updated_at
    }

    /// The user owning this pet.
    async fn owner<'ctx>(&self, ctx: &Context<'ctx>) -> Result<Option<User>> {
        let owner = repositories(ctx)?
            .users()
            .get_user(self.0.owner_id)
            .await
            .map_err(storage_error)?;

        Ok(owner.map(User))
    }

    /// All tags attached to this pet.
    async fn tags<'ctx>(&self, ctx: &Context<'ctx>) -> Result<Vec<Tag>> {
        let tags = repositories(ctx)?
            .pets()
            .list_tags(self.0.id)
            .await
            .map_err(storage_error)?;

        Ok(tags.into_iter().map(Tag).collect())
    }

    /// Tags attached to this pet, paginated.
    async fn tags_connection<'ctx>(
        &self,
        ctx: &Context<'ctx>,
        first: Option<i32>,
        after: Option<String>,
    ) -> Result<TagConnection> {
        let args = connection_args(first, after)?;
        TagConnection::load(ctx, &PetTags(repositories(ctx)?), self.0.id, &args).await
    }
}

pub struct Tag(pub models::Tag);

#[Object]
impl Tag {
    async fn id(&self) -> ID {
        ID(self.0.id.to_string())
    }

    async fn title(&self) -> &str {
        &self.0.title
    }

    async fn created_at(&self) -> DateTime<Utc> {
        self.0.created_at
    }

    async fn updated_at(&self) -> DateTime<Utc> {
        self.0.updated_at
    }

    /// All pets carrying this tag.
    async fn pets<'ctx>(&self, ctx: &Context<'ctx>) -> Result<Vec<Pet>> {
        let pets = repositories(ctx)?
            .tags()
            .list_pets(self.0.id)
            .await
            .map_err(storage_error)?;

        Ok(pets.into_iter().map(Pet).collect())
    }

    /// Pets carrying this tag, paginated.
    async fn pets_connection<'ctx>(
        &self,
        ctx: &Context<'ctx>,
        first: Option<i32>,
        after: Option<String>,
    ) -> Result<PetConnection> {
        let args = connection_args(first, after)?;
        PetConnection::load(ctx, &TagPets(repositories(ctx)?), self.0.id, &args).await
    }
}

// -----------------------------------------------------------------------------
// Input Types
// -----------------------------------------------------------------------------

/// Pet payload for `addPet` and `updatePet`.
#[derive(InputObject)]
#[graphql(name = "PetInput")]
pub struct PetInputObject {
    /// Required for updates, ignored on create.
    pub id: Option<ID>,
    pub owner_id: ID,
    pub name: String,
    pub tag_ids: Option<Vec<ID>>,
}

impl TryFrom<PetInputObject> for models::PetInput {
    type Error = async_graphql::Error;

    fn try_from(input: PetInputObject) -> Result<Self> {
        Ok(Self {
            id: input.id.as_ref().map(parse_id).transpose()?,
            owner_id: parse_id(&input.owner_id)?,
            name: input.name,
            tag_ids: input
                .tag_ids
                .map(|ids| ids.iter().map(parse_id).collect::<Result<Vec<_>>>())
                .transpose()?,
        })
    }
}

// -----------------------------------------------------------------------------
// Connection Types (Relay-style pagination)
// -----------------------------------------------------------------------------

#[derive(SimpleObject)]
pub struct PageInfo {
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub start_cursor: Option<String>,
    pub end_cursor: Option<String>,
}

impl From<ports::PageInfo> for PageInfo {
    fn from(info: ports::PageInfo) -> Self {
        Self {
            has_next_page: info.has_next_page,
            has_previous_page: info.has_previous_page,
            start_cursor: info.start_cursor.map(|c| c.value),
            end_cursor: info.end_cursor.map(|c| c.value),
        }
    }
}

#[derive(SimpleObject)]
pub struct PetEdge {
    pub node: Pet,
    pub cursor: String,
}

#[derive(SimpleObject)]
pub struct TagEdge {
    pub node: Tag,
    pub cursor: String,
}

/// Whether the current connection field selects `edges`.
///
/// Nodes are fetched inside the connection resolver: a failed batch load
/// fails the whole connection field, never just its `edges`.
fn selects_edges(ctx: &Context<'_>) -> bool {
    ctx.look_ahead().field("edges").exists()
}

/// Paginated pets. Nodes are only loaded when `edges` is selected.
pub struct PetConnection {
    page: ConnectionPage,
    edges: Vec<PetEdge>,
}

impl PetConnection {
    async fn load<S>(
        ctx: &Context<'_>,
        source: &S,
        parent_id: models::EntityId,
        args: &ports::ConnectionArgs,
    ) -> Result<Self>
    where
        S: ports::RelatedIds + ports::NodeLoader<models::Pet>,
    {
        let page = connection::open(source, parent_id, args).await.map_err(gql_error)?;

        let edges = if selects_edges(ctx) {
            page.edges::<models::Pet, _>(source)
                .await
                .map_err(gql_error)?
                .into_iter()
                .map(|e| PetEdge {
                    node: Pet(e.node),
                    cursor: e.cursor.value,
                })
                .collect()
        } else {
            Vec::new()
        };

        Ok(Self { page, edges })
    }
}

#[Object]
impl PetConnection {
    async fn edges(&self) -> &[PetEdge] {
        &self.edges
    }

    async fn page_info(&self) -> PageInfo {
        self.page.page_info().into()
    }

    async fn total_count(&self) -> i64 {
        i64::try_from(self.page.total_count()).unwrap_or(i64::MAX)
    }
}

/// Paginated tags. Nodes are only loaded when `edges` is selected.
pub struct TagConnection {
    page: ConnectionPage,
    edges: Vec<TagEdge>,
}

impl TagConnection {
    async fn load<S>(
        ctx: &Context<'_>,
        source: &S,
        parent_id: models::EntityId,
        args: &ports::ConnectionArgs,
    ) -> Result<Self>
    where
        S: ports::RelatedIds + ports::NodeLoader<models::Tag>,
    {
        let page = connection::open(source, parent_id, args).await.map_err(gql_error)?;

        let edges = if selects_edges(ctx) {
            page.edges::<models::Tag, _>(source)
                .await
                .map_err(gql_error)?
                .into_iter()
                .map(|e| TagEdge {
                    node: Tag(e.node),
                    cursor: e.cursor.value,
                })
                .collect()
        } else {
            Vec::new()
        };

        Ok(Self { page, edges })
    }
}

#[Object]
impl TagConnection {
    async fn edges(&self) -> &[TagEdge] {
        &self.edges
    }

    async fn page_info(&self) -> PageInfo {
        self.page.page_info().into()
    }

    async fn total_count(&self) -> i64 {
        i64::try_from(self.page.total_count()).unwrap_or(i64::MAX)
    }
}
