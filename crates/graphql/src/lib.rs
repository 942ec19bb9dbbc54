//! GraphQL API for Kennel.
//!
//! Exposes users, pets and tags over GraphQL. Relation fields come in two
//! flavours: a plain list (`pets`, `tags`) and a Relay-style connection
//! (`petsConnection`, `tagsConnection`) that loads only the requested
//! window of nodes.
//!
//! ```ignore
//! use kennel_graphql::{build_schema, serve_with_shutdown, ServerConfig};
//!
//! let schema = build_schema(Arc::new(PgRepositories::new(&db)));
//! serve_with_shutdown(schema, ServerConfig::default(), shutdown).await?;
//! ```

mod error;
mod schema;
mod server;
mod types;

pub use schema::{build_schema, Mutation, Query, MAX_QUERY_COMPLEXITY, MAX_QUERY_DEPTH};
pub use server::{router, serve_with_shutdown, ServerConfig};
pub use types::{KennelSchema, PageInfo, Pet, PetConnection, Tag, TagConnection, User};
