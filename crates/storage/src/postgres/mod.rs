//! PostgreSQL storage adapter.
//!
//! This module implements the repository traits defined in `kennel-core`
//! using PostgreSQL as the backing store.
//!
//! # Architecture
//!
//! - [`Database`] - Connection pool and migrations
//! - [`PgRepositories`] - Composite repository implementing `Repositories` trait
//! - Individual repos: `PgUserRepository`, `PgPetRepository`, `PgTagRepository`
//!
//! # Usage
//!
//! ```ignore
//! let config = DatabaseConfig::for_graphql(&database_url);
//! let db = Database::connect(&config).await?;
//! db.migrate().await?;
//!
//! let repositories = PgRepositories::new(&db);
//! ```

mod database;
mod helpers;
mod pet_repo;
mod tag_repo;
mod user_repo;

pub use database::{Database, DatabaseConfig};
pub use pet_repo::PgPetRepository;
pub use tag_repo::PgTagRepository;
pub use user_repo::PgUserRepository;

use kennel_core::ports::{PetRepository, Repositories, TagRepository, UserRepository};

/// Aggregated PostgreSQL repositories implementing the `Repositories` trait.
pub struct PgRepositories {
    users: PgUserRepository,
    pets: PgPetRepository,
    tags: PgTagRepository,
}

impl PgRepositories {
    /// Create a new repository aggregate from a database connection.
    pub fn new(db: &Database) -> Self {
        Self {
            users: PgUserRepository::new(db),
            pets: PgPetRepository::new(db),
            tags: PgTagRepository::new(db),
        }
    }
}

impl Repositories for PgRepositories {
    fn users(&self) -> &dyn UserRepository {
        &self.users
    }

    fn pets(&self) -> &dyn PetRepository {
        &self.pets
    }

    fn tags(&self) -> &dyn TagRepository {
        &self.tags
    }
}
