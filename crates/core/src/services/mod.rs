//! Core services: connection pagination and pet writes.

pub mod connection;
pub mod pets;
mod relations;

pub use connection::ConnectionPage;
pub use relations::{PetTags, TagPets, UserPets};
