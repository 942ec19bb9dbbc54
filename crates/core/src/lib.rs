//! Core domain layer for the Kennel graph API.
//!
//! This crate contains the domain models, port traits (interfaces), and
//! services for a small users/pets/tags graph. It follows hexagonal
//! architecture principles - this is the innermost layer with no
//! dependencies on infrastructure.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      kennel (binary)                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │          kennel-graphql          │      kennel-storage      │
//! │        (API, async-graphql)      │       (PostgreSQL)       │
//! ├──────────────────────────────────┴──────────────────────────┤
//! │                      kennel-core  ← YOU ARE HERE            │
//! │               (models, ports, services)                     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`models`] - Domain models (User, Pet, Tag) and the [`models::Node`] capability
//! - [`ports`] - Repository traits, cursor codec and pagination window
//! - [`services`] - Connection resolver, relation adapters, pet writes
//! - [`error`] - Domain error types
//! - [`metrics`] - Metrics definitions
//!
//! # Connection Resolution
//!
//! 1. Fetch the ordered identifier list for the parent ([`ports::RelatedIds`])
//! 2. Compute the `[from, to)` window from `first`/`after` ([`ports::Window`])
//! 3. Answer `totalCount` and `pageInfo` from the identifiers alone
//! 4. Batch-load only the windowed nodes ([`ports::NodeLoader`]) when edges are requested

pub mod error;
pub mod metrics;
pub mod models;
pub mod ports;
pub mod services;
