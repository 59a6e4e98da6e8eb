//! PostgreSQL repository implementations.
//!
//! Queries are built at runtime with `sqlx::query_as` and mapped through
//! `FromRow` structs; the schema lives in `migrations/`.
//!
//! # Repositories
//!
//! - [`PgLinkRegistry`] - Short links and verification state
//! - [`PgClickRepository`] - Recorded clicks

pub mod pg_click_repository;
pub mod pg_link_registry;

pub use pg_click_repository::PgClickRepository;
pub use pg_link_registry::PgLinkRegistry;
