//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL repositories using Diesel.
//! - **auth**: Argon2 credential hashing and HS256 bearer tokens.
//!
//! Adapters translate between domain types and infrastructure
//! representations and contain no business logic.

pub mod auth;
pub mod persistence;
