//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repositories translate between Diesel rows (`models.rs`, `schema.rs`,
//! both private) and domain types; they hold no business rules beyond the
//! storage-level guards their ports document. Connections come from a
//! `bb8` pool through `diesel-async`.
//!
//! ```ignore
//! use carpool_backend::outbound::persistence::{DbPool, DieselRideRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/carpool")).await?;
//! let rides = DieselRideRepository::new(pool.clone());
//! ```

mod diesel_basic_error_mapping;
mod diesel_message_repository;
mod diesel_rating_repository;
mod diesel_ride_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_message_repository::DieselMessageRepository;
pub use diesel_rating_repository::DieselRatingRepository;
pub use diesel_ride_repository::DieselRideRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
