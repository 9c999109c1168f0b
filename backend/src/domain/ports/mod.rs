//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driving ports (`IdentityStore`, `RideLedger`, `RatingLedger`,
//! `MessageLedger`) are called by inbound adapters. Driven ports
//! (repositories and `AuthProvider`) are implemented by outbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod auth_provider;
mod identity_store;
mod message_ledger;
mod message_repository;
mod rating_ledger;
mod rating_repository;
mod ride_ledger;
mod ride_repository;
mod user_repository;

#[cfg(test)]
pub use auth_provider::MockAuthProvider;
pub use auth_provider::{AccessToken, AuthProvider, AuthProviderError};
pub use identity_store::{AuthSession, IdentityStore};
pub use message_ledger::MessageLedger;
#[cfg(test)]
pub use message_repository::MockMessageRepository;
pub use message_repository::{MessageRepository, MessageRepositoryError};
pub use rating_ledger::RatingLedger;
#[cfg(test)]
pub use rating_repository::MockRatingRepository;
pub use rating_repository::{RatingRepository, RatingRepositoryError};
pub use ride_ledger::RideLedger;
#[cfg(test)]
pub use ride_repository::MockRideRepository;
pub use ride_repository::{RideRepository, RideRepositoryError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserRepository, UserRepositoryError};
