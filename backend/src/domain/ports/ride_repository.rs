//! Port for ride persistence.

use async_trait::async_trait;

use crate::domain::{Ride, RideId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by ride repository adapters.
    pub enum RideRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "ride repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "ride repository query failed: {message}",
        /// A stored row no longer satisfies the ride invariants.
        Corrupt { ride_id: String, message: String } =>
            "ride {ride_id} could not be decoded: {message}",
        /// The ride changed since it was read; the write was not applied.
        StaleRevision { ride_id: String, expected: i64 } =>
            "ride {ride_id} no longer at revision {expected}",
    }
}

/// Storage for rides.
///
/// Updates are compare-and-set on the revision the caller read, so two
/// writers starting from the same snapshot cannot both commit.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RideRepository: Send + Sync {
    /// Insert a newly scheduled ride.
    async fn insert(&self, ride: &Ride) -> Result<(), RideRepositoryError>;

    /// Fetch a ride by identifier.
    async fn find_by_id(&self, id: &RideId) -> Result<Option<Ride>, RideRepositoryError>;

    /// Rides where `user` is driver or rider.
    async fn list_for_participant(&self, user: &UserId) -> Result<Vec<Ride>, RideRepositoryError>;

    /// Overwrite the ride if the stored revision still equals
    /// `expected_revision`; otherwise fail with `StaleRevision`.
    async fn update(
        &self,
        ride: &Ride,
        expected_revision: i64,
    ) -> Result<(), RideRepositoryError>;
}
