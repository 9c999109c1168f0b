//! Driving port for the ride lifecycle.

use async_trait::async_trait;

use crate::domain::{Error, Ride, RideDraft, RideId, Role, StatusChange, UserId};

/// Ride creation, listing, matching and status transitions.
#[async_trait]
pub trait RideLedger: Send + Sync {
    /// Schedule a ride with `creator` in the slot for `role`.
    async fn create_ride(
        &self,
        creator: UserId,
        role: Role,
        draft: RideDraft,
    ) -> Result<Ride, Error>;

    /// Rides where `user` is driver or rider.
    async fn list_rides_for(&self, user: UserId) -> Result<Vec<Ride>, Error>;

    /// Read one ride; only participants may see it.
    async fn get_ride(&self, ride_id: RideId, caller: UserId) -> Result<Ride, Error>;

    /// Move a ride along its lifecycle.
    ///
    /// Fails with `not_found`, `forbidden` for non-participants,
    /// `illegal_transition` for non-edges, or `conflict` when another
    /// writer got there first.
    async fn transition(
        &self,
        ride_id: RideId,
        caller: UserId,
        change: StatusChange,
    ) -> Result<Ride, Error>;

    /// Fill the empty slot for `role` with `caller`.
    async fn join(&self, ride_id: RideId, caller: UserId, role: Role) -> Result<Ride, Error>;
}
