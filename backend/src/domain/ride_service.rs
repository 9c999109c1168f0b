//! Ride ledger service implementing [`RideLedger`].

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::info;

use super::ports::{RideLedger, RideRepository};
use super::repository_errors::map_ride_error;
use super::{Error, JoinError, Ride, RideDraft, RideId, Role, StatusChange, TransitionError, UserId};

pub(crate) const RIDE_NOT_FOUND: &str = "Ride not found";

/// Fetch a ride or fail with `not_found`.
pub(crate) async fn load_ride<R>(rides: &R, ride_id: RideId) -> Result<Ride, Error>
where
    R: RideRepository + ?Sized,
{
    rides
        .find_by_id(&ride_id)
        .await
        .map_err(map_ride_error)?
        .ok_or_else(|| Error::not_found(RIDE_NOT_FOUND))
}

fn map_transition_error(err: TransitionError) -> Error {
    match err {
        TransitionError::Illegal { from, to } => Error::illegal_transition(format!(
            "Cannot transition ride from {from} to {to}"
        ))
        .with_details(json!({ "from": from, "to": to, "allowed": from.successors() })),
        TransitionError::Invalid(invalid) => Error::invalid_request(invalid.to_string()),
    }
}

fn map_join_error(err: JoinError) -> Error {
    match err {
        JoinError::NotScheduled { .. } | JoinError::NoSeatsLeft => {
            Error::invalid_state(err.to_string())
        }
        JoinError::AlreadyParticipant | JoinError::SlotTaken { .. } => {
            Error::conflict(err.to_string())
        }
    }
}

/// Ride ledger backed by a [`RideRepository`].
#[derive(Clone)]
pub struct RideLedgerService<R> {
    rides: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> RideLedgerService<R> {
    /// Create a service over the given repository and clock.
    pub fn new(rides: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { rides, clock }
    }
}

impl<R> RideLedgerService<R>
where
    R: RideRepository,
{
    async fn load_for(&self, ride_id: RideId, caller: UserId) -> Result<Ride, Error> {
        let ride = load_ride(self.rides.as_ref(), ride_id).await?;
        if !ride.is_participant(caller) {
            return Err(Error::forbidden("Not a participant of this ride"));
        }
        Ok(ride)
    }

    async fn save(&self, ride: &Ride, expected_revision: i64) -> Result<(), Error> {
        self.rides
            .update(ride, expected_revision)
            .await
            .map_err(map_ride_error)
    }
}

#[async_trait]
impl<R> RideLedger for RideLedgerService<R>
where
    R: RideRepository,
{
    async fn create_ride(
        &self,
        creator: UserId,
        role: Role,
        draft: RideDraft,
    ) -> Result<Ride, Error> {
        let ride = Ride::schedule(creator, role, draft, self.clock.utc())
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        self.rides.insert(&ride).await.map_err(map_ride_error)?;
        info!(ride_id = %ride.id(), creator = %creator, role = %role, "ride scheduled");
        Ok(ride)
    }

    async fn list_rides_for(&self, user: UserId) -> Result<Vec<Ride>, Error> {
        self.rides
            .list_for_participant(&user)
            .await
            .map_err(map_ride_error)
    }

    async fn get_ride(&self, ride_id: RideId, caller: UserId) -> Result<Ride, Error> {
        self.load_for(ride_id, caller).await
    }

    async fn transition(
        &self,
        ride_id: RideId,
        caller: UserId,
        change: StatusChange,
    ) -> Result<Ride, Error> {
        let mut ride = self.load_for(ride_id, caller).await?;
        let read_revision = ride.revision();
        let from = ride.status();
        ride.transition(change, self.clock.utc())
            .map_err(map_transition_error)?;
        self.save(&ride, read_revision).await?;
        info!(
            ride_id = %ride_id,
            from = %from,
            to = %ride.status(),
            "ride status changed"
        );
        Ok(ride)
    }

    async fn join(&self, ride_id: RideId, caller: UserId, role: Role) -> Result<Ride, Error> {
        let mut ride = load_ride(self.rides.as_ref(), ride_id).await?;
        let read_revision = ride.revision();
        ride.join(caller, role, self.clock.utc())
            .map_err(map_join_error)?;
        self.save(&ride, read_revision).await?;
        info!(ride_id = %ride_id, user_id = %caller, role = %role, "ride joined");
        Ok(ride)
    }
}

#[cfg(test)]
#[path = "ride_service_tests.rs"]
mod tests;
