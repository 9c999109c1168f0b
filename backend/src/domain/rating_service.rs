//! Rating ledger service implementing [`RatingLedger`].
//!
//! Eligibility is checked against the ride as read; the repository re-checks
//! the completed status when it writes, so a ride cannot be rated while a
//! concurrent transition is reverting it.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use super::ports::{RatingLedger, RatingRepository, RideRepository};
use super::repository_errors::map_rating_error;
use super::ride_service::load_ride;
use super::{
    Error, Rating, RatingId, RatingSubmission, RideStatus, Score, UserId, normalise_comment,
};

/// Rating ledger backed by ride and rating repositories.
#[derive(Clone)]
pub struct RatingLedgerService<R, G> {
    rides: Arc<R>,
    ratings: Arc<G>,
    clock: Arc<dyn Clock>,
}

impl<R, G> RatingLedgerService<R, G> {
    /// Create a service over the given repositories and clock.
    pub fn new(rides: Arc<R>, ratings: Arc<G>, clock: Arc<dyn Clock>) -> Self {
        Self {
            rides,
            ratings,
            clock,
        }
    }
}

#[async_trait]
impl<R, G> RatingLedger for RatingLedgerService<R, G>
where
    R: RideRepository,
    G: RatingRepository,
{
    async fn submit(&self, rater: UserId, submission: RatingSubmission) -> Result<Rating, Error> {
        let RatingSubmission {
            ride_id,
            rated_user_id,
            score,
            comment,
        } = submission;
        let ride = load_ride(self.rides.as_ref(), ride_id).await?;
        if ride.status() != RideStatus::Completed {
            return Err(Error::invalid_state("Can only rate completed rides"));
        }
        if !ride.is_participant(rater) {
            return Err(Error::forbidden("Not authorized to rate this ride"));
        }
        let score = Score::try_from(score).map_err(|err| Error::invalid_request(err.to_string()))?;
        let comment =
            normalise_comment(comment).map_err(|err| Error::invalid_request(err.to_string()))?;
        if ride.counterpart_of(rater) != Some(rated_user_id) {
            return Err(Error::forbidden(
                "Can only rate the other participant of this ride",
            ));
        }

        let rating = Rating {
            id: RatingId::random(),
            ride_id,
            rater_id: rater,
            rated_user_id,
            score,
            comment,
            created_at: self.clock.utc(),
        };
        self.ratings
            .insert(&rating)
            .await
            .map_err(map_rating_error)?;
        info!(
            rating_id = %rating.id,
            ride_id = %ride_id,
            score = rating.score.value(),
            "rating recorded"
        );
        Ok(rating)
    }
}

#[cfg(test)]
#[path = "rating_service_tests.rs"]
mod tests;
