//! Driving port for post-ride ratings.

use async_trait::async_trait;

use crate::domain::{Error, Rating, RatingSubmission, UserId};

/// Rating submission.
#[async_trait]
pub trait RatingLedger: Send + Sync {
    /// Record `rater`'s rating of the other participant of a completed ride.
    ///
    /// Checks run in order: ride exists (`not_found`), ride completed
    /// (`invalid_state`), rater is a participant (`forbidden`), score in
    /// range (`invalid_request`), rated user is the counterpart
    /// (`forbidden`).
    async fn submit(&self, rater: UserId, submission: RatingSubmission) -> Result<Rating, Error>;
}
