//! Port for rating persistence.

use async_trait::async_trait;

use crate::domain::Rating;

use super::define_port_error;

define_port_error! {
    /// Errors raised by rating repository adapters.
    pub enum RatingRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "rating repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "rating repository query failed: {message}",
        /// The ride was not `completed` when the insert ran.
        RideNotCompleted { ride_id: String } => "ride {ride_id} is not completed",
    }
}

/// Storage for ratings.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RatingRepository: Send + Sync {
    /// Insert a rating, re-checking under a row lock that the ride is still
    /// completed.
    async fn insert(&self, rating: &Rating) -> Result<(), RatingRepositoryError>;
}
