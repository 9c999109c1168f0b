//! PostgreSQL-backed `RatingRepository` implementation using Diesel ORM.
//!
//! The insert locks the ride row `FOR SHARE` and re-reads its status in the
//! same transaction, so a rating can only land on a ride that is completed
//! at commit time.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::ports::{RatingRepository, RatingRepositoryError};
use crate::domain::{Rating, RideStatus};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::NewRatingRow;
use super::pool::{DbPool, PoolError};
use super::schema::{ratings, rides};

/// Diesel-backed implementation of the rating repository port.
#[derive(Clone)]
pub struct DieselRatingRepository {
    pool: DbPool,
}

impl DieselRatingRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> RatingRepositoryError {
    map_basic_pool_error(error, RatingRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> RatingRepositoryError {
    map_basic_diesel_error(
        error,
        RatingRepositoryError::query,
        RatingRepositoryError::connection,
    )
}

fn new_row(rating: &Rating) -> NewRatingRow<'_> {
    NewRatingRow {
        id: *rating.id.as_uuid(),
        ride_id: *rating.ride_id.as_uuid(),
        rater_id: *rating.rater_id.as_uuid(),
        rated_user_id: *rating.rated_user_id.as_uuid(),
        score: i16::from(rating.score.value()),
        comment: rating.comment.as_deref(),
        created_at: rating.created_at,
    }
}

#[async_trait]
impl RatingRepository for DieselRatingRepository {
    async fn insert(&self, rating: &Rating) -> Result<(), RatingRepositoryError> {
        let row = new_row(rating);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let committed = conn
            .transaction(|conn| {
                async move {
                    let status: Option<String> = rides::table
                        .filter(rides::id.eq(row.ride_id))
                        .select(rides::status)
                        .for_share()
                        .first(conn)
                        .await
                        .optional()?;
                    if status.as_deref() != Some(RideStatus::Completed.as_str()) {
                        return Ok(false);
                    }
                    diesel::insert_into(ratings::table)
                        .values(&row)
                        .execute(conn)
                        .await?;
                    Ok::<_, diesel::result::Error>(true)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        if committed {
            Ok(())
        } else {
            Err(RatingRepositoryError::ride_not_completed(
                rating.ride_id.to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rstest::rstest;

    use super::*;
    use crate::domain::{RatingId, RideId, Score, UserId};

    #[rstest]
    #[case(1)]
    #[case(5)]
    fn score_is_stored_as_smallint(#[case] score: i64) {
        let rating = Rating {
            id: RatingId::random(),
            ride_id: RideId::random(),
            rater_id: UserId::random(),
            rated_user_id: UserId::random(),
            score: Score::try_from(score).expect("valid score"),
            comment: None,
            created_at: Utc::now(),
        };
        let row = new_row(&rating);
        assert_eq!(i64::from(row.score), score);
        assert_eq!(row.ride_id, *rating.ride_id.as_uuid());
    }
}
