//! Rating handler.
//!
//! ```text
//! POST /ratings {"ride_id":"…","rated_user_id":"…","rating":5,"comment":"Smooth ride"}
//! ```

use actix_web::{post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, Rating, RatingId, RatingSubmission, RideId, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_ride_id, parse_uuid};

/// Stored rating echoed back by `POST /ratings`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RatingResponse {
    pub id: RatingId,
    pub ride_id: RideId,
    pub rater_id: UserId,
    pub rated_user_id: UserId,
    /// 1 to 5.
    pub rating: u8,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Rating> for RatingResponse {
    fn from(rating: Rating) -> Self {
        Self {
            id: rating.id,
            ride_id: rating.ride_id,
            rater_id: rating.rater_id,
            rated_user_id: rating.rated_user_id,
            rating: rating.score.value(),
            comment: rating.comment,
            created_at: rating.created_at,
        }
    }
}

/// Body for `POST /ratings`. `score` is accepted in place of `rating`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct RatingCreateBody {
    pub ride_id: String,
    pub rated_user_id: String,
    #[serde(alias = "score")]
    pub rating: i64,
    #[serde(default)]
    pub comment: Option<String>,
}

impl TryFrom<RatingCreateBody> for RatingSubmission {
    type Error = Error;

    fn try_from(body: RatingCreateBody) -> Result<Self, Self::Error> {
        Ok(Self {
            ride_id: parse_ride_id(&body.ride_id)?,
            rated_user_id: UserId::from_uuid(parse_uuid(
                &body.rated_user_id,
                FieldName::new("rated_user_id"),
            )?),
            score: body.rating,
            comment: body.comment,
        })
    }
}

/// `{message, rating}` envelope for `POST /ratings`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RatingEnvelope {
    pub message: String,
    pub rating: RatingResponse,
}

/// Rate the other participant of a completed ride.
#[utoipa::path(
    post,
    path = "/ratings",
    request_body = RatingCreateBody,
    responses(
        (status = 200, description = "Rating recorded", body = RatingEnvelope),
        (status = 400, description = "Invalid score or ride not completed", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not a participant or wrong subject", body = Error),
        (status = 404, description = "Ride not found", body = Error),
        (status = 503, description = "Storage unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["ratings"],
    operation_id = "submitRating"
)]
#[post("/ratings")]
pub async fn submit_rating(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    payload: web::Json<RatingCreateBody>,
) -> ApiResult<web::Json<RatingEnvelope>> {
    let submission = RatingSubmission::try_from(payload.into_inner())?;
    let rating = state.ratings.submit(caller.id(), submission).await?;
    Ok(web::Json(RatingEnvelope {
        message: "Rating submitted successfully".to_owned(),
        rating: rating.into(),
    }))
}

#[cfg(test)]
#[path = "ratings_tests.rs"]
mod tests;
