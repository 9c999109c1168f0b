//! Post-ride feedback.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{RideId, UserId};

/// Lowest accepted score.
pub const SCORE_MIN: u8 = 1;
/// Highest accepted score.
pub const SCORE_MAX: u8 = 5;
/// Maximum comment length in characters.
pub const COMMENT_MAX: usize = 2000;

/// Validation errors for rating payloads.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RatingValidationError {
    /// Score fell outside `1..=5`.
    #[error("rating must be between {SCORE_MIN} and {SCORE_MAX} (got {value})")]
    ScoreOutOfRange {
        /// Supplied value.
        value: i64,
    },
    /// Comment exceeded [`COMMENT_MAX`].
    #[error("comment must be at most {COMMENT_MAX} characters")]
    CommentTooLong,
}

/// Rating identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = String, format = Uuid)]
pub struct RatingId(Uuid);

impl RatingId {
    /// Generate a new random identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for RatingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Integer score in `1..=5`.
///
/// # Examples
/// ```
/// use carpool_backend::domain::Score;
///
/// assert!(Score::try_from(5_i64).is_ok());
/// assert!(Score::try_from(0_i64).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Score(u8);

impl Score {
    /// Numeric value.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Score {
    type Error = RatingValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .ok()
            .filter(|score| (SCORE_MIN..=SCORE_MAX).contains(score))
            .map(Self)
            .ok_or(RatingValidationError::ScoreOutOfRange { value })
    }
}

/// Trim a comment, mapping blank input to `None`.
///
/// # Errors
/// Returns [`RatingValidationError::CommentTooLong`] above [`COMMENT_MAX`].
pub fn normalise_comment(comment: Option<String>) -> Result<Option<String>, RatingValidationError> {
    match comment.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(trimmed) if trimmed.chars().count() > COMMENT_MAX => {
            Err(RatingValidationError::CommentTooLong)
        }
        Some(trimmed) => Ok(Some(trimmed.to_owned())),
    }
}

/// Unvalidated rating request as received from a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatingSubmission {
    /// Ride being rated.
    pub ride_id: RideId,
    /// Participant receiving the rating.
    pub rated_user_id: UserId,
    /// Raw score; validated after eligibility checks.
    pub score: i64,
    /// Optional free-text comment.
    pub comment: Option<String>,
}

/// Stored rating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rating {
    /// Identifier.
    pub id: RatingId,
    /// Ride the rating belongs to.
    pub ride_id: RideId,
    /// Author.
    pub rater_id: UserId,
    /// Subject.
    pub rated_user_id: UserId,
    /// Score.
    pub score: Score,
    /// Comment.
    pub comment: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}
