//! Ride lifecycle domain types.
//!
//! A ride moves through `scheduled → active → completed`, or to `cancelled`
//! from either non-terminal state. [`RideStatus`] owns the edge set;
//! [`Ride`] enforces participant, seat and timestamp invariants around it.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

mod location;
mod ride;
mod status;
#[cfg(test)]
mod tests;

pub use location::{Coordinate, Location};
pub use ride::{JoinError, Ride, RideDraft, RideRecord, StatusChange, TransitionError};
pub use status::{ParseRideStatusError, RideStatus};

/// Maximum length of the notes and route polyline fields.
pub const RIDE_TEXT_MAX: usize = 4096;

/// Validation errors raised by ride constructors and mutations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RideValidationError {
    /// A location label was blank.
    #[error("{field} must not be empty")]
    EmptyLabel {
        /// Offending field.
        field: &'static str,
    },
    /// A coordinate was NaN or infinite.
    #[error("{field} must be a finite number")]
    NonFiniteCoordinate {
        /// Offending field.
        field: &'static str,
    },
    /// A coordinate fell outside its geographic range.
    #[error("{field} must be between -{limit} and {limit} (got {value})")]
    CoordinateOutOfRange {
        /// Offending field.
        field: &'static str,
        /// Absolute bound.
        limit: u8,
        /// Supplied value.
        value: f64,
    },
    /// `seats_available` was negative.
    #[error("seats_available must be zero or greater")]
    NegativeSeats,
    /// `estimated_duration` was negative.
    #[error("estimated_duration must be zero or greater")]
    NegativeDuration,
    /// A count exceeded what the ride record can hold.
    #[error("{field} must be at most {max}")]
    CountTooLarge {
        /// Offending field.
        field: &'static str,
        /// Largest accepted value.
        max: u32,
    },
    /// A free-text field was too long.
    #[error("{field} must be at most {max} characters")]
    TextTooLong {
        /// Offending field.
        field: &'static str,
        /// Maximum permitted length.
        max: usize,
    },
    /// Neither participant slot was populated.
    #[error("a ride needs a driver or a rider")]
    MissingParticipant,
    /// `actual_end_time` preceded `actual_start_time`.
    #[error("actual_end_time must not be earlier than actual_start_time")]
    EndBeforeStart,
    /// A timestamp was supplied for a transition that does not set it.
    #[error("{field} can only be set when the ride enters {status}")]
    UnexpectedTimestamp {
        /// Offending field.
        field: &'static str,
        /// Status that sets the field.
        status: RideStatus,
    },
}

/// Stable ride identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = String, format = Uuid)]
pub struct RideId(Uuid);

impl RideId {
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

impl fmt::Display for RideId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

pub(crate) fn normalise_ride_text(
    field: &'static str,
    value: Option<String>,
) -> Result<Option<String>, RideValidationError> {
    let Some(raw) = value else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.chars().count() > RIDE_TEXT_MAX {
        return Err(RideValidationError::TextTooLong {
            field,
            max: RIDE_TEXT_MAX,
        });
    }
    Ok(Some(trimmed.to_owned()))
}
