//! The ride aggregate.

use chrono::{DateTime, Utc};

use crate::domain::{Role, UserId};

use super::{Location, RideId, RideStatus, RideValidationError, normalise_ride_text};

/// Caller-supplied details for a new ride.
#[derive(Debug, Clone, PartialEq)]
pub struct RideDraft {
    /// Pickup point.
    pub pickup: Location,
    /// Drop-off point.
    pub destination: Location,
    /// Planned departure.
    pub scheduled_time: DateTime<Utc>,
    /// Seats offered; defaults to one.
    pub seats_available: Option<i64>,
    /// Free-text notes.
    pub notes: Option<String>,
    /// Encoded route, stored verbatim.
    pub route_polyline: Option<String>,
    /// Estimated duration in minutes.
    pub estimated_duration: Option<i64>,
}

/// Flat persistence shape of a ride.
///
/// Adapters load rows into this struct and pass it to [`Ride::restore`],
/// which re-checks the aggregate invariants.
#[derive(Debug, Clone, PartialEq)]
pub struct RideRecord {
    pub id: RideId,
    pub driver_id: Option<UserId>,
    pub rider_id: Option<UserId>,
    pub pickup: Location,
    pub destination: Location,
    pub scheduled_time: DateTime<Utc>,
    pub seats_available: i64,
    pub status: RideStatus,
    pub notes: Option<String>,
    pub route_polyline: Option<String>,
    pub estimated_duration: Option<i64>,
    pub actual_start_time: Option<DateTime<Utc>>,
    pub actual_end_time: Option<DateTime<Utc>>,
    /// Optimistic concurrency counter; bumped on every mutation.
    pub revision: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Requested status change plus optional extras.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    /// Status to move to.
    pub target: RideStatus,
    /// Replacement notes, if any.
    pub notes: Option<String>,
    /// Start time; only valid when entering `active`.
    pub actual_start_time: Option<DateTime<Utc>>,
    /// End time; only valid when entering `completed`.
    pub actual_end_time: Option<DateTime<Utc>>,
}

impl StatusChange {
    /// A bare transition with no extras.
    #[must_use]
    pub const fn to(target: RideStatus) -> Self {
        Self {
            target,
            notes: None,
            actual_start_time: None,
            actual_end_time: None,
        }
    }
}

/// Failure modes of [`Ride::transition`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransitionError {
    /// `to` is not a successor of `from`.
    #[error("cannot move a ride from {from} to {to}")]
    Illegal {
        /// Current status.
        from: RideStatus,
        /// Requested status.
        to: RideStatus,
    },
    /// The extras were invalid.
    #[error(transparent)]
    Invalid(#[from] RideValidationError),
}

/// Failure modes of [`Ride::join`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum JoinError {
    /// Only scheduled rides accept participants.
    #[error("only scheduled rides can be joined (ride is {status})")]
    NotScheduled {
        /// Current status.
        status: RideStatus,
    },
    /// The caller already occupies a slot.
    #[error("already a participant of this ride")]
    AlreadyParticipant,
    /// The requested slot is occupied.
    #[error("ride already has a {role}")]
    SlotTaken {
        /// Requested slot.
        role: Role,
    },
    /// Joining as rider with no seats left.
    #[error("no seats available")]
    NoSeatsLeft,
}

/// A ride between at most one driver and one rider.
#[derive(Debug, Clone, PartialEq)]
pub struct Ride {
    id: RideId,
    driver_id: Option<UserId>,
    rider_id: Option<UserId>,
    pickup: Location,
    destination: Location,
    scheduled_time: DateTime<Utc>,
    seats_available: u32,
    status: RideStatus,
    notes: Option<String>,
    route_polyline: Option<String>,
    estimated_duration: Option<u32>,
    actual_start_time: Option<DateTime<Utc>>,
    actual_end_time: Option<DateTime<Utc>>,
    revision: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn count_from(
    raw: i64,
    field: &'static str,
    negative: RideValidationError,
) -> Result<u32, RideValidationError> {
    if raw < 0 {
        return Err(negative);
    }
    u32::try_from(raw).map_err(|_| RideValidationError::CountTooLarge {
        field,
        max: u32::MAX,
    })
}

fn seats_from(raw: i64) -> Result<u32, RideValidationError> {
    count_from(raw, "seats_available", RideValidationError::NegativeSeats)
}

fn duration_from(raw: Option<i64>) -> Result<Option<u32>, RideValidationError> {
    raw.map(|minutes| {
        count_from(
            minutes,
            "estimated_duration",
            RideValidationError::NegativeDuration,
        )
    })
    .transpose()
}

fn check_times(
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> Result<(), RideValidationError> {
    match (start, end) {
        (Some(started), Some(ended)) if ended < started => Err(RideValidationError::EndBeforeStart),
        _ => Ok(()),
    }
}

impl Ride {
    /// Create a scheduled ride with `creator` in the slot matching `role`.
    ///
    /// # Errors
    /// Rejects negative seat counts or durations and overlong text.
    pub fn schedule(
        creator: UserId,
        role: Role,
        draft: RideDraft,
        now: DateTime<Utc>,
    ) -> Result<Self, RideValidationError> {
        let RideDraft {
            pickup,
            destination,
            scheduled_time,
            seats_available,
            notes,
            route_polyline,
            estimated_duration,
        } = draft;
        let (driver_id, rider_id) = match role {
            Role::Driver => (Some(creator), None),
            Role::Rider => (None, Some(creator)),
        };
        Ok(Self {
            id: RideId::random(),
            driver_id,
            rider_id,
            pickup,
            destination,
            scheduled_time,
            seats_available: seats_from(seats_available.unwrap_or(1))?,
            status: RideStatus::Scheduled,
            notes: normalise_ride_text("notes", notes)?,
            route_polyline: normalise_ride_text("route_polyline", route_polyline)?,
            estimated_duration: duration_from(estimated_duration)?,
            actual_start_time: None,
            actual_end_time: None,
            revision: 0,
            created_at: now,
            updated_at: now,
        })
    }

    /// Rebuild a ride from storage.
    ///
    /// # Errors
    /// Fails when the stored row violates an aggregate invariant.
    pub fn restore(record: RideRecord) -> Result<Self, RideValidationError> {
        if record.driver_id.is_none() && record.rider_id.is_none() {
            return Err(RideValidationError::MissingParticipant);
        }
        check_times(record.actual_start_time, record.actual_end_time)?;
        Ok(Self {
            id: record.id,
            driver_id: record.driver_id,
            rider_id: record.rider_id,
            pickup: record.pickup,
            destination: record.destination,
            scheduled_time: record.scheduled_time,
            seats_available: seats_from(record.seats_available)?,
            status: record.status,
            notes: record.notes,
            route_polyline: record.route_polyline,
            estimated_duration: duration_from(record.estimated_duration)?,
            actual_start_time: record.actual_start_time,
            actual_end_time: record.actual_end_time,
            revision: record.revision,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }

    /// Flatten into the persistence shape.
    #[must_use]
    pub fn to_record(&self) -> RideRecord {
        RideRecord {
            id: self.id,
            driver_id: self.driver_id,
            rider_id: self.rider_id,
            pickup: self.pickup.clone(),
            destination: self.destination.clone(),
            scheduled_time: self.scheduled_time,
            seats_available: i64::from(self.seats_available),
            status: self.status,
            notes: self.notes.clone(),
            route_polyline: self.route_polyline.clone(),
            estimated_duration: self.estimated_duration.map(i64::from),
            actual_start_time: self.actual_start_time,
            actual_end_time: self.actual_end_time,
            revision: self.revision,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Apply a lifecycle transition.
    ///
    /// Entering `active` stamps `actual_start_time` (supplied or `now`);
    /// entering `completed` stamps `actual_end_time` likewise. On error the
    /// ride is left untouched.
    ///
    /// # Errors
    /// [`TransitionError::Illegal`] when `change.target` is not a successor
    /// of the current status; [`TransitionError::Invalid`] for bad extras.
    pub fn transition(
        &mut self,
        change: StatusChange,
        now: DateTime<Utc>,
    ) -> Result<(), TransitionError> {
        let StatusChange {
            target,
            notes,
            actual_start_time,
            actual_end_time,
        } = change;
        if !self.status.can_transition_to(target) {
            return Err(TransitionError::Illegal {
                from: self.status,
                to: target,
            });
        }
        if target != RideStatus::Active && actual_start_time.is_some() {
            return Err(RideValidationError::UnexpectedTimestamp {
                field: "actual_start_time",
                status: RideStatus::Active,
            }
            .into());
        }
        if target != RideStatus::Completed && actual_end_time.is_some() {
            return Err(RideValidationError::UnexpectedTimestamp {
                field: "actual_end_time",
                status: RideStatus::Completed,
            }
            .into());
        }
        let started = match target {
            RideStatus::Active => Some(actual_start_time.unwrap_or(now)),
            _ => self.actual_start_time,
        };
        let ended = match target {
            RideStatus::Completed => Some(actual_end_time.unwrap_or(now)),
            _ => self.actual_end_time,
        };
        check_times(started, ended)?;
        let replacement_notes = normalise_ride_text("notes", notes)?;

        self.status = target;
        self.actual_start_time = started;
        self.actual_end_time = ended;
        if replacement_notes.is_some() {
            self.notes = replacement_notes;
        }
        self.touch(now);
        Ok(())
    }

    /// Fill the empty slot matching `role` with `user`.
    ///
    /// Joining as rider consumes one seat.
    ///
    /// # Errors
    /// See [`JoinError`].
    pub fn join(&mut self, user: UserId, role: Role, now: DateTime<Utc>) -> Result<(), JoinError> {
        if self.status != RideStatus::Scheduled {
            return Err(JoinError::NotScheduled {
                status: self.status,
            });
        }
        if self.is_participant(user) {
            return Err(JoinError::AlreadyParticipant);
        }
        match role {
            Role::Driver => {
                if self.driver_id.is_some() {
                    return Err(JoinError::SlotTaken { role });
                }
                self.driver_id = Some(user);
            }
            Role::Rider => {
                if self.rider_id.is_some() {
                    return Err(JoinError::SlotTaken { role });
                }
                let remaining = self
                    .seats_available
                    .checked_sub(1)
                    .ok_or(JoinError::NoSeatsLeft)?;
                self.rider_id = Some(user);
                self.seats_available = remaining;
            }
        }
        self.touch(now);
        Ok(())
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.revision = self.revision.saturating_add(1);
        self.updated_at = now;
    }

    /// `true` when `user` is the driver or the rider.
    #[must_use]
    pub fn is_participant(&self, user: UserId) -> bool {
        self.driver_id == Some(user) || self.rider_id == Some(user)
    }

    /// The other participant from `user`'s point of view.
    ///
    /// Returns `None` when `user` is not a participant or the other slot is
    /// still empty.
    #[must_use]
    pub fn counterpart_of(&self, user: UserId) -> Option<UserId> {
        if self.driver_id == Some(user) {
            self.rider_id
        } else if self.rider_id == Some(user) {
            self.driver_id
        } else {
            None
        }
    }

    /// Identifier.
    #[must_use]
    pub const fn id(&self) -> RideId {
        self.id
    }

    /// Driver slot.
    #[must_use]
    pub const fn driver_id(&self) -> Option<UserId> {
        self.driver_id
    }

    /// Rider slot.
    #[must_use]
    pub const fn rider_id(&self) -> Option<UserId> {
        self.rider_id
    }

    /// Pickup point.
    #[must_use]
    pub const fn pickup(&self) -> &Location {
        &self.pickup
    }

    /// Drop-off point.
    #[must_use]
    pub const fn destination(&self) -> &Location {
        &self.destination
    }

    /// Planned departure.
    #[must_use]
    pub const fn scheduled_time(&self) -> DateTime<Utc> {
        self.scheduled_time
    }

    /// Remaining seats.
    #[must_use]
    pub const fn seats_available(&self) -> u32 {
        self.seats_available
    }

    /// Lifecycle state.
    #[must_use]
    pub const fn status(&self) -> RideStatus {
        self.status
    }

    /// Notes.
    #[must_use]
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    /// Encoded route.
    #[must_use]
    pub fn route_polyline(&self) -> Option<&str> {
        self.route_polyline.as_deref()
    }

    /// Estimated duration in minutes.
    #[must_use]
    pub const fn estimated_duration(&self) -> Option<u32> {
        self.estimated_duration
    }

    /// When the ride actually started.
    #[must_use]
    pub const fn actual_start_time(&self) -> Option<DateTime<Utc>> {
        self.actual_start_time
    }

    /// When the ride actually ended.
    #[must_use]
    pub const fn actual_end_time(&self) -> Option<DateTime<Utc>> {
        self.actual_end_time
    }

    /// Concurrency revision.
    #[must_use]
    pub const fn revision(&self) -> i64 {
        self.revision
    }

    /// Creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Last modification timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}
