//! Ride status and its transition graph.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Lifecycle state of a ride.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RideStatus {
    /// Created and waiting to start.
    Scheduled,
    /// Under way.
    Active,
    /// Finished; terminal.
    Completed,
    /// Abandoned; terminal.
    Cancelled,
}

/// Error returned when parsing an unknown status string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown ride status '{0}'; expected scheduled, active, completed or cancelled")]
pub struct ParseRideStatusError(pub String);

impl RideStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 4] = [Self::Scheduled, Self::Active, Self::Completed, Self::Cancelled];

    /// Lowercase wire and storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// `true` for `completed` and `cancelled`.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Whether `next` is a direct successor of `self`.
    ///
    /// # Examples
    /// ```
    /// use carpool_backend::domain::RideStatus;
    ///
    /// assert!(RideStatus::Scheduled.can_transition_to(RideStatus::Active));
    /// assert!(!RideStatus::Completed.can_transition_to(RideStatus::Active));
    /// ```
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Scheduled, Self::Active)
                | (Self::Active, Self::Completed)
                | (Self::Scheduled | Self::Active, Self::Cancelled)
        )
    }

    /// Statuses reachable in one step.
    #[must_use]
    pub fn successors(self) -> Vec<Self> {
        Self::ALL
            .into_iter()
            .filter(|next| self.can_transition_to(*next))
            .collect()
    }
}

impl fmt::Display for RideStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RideStatus {
    type Err = ParseRideStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == lowered)
            .ok_or_else(|| ParseRideStatusError(s.to_owned()))
    }
}
