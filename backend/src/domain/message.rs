//! Ride-scoped messages between the two participants.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{RideId, UserId};

/// Maximum message length in characters.
pub const MESSAGE_MAX: usize = 2000;

/// Validation errors for message content.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MessageValidationError {
    /// Content was blank once trimmed.
    #[error("content must not be empty")]
    Empty,
    /// Content exceeded [`MESSAGE_MAX`].
    #[error("content must be at most {MESSAGE_MAX} characters")]
    TooLong,
}

/// Message identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = String, format = Uuid)]
pub struct MessageId(Uuid);

impl MessageId {
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

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Non-empty message body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageContent(String);

impl MessageContent {
    /// Validate a message body. Surrounding whitespace is trimmed.
    ///
    /// # Errors
    /// Rejects blank or overlong content.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, MessageValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(MessageValidationError::Empty);
        }
        if trimmed.chars().count() > MESSAGE_MAX {
            return Err(MessageValidationError::TooLong);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for MessageContent {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Stored message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Identifier.
    pub id: MessageId,
    /// Ride the conversation belongs to.
    pub ride_id: RideId,
    /// Author.
    pub sender_id: UserId,
    /// Recipient.
    pub receiver_id: UserId,
    /// Body.
    pub content: MessageContent,
    /// Set once the receiver has read the message.
    pub is_read: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}
