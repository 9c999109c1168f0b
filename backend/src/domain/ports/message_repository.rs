//! Port for message persistence.

use async_trait::async_trait;

use crate::domain::{Message, MessageId, RideId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by message repository adapters.
    pub enum MessageRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "message repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "message repository query failed: {message}",
    }
}

/// Storage for ride-scoped messages.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Insert a message.
    async fn insert(&self, message: &Message) -> Result<(), MessageRepositoryError>;

    /// Fetch a message by identifier.
    async fn find_by_id(&self, id: &MessageId) -> Result<Option<Message>, MessageRepositoryError>;

    /// Messages for a ride, oldest first.
    async fn list_for_ride(&self, ride: &RideId) -> Result<Vec<Message>, MessageRepositoryError>;

    /// Set the read flag. Returns `false` when no such message exists.
    async fn mark_read(&self, id: &MessageId) -> Result<bool, MessageRepositoryError>;
}
