//! Driving port for ride-scoped messaging.

use async_trait::async_trait;

use crate::domain::{Error, Message, MessageId, RideId, UserId};

/// Messaging between the two participants of a ride.
#[async_trait]
pub trait MessageLedger: Send + Sync {
    /// Send `content` from `sender` to `receiver` within a ride.
    async fn send(
        &self,
        sender: UserId,
        ride_id: RideId,
        receiver: UserId,
        content: String,
    ) -> Result<Message, Error>;

    /// Messages of a ride, oldest first; participants only.
    async fn list_for_ride(&self, ride_id: RideId, caller: UserId) -> Result<Vec<Message>, Error>;

    /// Mark a message read; only its receiver may do so.
    async fn mark_read(&self, message_id: MessageId, caller: UserId) -> Result<Message, Error>;
}
