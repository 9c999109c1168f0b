//! Message ledger service implementing [`MessageLedger`].

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, info};

use super::ports::{MessageLedger, MessageRepository, RideRepository};
use super::repository_errors::map_message_error;
use super::ride_service::load_ride;
use super::{Error, Message, MessageContent, MessageId, RideId, UserId};

const NOT_A_SENDER: &str = "Not authorized to send messages for this ride";

/// Message ledger backed by ride and message repositories.
#[derive(Clone)]
pub struct MessageLedgerService<R, M> {
    rides: Arc<R>,
    messages: Arc<M>,
    clock: Arc<dyn Clock>,
}

impl<R, M> MessageLedgerService<R, M> {
    /// Create a service over the given repositories and clock.
    pub fn new(rides: Arc<R>, messages: Arc<M>, clock: Arc<dyn Clock>) -> Self {
        Self {
            rides,
            messages,
            clock,
        }
    }
}

impl<R, M> MessageLedgerService<R, M>
where
    M: MessageRepository,
{
    async fn load_message(&self, message_id: MessageId) -> Result<Message, Error> {
        self.messages
            .find_by_id(&message_id)
            .await
            .map_err(map_message_error)?
            .ok_or_else(|| Error::not_found("Message not found"))
    }
}

#[async_trait]
impl<R, M> MessageLedger for MessageLedgerService<R, M>
where
    R: RideRepository,
    M: MessageRepository,
{
    async fn send(
        &self,
        sender: UserId,
        ride_id: RideId,
        receiver: UserId,
        content: String,
    ) -> Result<Message, Error> {
        let ride = load_ride(self.rides.as_ref(), ride_id).await?;
        if !ride.is_participant(sender) {
            return Err(Error::forbidden(NOT_A_SENDER));
        }
        let content =
            MessageContent::new(content).map_err(|err| Error::invalid_request(err.to_string()))?;
        if ride.counterpart_of(sender) != Some(receiver) {
            return Err(Error::forbidden(
                "Messages can only be sent to the other participant of this ride",
            ));
        }

        let message = Message {
            id: MessageId::random(),
            ride_id,
            sender_id: sender,
            receiver_id: receiver,
            content,
            is_read: false,
            created_at: self.clock.utc(),
        };
        self.messages
            .insert(&message)
            .await
            .map_err(map_message_error)?;
        info!(message_id = %message.id, ride_id = %ride_id, "message sent");
        Ok(message)
    }

    async fn list_for_ride(&self, ride_id: RideId, caller: UserId) -> Result<Vec<Message>, Error> {
        let ride = load_ride(self.rides.as_ref(), ride_id).await?;
        if !ride.is_participant(caller) {
            return Err(Error::forbidden("Not authorized to view messages for this ride"));
        }
        self.messages
            .list_for_ride(&ride_id)
            .await
            .map_err(map_message_error)
    }

    async fn mark_read(&self, message_id: MessageId, caller: UserId) -> Result<Message, Error> {
        let mut message = self.load_message(message_id).await?;
        if message.receiver_id != caller {
            return Err(Error::forbidden("Only the receiver can mark a message as read"));
        }
        if message.is_read {
            debug!(message_id = %message_id, "message already read");
            return Ok(message);
        }
        if !self
            .messages
            .mark_read(&message_id)
            .await
            .map_err(map_message_error)?
        {
            return Err(Error::not_found("Message not found"));
        }
        message.is_read = true;
        Ok(message)
    }
}

#[cfg(test)]
#[path = "message_service_tests.rs"]
mod tests;
