//! Messaging handlers.
//!
//! ```text
//! POST /messages {"ride_id":"…","receiver_id":"…","content":"On my way"}
//! POST /messages/{message_id}/read
//! ```

use actix_web::{post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, Message, MessageId, RideId, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_message_id, parse_ride_id, parse_uuid};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub id: MessageId,
    pub ride_id: RideId,
    pub sender_id: UserId,
    pub receiver_id: UserId,
    pub content: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Message> for MessageResponse {
    fn from(message: Message) -> Self {
        Self {
            id: message.id,
            ride_id: message.ride_id,
            sender_id: message.sender_id,
            receiver_id: message.receiver_id,
            content: message.content.as_ref().to_owned(),
            is_read: message.is_read,
            created_at: message.created_at,
        }
    }
}

/// Body for `POST /messages`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct MessageCreateBody {
    pub ride_id: String,
    /// Must be the other participant of the ride.
    pub receiver_id: String,
    pub content: String,
}

/// `{message, data}` envelope for message writes.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageEnvelope {
    pub message: String,
    pub data: MessageResponse,
}

/// Send a message to the other participant of a ride.
#[utoipa::path(
    post,
    path = "/messages",
    request_body = MessageCreateBody,
    responses(
        (status = 200, description = "Message sent", body = MessageEnvelope),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not a participant or wrong receiver", body = Error),
        (status = 404, description = "Ride not found", body = Error),
        (status = 503, description = "Storage unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["messages"],
    operation_id = "sendMessage"
)]
#[post("/messages")]
pub async fn send_message(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    payload: web::Json<MessageCreateBody>,
) -> ApiResult<web::Json<MessageEnvelope>> {
    let MessageCreateBody {
        ride_id,
        receiver_id,
        content,
    } = payload.into_inner();
    let ride_id = parse_ride_id(&ride_id)?;
    let receiver_id =
        UserId::from_uuid(parse_uuid(&receiver_id, FieldName::new("receiver_id"))?);
    let message = state
        .messages
        .send(caller.id(), ride_id, receiver_id, content)
        .await?;
    Ok(web::Json(MessageEnvelope {
        message: "Message sent successfully".to_owned(),
        data: message.into(),
    }))
}

/// Mark a received message as read. Repeating the call is harmless.
#[utoipa::path(
    post,
    path = "/messages/{message_id}/read",
    params(("message_id" = String, Path, description = "Message identifier")),
    responses(
        (status = 200, description = "Message marked as read", body = MessageEnvelope),
        (status = 400, description = "Invalid message id", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Caller is not the receiver", body = Error),
        (status = 404, description = "Message not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["messages"],
    operation_id = "markMessageRead"
)]
#[post("/messages/{message_id}/read")]
pub async fn mark_message_read(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<MessageEnvelope>> {
    let message_id = parse_message_id(&path)?;
    let message = state.messages.mark_read(message_id, caller.id()).await?;
    Ok(web::Json(MessageEnvelope {
        message: "Message marked as read".to_owned(),
        data: message.into(),
    }))
}

#[cfg(test)]
#[path = "messages_tests.rs"]
mod tests;
