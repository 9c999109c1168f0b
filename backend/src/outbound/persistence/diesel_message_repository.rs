//! PostgreSQL-backed `MessageRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{MessageRepository, MessageRepositoryError};
use crate::domain::{Message, MessageContent, MessageId, RideId, UserId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{MessageRow, NewMessageRow};
use super::pool::{DbPool, PoolError};
use super::schema::messages;

/// Diesel-backed implementation of the message repository port.
#[derive(Clone)]
pub struct DieselMessageRepository {
    pool: DbPool,
}

impl DieselMessageRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> MessageRepositoryError {
    map_basic_pool_error(error, MessageRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> MessageRepositoryError {
    map_basic_diesel_error(
        error,
        MessageRepositoryError::query,
        MessageRepositoryError::connection,
    )
}

fn row_to_message(row: MessageRow) -> Result<Message, MessageRepositoryError> {
    let content = MessageContent::new(&row.content).map_err(|err| {
        MessageRepositoryError::query(format!("stored message {}: {err}", row.id))
    })?;
    Ok(Message {
        id: MessageId::from_uuid(row.id),
        ride_id: RideId::from_uuid(row.ride_id),
        sender_id: UserId::from_uuid(row.sender_id),
        receiver_id: UserId::from_uuid(row.receiver_id),
        content,
        is_read: row.is_read,
        created_at: row.created_at,
    })
}

fn new_row(message: &Message) -> NewMessageRow<'_> {
    NewMessageRow {
        id: *message.id.as_uuid(),
        ride_id: *message.ride_id.as_uuid(),
        sender_id: *message.sender_id.as_uuid(),
        receiver_id: *message.receiver_id.as_uuid(),
        content: message.content.as_ref(),
        is_read: message.is_read,
        created_at: message.created_at,
    }
}

#[async_trait]
impl MessageRepository for DieselMessageRepository {
    async fn insert(&self, message: &Message) -> Result<(), MessageRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(messages::table)
            .values(&new_row(message))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: &MessageId) -> Result<Option<Message>, MessageRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = messages::table
            .filter(messages::id.eq(id.as_uuid()))
            .select(MessageRow::as_select())
            .first::<MessageRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_message).transpose()
    }

    async fn list_for_ride(&self, ride: &RideId) -> Result<Vec<Message>, MessageRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<MessageRow> = messages::table
            .filter(messages::ride_id.eq(ride.as_uuid()))
            .order((messages::created_at.asc(), messages::id.asc()))
            .select(MessageRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_message).collect()
    }

    async fn mark_read(&self, id: &MessageId) -> Result<bool, MessageRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(messages::table.filter(messages::id.eq(id.as_uuid())))
            .set(messages::is_read.eq(true))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }
}
