//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversions to and from domain types live
//! next to each repository.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{messages, ratings, rides, users};

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub name: Option<String>,
    pub phone_number: Option<String>,
    pub date_of_birth: Option<String>,
    pub role: Option<String>,
    pub google_id: Option<String>,
    pub profile_picture: Option<String>,
    pub is_verified: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub name: Option<&'a str>,
    pub phone_number: Option<&'a str>,
    pub date_of_birth: Option<&'a str>,
    pub role: Option<&'static str>,
    pub google_id: Option<&'a str>,
    pub profile_picture: Option<&'a str>,
    pub is_verified: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Changeset for profile updates; `None` writes NULL.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct UserProfileUpdate<'a> {
    pub name: Option<&'a str>,
    pub phone_number: Option<&'a str>,
    pub date_of_birth: Option<&'a str>,
    pub role: Option<&'static str>,
    pub profile_picture: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Rides
// ---------------------------------------------------------------------------

/// Row struct for reading from the rides table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = rides)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RideRow {
    pub id: Uuid,
    pub driver_id: Option<Uuid>,
    pub rider_id: Option<Uuid>,
    pub pickup_location: String,
    pub pickup_latitude: f64,
    pub pickup_longitude: f64,
    pub destination: String,
    pub destination_latitude: f64,
    pub destination_longitude: f64,
    pub scheduled_time: DateTime<Utc>,
    pub seats_available: i64,
    pub status: String,
    pub notes: Option<String>,
    pub route_polyline: Option<String>,
    pub estimated_duration: Option<i64>,
    pub actual_start_time: Option<DateTime<Utc>>,
    pub actual_end_time: Option<DateTime<Utc>>,
    pub revision: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Full ride image used for inserts and compare-and-set updates.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = rides)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct RideWrite<'a> {
    pub id: Uuid,
    pub driver_id: Option<Uuid>,
    pub rider_id: Option<Uuid>,
    pub pickup_location: &'a str,
    pub pickup_latitude: f64,
    pub pickup_longitude: f64,
    pub destination: &'a str,
    pub destination_latitude: f64,
    pub destination_longitude: f64,
    pub scheduled_time: DateTime<Utc>,
    pub seats_available: i64,
    pub status: &'static str,
    pub notes: Option<&'a str>,
    pub route_polyline: Option<&'a str>,
    pub estimated_duration: Option<i64>,
    pub actual_start_time: Option<DateTime<Utc>>,
    pub actual_end_time: Option<DateTime<Utc>>,
    pub revision: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Ratings
// ---------------------------------------------------------------------------

/// Insertable struct for rating records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = ratings)]
pub(crate) struct NewRatingRow<'a> {
    pub id: Uuid,
    pub ride_id: Uuid,
    pub rater_id: Uuid,
    pub rated_user_id: Uuid,
    pub score: i16,
    pub comment: Option<&'a str>,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// Row struct for reading from the messages table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = messages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MessageRow {
    pub id: Uuid,
    pub ride_id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub content: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for message records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = messages)]
pub(crate) struct NewMessageRow<'a> {
    pub id: Uuid,
    pub ride_id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub content: &'a str,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}
