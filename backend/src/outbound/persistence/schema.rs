//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `migrations/` exactly. When the migrations
//! change, regenerate with `diesel print-schema` or edit by hand.

diesel::table! {
    /// Registered accounts. `email` is unique on `lower(email)`.
    users (id) {
        id -> Uuid,
        email -> Varchar,
        password_hash -> Text,
        name -> Nullable<Varchar>,
        phone_number -> Nullable<Varchar>,
        date_of_birth -> Nullable<Varchar>,
        /// `driver`, `rider` or null.
        role -> Nullable<Varchar>,
        google_id -> Nullable<Varchar>,
        profile_picture -> Nullable<Varchar>,
        is_verified -> Bool,
        is_active -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Rides and their lifecycle state.
    rides (id) {
        id -> Uuid,
        driver_id -> Nullable<Uuid>,
        rider_id -> Nullable<Uuid>,
        pickup_location -> Text,
        pickup_latitude -> Float8,
        pickup_longitude -> Float8,
        destination -> Text,
        destination_latitude -> Float8,
        destination_longitude -> Float8,
        scheduled_time -> Timestamptz,
        seats_available -> Int8,
        status -> Varchar,
        notes -> Nullable<Text>,
        route_polyline -> Nullable<Text>,
        /// Minutes.
        estimated_duration -> Nullable<Int8>,
        actual_start_time -> Nullable<Timestamptz>,
        actual_end_time -> Nullable<Timestamptz>,
        /// Optimistic concurrency counter.
        revision -> Int8,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    ratings (id) {
        id -> Uuid,
        ride_id -> Uuid,
        rater_id -> Uuid,
        rated_user_id -> Uuid,
        score -> Int2,
        comment -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    messages (id) {
        id -> Uuid,
        ride_id -> Uuid,
        sender_id -> Uuid,
        receiver_id -> Uuid,
        content -> Text,
        is_read -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(messages -> rides (ride_id));
diesel::joinable!(ratings -> rides (ride_id));

diesel::allow_tables_to_appear_in_same_query!(messages, ratings, rides, users);
