//! PostgreSQL-backed `RideRepository` implementation using Diesel ORM.
//!
//! Updates are compare-and-set on `(id, revision)`: the row is written only
//! if its stored revision still equals the one the caller read.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{RideRepository, RideRepositoryError};
use crate::domain::{Location, Ride, RideId, RideRecord, RideStatus, UserId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{RideRow, RideWrite};
use super::pool::{DbPool, PoolError};
use super::schema::rides;

/// Diesel-backed implementation of the ride repository port.
#[derive(Clone)]
pub struct DieselRideRepository {
    pool: DbPool,
}

impl DieselRideRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> RideRepositoryError {
    map_basic_pool_error(error, RideRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> RideRepositoryError {
    map_basic_diesel_error(
        error,
        RideRepositoryError::query,
        RideRepositoryError::connection,
    )
}

fn row_to_ride(row: RideRow) -> Result<Ride, RideRepositoryError> {
    let ride_id = row.id;
    let corrupt = |message: String| RideRepositoryError::corrupt(ride_id.to_string(), message);

    let status = row
        .status
        .parse::<RideStatus>()
        .map_err(|err| corrupt(err.to_string()))?;
    let pickup = Location::new(
        "pickup",
        &row.pickup_location,
        row.pickup_latitude,
        row.pickup_longitude,
    )
    .map_err(|err| corrupt(err.to_string()))?;
    let destination = Location::new(
        "destination",
        &row.destination,
        row.destination_latitude,
        row.destination_longitude,
    )
    .map_err(|err| corrupt(err.to_string()))?;

    Ride::restore(RideRecord {
        id: RideId::from_uuid(row.id),
        driver_id: row.driver_id.map(UserId::from_uuid),
        rider_id: row.rider_id.map(UserId::from_uuid),
        pickup,
        destination,
        scheduled_time: row.scheduled_time,
        seats_available: row.seats_available,
        status,
        notes: row.notes,
        route_polyline: row.route_polyline,
        estimated_duration: row.estimated_duration,
        actual_start_time: row.actual_start_time,
        actual_end_time: row.actual_end_time,
        revision: row.revision,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
    .map_err(|err| corrupt(err.to_string()))
}

fn write_image(record: &RideRecord) -> RideWrite<'_> {
    RideWrite {
        id: *record.id.as_uuid(),
        driver_id: record.driver_id.map(|id| *id.as_uuid()),
        rider_id: record.rider_id.map(|id| *id.as_uuid()),
        pickup_location: record.pickup.label(),
        pickup_latitude: record.pickup.coordinate().latitude(),
        pickup_longitude: record.pickup.coordinate().longitude(),
        destination: record.destination.label(),
        destination_latitude: record.destination.coordinate().latitude(),
        destination_longitude: record.destination.coordinate().longitude(),
        scheduled_time: record.scheduled_time,
        seats_available: record.seats_available,
        status: record.status.as_str(),
        notes: record.notes.as_deref(),
        route_polyline: record.route_polyline.as_deref(),
        estimated_duration: record.estimated_duration,
        actual_start_time: record.actual_start_time,
        actual_end_time: record.actual_end_time,
        revision: record.revision,
        created_at: record.created_at,
        updated_at: record.updated_at,
    }
}

#[async_trait]
impl RideRepository for DieselRideRepository {
    async fn insert(&self, ride: &Ride) -> Result<(), RideRepositoryError> {
        let record = ride.to_record();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(rides::table)
            .values(&write_image(&record))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: &RideId) -> Result<Option<Ride>, RideRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = rides::table
            .filter(rides::id.eq(id.as_uuid()))
            .select(RideRow::as_select())
            .first::<RideRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_ride).transpose()
    }

    async fn list_for_participant(&self, user: &UserId) -> Result<Vec<Ride>, RideRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<RideRow> = rides::table
            .filter(
                rides::driver_id
                    .eq(user.as_uuid())
                    .or(rides::rider_id.eq(user.as_uuid())),
            )
            .order((rides::scheduled_time.asc(), rides::created_at.asc()))
            .select(RideRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_ride).collect()
    }

    async fn update(
        &self,
        ride: &Ride,
        expected_revision: i64,
    ) -> Result<(), RideRepositoryError> {
        let record = ride.to_record();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(
            rides::table
                .filter(rides::id.eq(record.id.as_uuid()))
                .filter(rides::revision.eq(expected_revision)),
        )
        .set(&write_image(&record))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        if updated == 0 {
            return Err(RideRepositoryError::stale_revision(
                record.id.to_string(),
                expected_revision,
            ));
        }
        Ok(())
    }
}
