//! Ride handlers: create, list, read, status transitions and join.
//!
//! ```text
//! POST /rides {"pickup_location":"Central Station",...,"scheduled_time":"2025-06-02T08:00:00Z"}
//! GET /rides
//! GET /rides/{ride_id}
//! PUT /rides/{ride_id}/status {"status":"active"}
//! POST /rides/{ride_id}/join {"role":"rider"}
//! GET /rides/{ride_id}/messages
//! ```

use actix_web::{get, post, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    Error, Location, Ride, RideDraft, RideId, RideStatus, Role, StatusChange, User, UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::messages::MessageResponse;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, invalid_field, parse_ride_id, ride_validation_error, user_validation_error,
};

/// A ride as returned to participants. Participants are referenced by id.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RideResponse {
    pub id: RideId,
    pub driver_id: Option<UserId>,
    pub rider_id: Option<UserId>,
    pub pickup_location: String,
    pub pickup_latitude: f64,
    pub pickup_longitude: f64,
    pub destination: String,
    pub destination_latitude: f64,
    pub destination_longitude: f64,
    pub scheduled_time: DateTime<Utc>,
    pub seats_available: u32,
    pub status: RideStatus,
    pub notes: Option<String>,
    pub route_polyline: Option<String>,
    /// Minutes.
    pub estimated_duration: Option<u32>,
    pub actual_start_time: Option<DateTime<Utc>>,
    pub actual_end_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Ride> for RideResponse {
    fn from(ride: &Ride) -> Self {
        let pickup = ride.pickup().coordinate();
        let destination = ride.destination().coordinate();
        Self {
            id: ride.id(),
            driver_id: ride.driver_id(),
            rider_id: ride.rider_id(),
            pickup_location: ride.pickup().label().to_owned(),
            pickup_latitude: pickup.latitude(),
            pickup_longitude: pickup.longitude(),
            destination: ride.destination().label().to_owned(),
            destination_latitude: destination.latitude(),
            destination_longitude: destination.longitude(),
            scheduled_time: ride.scheduled_time(),
            seats_available: ride.seats_available(),
            status: ride.status(),
            notes: ride.notes().map(str::to_owned),
            route_polyline: ride.route_polyline().map(str::to_owned),
            estimated_duration: ride.estimated_duration(),
            actual_start_time: ride.actual_start_time(),
            actual_end_time: ride.actual_end_time(),
            created_at: ride.created_at(),
            updated_at: ride.updated_at(),
        }
    }
}

/// Ride creation body for `POST /rides`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct RideCreateBody {
    pub pickup_location: String,
    pub pickup_latitude: f64,
    pub pickup_longitude: f64,
    pub destination: String,
    pub destination_latitude: f64,
    pub destination_longitude: f64,
    pub scheduled_time: DateTime<Utc>,
    /// Defaults to one.
    #[serde(default)]
    pub seats_available: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub route_polyline: Option<String>,
    /// Minutes.
    #[serde(default)]
    pub estimated_duration: Option<i64>,
    /// Slot the creator takes; falls back to the profile's `user_type`.
    #[serde(default)]
    pub role: Option<String>,
}

impl TryFrom<RideCreateBody> for RideDraft {
    type Error = Error;

    fn try_from(body: RideCreateBody) -> Result<Self, Self::Error> {
        let pickup = Location::new(
            "pickup",
            &body.pickup_location,
            body.pickup_latitude,
            body.pickup_longitude,
        )
        .map_err(ride_validation_error)?;
        let destination = Location::new(
            "destination",
            &body.destination,
            body.destination_latitude,
            body.destination_longitude,
        )
        .map_err(ride_validation_error)?;
        Ok(Self {
            pickup,
            destination,
            scheduled_time: body.scheduled_time,
            seats_available: body.seats_available,
            notes: body.notes,
            route_polyline: body.route_polyline,
            estimated_duration: body.estimated_duration,
        })
    }
}

/// Pick the acting role: explicit request value first, then the profile.
fn resolve_role(requested: Option<&str>, caller: &User) -> Result<Role, Error> {
    match requested.map(str::trim).filter(|raw| !raw.is_empty()) {
        Some(raw) => raw.parse::<Role>().map_err(user_validation_error),
        None => caller.profile.role.ok_or_else(|| {
            invalid_field(
                FieldName::new("role"),
                "role is required when the profile has no user_type",
            )
        }),
    }
}

/// `{message, ride}` envelope for ride mutations.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RideEnvelope {
    pub message: String,
    pub ride: RideResponse,
}

impl RideEnvelope {
    fn new(message: &str, ride: &Ride) -> Self {
        Self {
            message: message.to_owned(),
            ride: ride.into(),
        }
    }
}

/// Schedule a new ride with the caller as driver or rider.
#[utoipa::path(
    post,
    path = "/rides",
    request_body = RideCreateBody,
    responses(
        (status = 200, description = "Ride created", body = RideEnvelope),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 503, description = "Storage unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["rides"],
    operation_id = "createRide"
)]
#[post("/rides")]
pub async fn create_ride(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    payload: web::Json<RideCreateBody>,
) -> ApiResult<web::Json<RideEnvelope>> {
    let body = payload.into_inner();
    let role = resolve_role(body.role.as_deref(), caller.user())?;
    let draft = RideDraft::try_from(body)?;
    let ride = state.rides.create_ride(caller.id(), role, draft).await?;
    Ok(web::Json(RideEnvelope::new(
        "Ride created successfully",
        &ride,
    )))
}

/// `{rides}` envelope for `GET /rides`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RideList {
    pub rides: Vec<RideResponse>,
}

/// Rides where the caller is driver or rider.
#[utoipa::path(
    get,
    path = "/rides",
    responses(
        (status = 200, description = "Caller's rides", body = RideList),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 503, description = "Storage unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["rides"],
    operation_id = "listRides"
)]
#[get("/rides")]
pub async fn list_rides(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
) -> ApiResult<web::Json<RideList>> {
    let rides = state.rides.list_rides_for(caller.id()).await?;
    Ok(web::Json(RideList {
        rides: rides.iter().map(RideResponse::from).collect(),
    }))
}

/// `{ride}` envelope for `GET /rides/{ride_id}`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RideDetail {
    pub ride: RideResponse,
}

/// Read one ride; participants only.
#[utoipa::path(
    get,
    path = "/rides/{ride_id}",
    params(("ride_id" = String, Path, description = "Ride identifier")),
    responses(
        (status = 200, description = "Ride", body = RideDetail),
        (status = 400, description = "Invalid ride id", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not a participant", body = Error),
        (status = 404, description = "Ride not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["rides"],
    operation_id = "getRide"
)]
#[get("/rides/{ride_id}")]
pub async fn get_ride(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<RideDetail>> {
    let ride_id = parse_ride_id(&path)?;
    let ride = state.rides.get_ride(ride_id, caller.id()).await?;
    Ok(web::Json(RideDetail {
        ride: (&ride).into(),
    }))
}

/// Status change body for `PUT /rides/{ride_id}/status`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct RideStatusBody {
    /// `scheduled`, `active`, `completed` or `cancelled`.
    pub status: String,
    #[serde(default)]
    pub notes: Option<String>,
    /// Only when entering `active`; defaults to now.
    #[serde(default)]
    pub actual_start_time: Option<DateTime<Utc>>,
    /// Only when entering `completed`; defaults to now.
    #[serde(default)]
    pub actual_end_time: Option<DateTime<Utc>>,
}

impl TryFrom<RideStatusBody> for StatusChange {
    type Error = Error;

    fn try_from(body: RideStatusBody) -> Result<Self, Self::Error> {
        let target = body
            .status
            .parse::<RideStatus>()
            .map_err(|err| invalid_field(FieldName::new("status"), err))?;
        Ok(Self {
            target,
            notes: body.notes,
            actual_start_time: body.actual_start_time,
            actual_end_time: body.actual_end_time,
        })
    }
}

/// Move a ride along its lifecycle.
///
/// Illegal edges are `409 illegal_transition` with `{from, to, allowed}`
/// details; a write that lost a race is `409 conflict`.
#[utoipa::path(
    put,
    path = "/rides/{ride_id}/status",
    params(("ride_id" = String, Path, description = "Ride identifier")),
    request_body = RideStatusBody,
    responses(
        (status = 200, description = "Ride updated", body = RideEnvelope),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not a participant", body = Error),
        (status = 404, description = "Ride not found", body = Error),
        (status = 409, description = "Illegal transition or concurrent update", body = Error),
        (status = 503, description = "Storage unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["rides"],
    operation_id = "updateRideStatus"
)]
#[put("/rides/{ride_id}/status")]
pub async fn update_ride_status(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<RideStatusBody>,
) -> ApiResult<web::Json<RideEnvelope>> {
    let ride_id = parse_ride_id(&path)?;
    let change = StatusChange::try_from(payload.into_inner())?;
    let ride = state.rides.transition(ride_id, caller.id(), change).await?;
    Ok(web::Json(RideEnvelope::new(
        "Ride status updated successfully",
        &ride,
    )))
}

/// Join body for `POST /rides/{ride_id}/join`.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct JoinBody {
    /// Slot to fill; falls back to the profile's `user_type`.
    #[serde(default)]
    pub role: Option<String>,
}

/// Take the open driver or rider slot of a scheduled ride.
#[utoipa::path(
    post,
    path = "/rides/{ride_id}/join",
    params(("ride_id" = String, Path, description = "Ride identifier")),
    request_body = JoinBody,
    responses(
        (status = 200, description = "Joined", body = RideEnvelope),
        (status = 400, description = "Invalid request, ride not scheduled or full", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Ride not found", body = Error),
        (status = 409, description = "Slot taken or already a participant", body = Error),
        (status = 503, description = "Storage unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["rides"],
    operation_id = "joinRide"
)]
#[post("/rides/{ride_id}/join")]
pub async fn join_ride(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
    payload: Option<web::Json<JoinBody>>,
) -> ApiResult<web::Json<RideEnvelope>> {
    let ride_id = parse_ride_id(&path)?;
    let body = payload.map(web::Json::into_inner).unwrap_or_default();
    let role = resolve_role(body.role.as_deref(), caller.user())?;
    let ride = state.rides.join(ride_id, caller.id(), role).await?;
    Ok(web::Json(RideEnvelope::new("Joined ride successfully", &ride)))
}

/// `{messages}` envelope for `GET /rides/{ride_id}/messages`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageList {
    pub messages: Vec<MessageResponse>,
}

/// Messages exchanged on a ride, oldest first; participants only.
#[utoipa::path(
    get,
    path = "/rides/{ride_id}/messages",
    params(("ride_id" = String, Path, description = "Ride identifier")),
    responses(
        (status = 200, description = "Messages", body = MessageList),
        (status = 400, description = "Invalid ride id", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not a participant", body = Error),
        (status = 404, description = "Ride not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["messages"],
    operation_id = "listRideMessages"
)]
#[get("/rides/{ride_id}/messages")]
pub async fn list_ride_messages(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<MessageList>> {
    let ride_id = parse_ride_id(&path)?;
    let messages = state.messages.list_for_ride(ride_id, caller.id()).await?;
    Ok(web::Json(MessageList {
        messages: messages.into_iter().map(MessageResponse::from).collect(),
    }))
}

#[cfg(test)]
#[path = "rides_tests.rs"]
mod tests;
