//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::header;
use actix_web::{App, web};
use chrono::Duration;
use mockable::Clock;
use rstest::fixture;
use serde_json::{Value, json};

use crate::Trace;
use crate::domain::{
    RideId, RideStatus, Role, SignupRequest, StatusChange, UserId, UserProfile,
};
use crate::test_support::{FixtureClock, InMemoryStore, in_memory_http_state, sample_draft};

use super::configure_api;
use super::state::HttpState;

pub const PASSWORD: &str = "correct horse";

/// In-memory HTTP state plus handles on its store and clock.
pub struct TestContext {
    pub state: web::Data<HttpState>,
    pub store: Arc<InMemoryStore>,
    pub clock: Arc<FixtureClock>,
}

impl TestContext {
    /// Register `email` directly through the identity port.
    pub async fn sign_up(&self, email: &str, role: Option<Role>) -> (UserId, String) {
        let profile = UserProfile {
            role,
            ..UserProfile::default()
        };
        let request =
            SignupRequest::try_new(email, PASSWORD, None, profile).expect("valid signup");
        let session = self
            .state
            .identity
            .register(request)
            .await
            .expect("registration succeeds");
        (session.user.id, session.access_token.as_str().to_owned())
    }

    /// Register `email` without a role and return its bearer token.
    pub async fn token_for_new_user(&self, email: &str) -> String {
        self.sign_up(email, None).await.1
    }

    /// A scheduled ride with `driver` and `rider` in place.
    pub async fn paired_ride(&self, driver: UserId, rider: UserId) -> RideId {
        let when = self.clock.utc() + Duration::days(1);
        let ride = self
            .state
            .rides
            .create_ride(driver, Role::Driver, sample_draft(when))
            .await
            .expect("ride created");
        self.state
            .rides
            .join(ride.id(), rider, Role::Rider)
            .await
            .expect("rider joins");
        ride.id()
    }

    /// Drive `ride` through `statuses` as `caller`.
    pub async fn advance(&self, ride: RideId, caller: UserId, statuses: &[RideStatus]) {
        for status in statuses {
            self.state
                .rides
                .transition(ride, caller, StatusChange::to(*status))
                .await
                .expect("legal transition");
        }
    }
}

/// JSON body for `POST /rides`, optionally naming the creator's role.
pub fn ride_payload(role: Option<&str>) -> Value {
    let mut body = json!({
        "pickup_location": "Central Station",
        "pickup_latitude": 52.379,
        "pickup_longitude": 4.900,
        "destination": "Schiphol Airport",
        "destination_latitude": 52.310,
        "destination_longitude": 4.768,
        "scheduled_time": "2025-06-02T08:00:00Z",
        "seats_available": 2,
        "estimated_duration": 25
    });
    if let (Some(role), Some(map)) = (role, body.as_object_mut()) {
        map.insert("role".to_owned(), Value::String(role.to_owned()));
    }
    body
}

#[fixture]
pub fn context() -> TestContext {
    let store = InMemoryStore::new();
    let clock = Arc::new(FixtureClock::fixed());
    let state = web::Data::new(in_memory_http_state(&store, clock.clone()));
    TestContext {
        state,
        store,
        clock,
    }
}

/// `Authorization` header pair for `token`.
pub fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {token}"))
}

/// The full API over `state`, wrapped in the trace middleware.
pub fn test_app(
    state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(state)
        .wrap(Trace)
        .configure(configure_api)
}
