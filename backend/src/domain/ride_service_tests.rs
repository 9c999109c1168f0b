//! Tests for the ride ledger service.

use std::sync::Arc;

use chrono::Duration;
use rstest::{fixture, rstest};
use serde_json::json;

use super::*;
use crate::domain::ports::{MockRideRepository, RideRepositoryError};
use crate::domain::{ErrorCode, RideStatus};
use crate::test_support::{FixtureClock, InMemoryRideRepository, InMemoryStore, sample_draft};

struct Harness {
    store: Arc<InMemoryStore>,
    clock: Arc<FixtureClock>,
    service: RideLedgerService<InMemoryRideRepository>,
}

#[fixture]
fn harness() -> Harness {
    let store = InMemoryStore::new();
    let clock = Arc::new(FixtureClock::fixed());
    let service = RideLedgerService::new(
        Arc::new(InMemoryRideRepository::new(Arc::clone(&store))),
        clock.clone(),
    );
    Harness {
        store,
        clock,
        service,
    }
}

impl Harness {
    async fn scheduled(&self, driver: UserId) -> Ride {
        let when = self.clock.utc() + Duration::hours(2);
        self.service
            .create_ride(driver, Role::Driver, sample_draft(when))
            .await
            .expect("ride scheduled")
    }

    async fn matched(&self, driver: UserId, rider: UserId) -> Ride {
        let ride = self.scheduled(driver).await;
        self.service
            .join(ride.id(), rider, Role::Rider)
            .await
            .expect("rider joins")
    }
}

#[rstest]
#[case(Role::Driver)]
#[case(Role::Rider)]
#[tokio::test]
async fn create_places_creator_by_role(harness: Harness, #[case] role: Role) {
    let creator = UserId::random();
    let when = harness.clock.utc() + Duration::hours(1);
    let ride = harness
        .service
        .create_ride(creator, role, sample_draft(when))
        .await
        .expect("ride scheduled");

    assert_eq!(ride.status(), RideStatus::Scheduled);
    let expected = match role {
        Role::Driver => (Some(creator), None),
        Role::Rider => (None, Some(creator)),
    };
    assert_eq!((ride.driver_id(), ride.rider_id()), expected);
    assert_eq!(harness.store.ride(ride.id()), Some(ride));
}

#[rstest]
#[tokio::test]
async fn create_rejects_invalid_draft(harness: Harness) {
    let mut draft = sample_draft(harness.clock.utc());
    draft.seats_available = Some(-1);
    let err = harness
        .service
        .create_ride(UserId::random(), Role::Driver, draft)
        .await
        .expect_err("negative seats");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn list_returns_only_callers_rides(harness: Harness) {
    let driver = UserId::random();
    let rider = UserId::random();
    let shared = harness.matched(driver, rider).await;
    let other = harness.scheduled(UserId::random()).await;

    let rides = harness
        .service
        .list_rides_for(rider)
        .await
        .expect("list rides");

    let ids: Vec<_> = rides.iter().map(Ride::id).collect();
    assert_eq!(ids, vec![shared.id()]);
    assert!(!ids.contains(&other.id()));
}

#[rstest]
#[tokio::test]
async fn get_ride_hides_rides_from_outsiders(harness: Harness) {
    let ride = harness.scheduled(UserId::random()).await;
    let err = harness
        .service
        .get_ride(ride.id(), UserId::random())
        .await
        .expect_err("outsider");
    assert_eq!(err.code(), ErrorCode::Forbidden);

    let missing = harness
        .service
        .get_ride(RideId::random(), UserId::random())
        .await
        .expect_err("missing");
    assert_eq!(missing.code(), ErrorCode::NotFound);
    assert_eq!(missing.message(), "Ride not found");
}

#[rstest]
#[tokio::test]
async fn full_lifecycle_stamps_times(harness: Harness) {
    let driver = UserId::random();
    let rider = UserId::random();
    let ride = harness.matched(driver, rider).await;

    harness.clock.advance(Duration::minutes(5));
    let started = harness
        .service
        .transition(ride.id(), driver, StatusChange::to(RideStatus::Active))
        .await
        .expect("start");
    assert_eq!(started.actual_start_time(), Some(harness.clock.utc()));

    harness.clock.advance(Duration::minutes(30));
    let finished = harness
        .service
        .transition(ride.id(), rider, StatusChange::to(RideStatus::Completed))
        .await
        .expect("finish");
    assert_eq!(finished.status(), RideStatus::Completed);
    assert_eq!(finished.actual_end_time(), Some(harness.clock.utc()));
    assert_eq!(harness.store.ride(ride.id()), Some(finished));
}

#[rstest]
#[tokio::test]
async fn illegal_transition_reports_both_states(harness: Harness) {
    let driver = UserId::random();
    let ride = harness.scheduled(driver).await;

    let err = harness
        .service
        .transition(ride.id(), driver, StatusChange::to(RideStatus::Completed))
        .await
        .expect_err("scheduled cannot complete");

    assert_eq!(err.code(), ErrorCode::IllegalTransition);
    assert_eq!(
        err.details(),
        Some(&json!({
            "from": "scheduled",
            "to": "completed",
            "allowed": ["active", "cancelled"],
        }))
    );
    assert_eq!(harness.store.ride(ride.id()), Some(ride));
}

#[rstest]
#[tokio::test]
async fn outsiders_cannot_transition(harness: Harness) {
    let ride = harness.scheduled(UserId::random()).await;
    let err = harness
        .service
        .transition(
            ride.id(),
            UserId::random(),
            StatusChange::to(RideStatus::Cancelled),
        )
        .await
        .expect_err("outsider");
    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn misplaced_timestamp_is_invalid_request(harness: Harness) {
    let driver = UserId::random();
    let ride = harness.scheduled(driver).await;
    let change = StatusChange {
        actual_end_time: Some(harness.clock.utc()),
        ..StatusChange::to(RideStatus::Active)
    };
    let err = harness
        .service
        .transition(ride.id(), driver, change)
        .await
        .expect_err("end time while starting");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[case(Role::Driver)]
#[case(Role::Rider)]
#[tokio::test]
async fn join_rejects_taken_slots_and_repeat_joins(harness: Harness, #[case] role: Role) {
    let driver = UserId::random();
    let rider = UserId::random();
    let ride = harness.matched(driver, rider).await;
    let err = harness
        .service
        .join(ride.id(), UserId::random(), role)
        .await
        .expect_err("slot taken");
    assert_eq!(err.code(), ErrorCode::Conflict);

    let repeat = harness
        .service
        .join(ride.id(), rider, Role::Driver)
        .await
        .expect_err("already participant");
    assert_eq!(repeat.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn join_consumes_a_seat(harness: Harness) {
    let ride = harness.scheduled(UserId::random()).await;
    let joined = harness
        .service
        .join(ride.id(), UserId::random(), Role::Rider)
        .await
        .expect("join");
    assert_eq!(joined.seats_available(), ride.seats_available() - 1);
}

#[rstest]
#[tokio::test]
async fn join_requires_scheduled_ride(harness: Harness) {
    let driver = UserId::random();
    let ride = harness.scheduled(driver).await;
    harness
        .service
        .transition(ride.id(), driver, StatusChange::to(RideStatus::Cancelled))
        .await
        .expect("cancel");
    let err = harness
        .service
        .join(ride.id(), UserId::random(), Role::Rider)
        .await
        .expect_err("cancelled ride");
    assert_eq!(err.code(), ErrorCode::InvalidState);
}

#[rstest]
#[tokio::test]
async fn stale_write_surfaces_as_conflict() {
    let driver = UserId::random();
    let clock = Arc::new(FixtureClock::fixed());
    let ride = Ride::schedule(driver, Role::Driver, sample_draft(clock.utc()), clock.utc())
        .expect("valid ride");
    let ride_id = ride.id();

    let mut rides = MockRideRepository::new();
    rides
        .expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(ride)));
    rides
        .expect_update()
        .withf(|updated, expected| updated.revision() == expected + 1 && *expected == 0)
        .times(1)
        .return_once(move |_, expected| {
            Err(RideRepositoryError::stale_revision(ride_id.to_string(), expected))
        });
    let service = RideLedgerService::new(Arc::new(rides), clock);

    let err = service
        .transition(ride_id, driver, StatusChange::to(RideStatus::Active))
        .await
        .expect_err("lost the race");
    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn unreachable_repository_is_service_unavailable() {
    let mut rides = MockRideRepository::new();
    rides
        .expect_list_for_participant()
        .return_once(|_| Err(RideRepositoryError::connection("pool exhausted")));
    let service = RideLedgerService::new(Arc::new(rides), Arc::new(FixtureClock::fixed()));

    let err = service
        .list_rides_for(UserId::random())
        .await
        .expect_err("down");
    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
}
