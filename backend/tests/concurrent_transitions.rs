//! Two writers racing on the same ride snapshot.

use std::sync::Arc;

use async_trait::async_trait;
use carpool_backend::domain::ports::{RideLedger, RideRepository, RideRepositoryError};
use carpool_backend::domain::{
    ErrorCode, Ride, RideId, RideLedgerService, RideStatus, Role, StatusChange, UserId,
};
use carpool_backend::test_support::{
    FixtureClock, InMemoryRideRepository, InMemoryStore, sample_draft,
};
use chrono::Duration;
use mockable::Clock;
use rstest::rstest;
use tokio::sync::Barrier;

/// Holds every `update` until both writers have read the ride.
struct RendezvousRides {
    inner: InMemoryRideRepository,
    barrier: Barrier,
}

#[async_trait]
impl RideRepository for RendezvousRides {
    async fn insert(&self, ride: &Ride) -> Result<(), RideRepositoryError> {
        self.inner.insert(ride).await
    }

    async fn find_by_id(&self, id: &RideId) -> Result<Option<Ride>, RideRepositoryError> {
        self.inner.find_by_id(id).await
    }

    async fn list_for_participant(&self, user: &UserId) -> Result<Vec<Ride>, RideRepositoryError> {
        self.inner.list_for_participant(user).await
    }

    async fn update(&self, ride: &Ride, expected_revision: i64) -> Result<(), RideRepositoryError> {
        self.barrier.wait().await;
        self.inner.update(ride, expected_revision).await
    }
}

#[rstest]
#[case(RideStatus::Active, RideStatus::Cancelled)]
#[case(RideStatus::Cancelled, RideStatus::Cancelled)]
#[tokio::test]
async fn exactly_one_racing_transition_commits(
    #[case] driver_wants: RideStatus,
    #[case] rider_wants: RideStatus,
) {
    let store = InMemoryStore::new();
    let clock: Arc<dyn Clock> = Arc::new(FixtureClock::fixed());
    let driver = UserId::random();
    let rider = UserId::random();

    let setup = RideLedgerService::new(
        Arc::new(InMemoryRideRepository::new(Arc::clone(&store))),
        Arc::clone(&clock),
    );
    let ride = setup
        .create_ride(driver, Role::Driver, sample_draft(clock.utc() + Duration::days(1)))
        .await
        .expect("ride created");
    setup
        .join(ride.id(), rider, Role::Rider)
        .await
        .expect("rider joins");

    let racing = RideLedgerService::new(
        Arc::new(RendezvousRides {
            inner: InMemoryRideRepository::new(Arc::clone(&store)),
            barrier: Barrier::new(2),
        }),
        clock,
    );
    let (first, second) = tokio::join!(
        racing.transition(ride.id(), driver, StatusChange::to(driver_wants)),
        racing.transition(ride.id(), rider, StatusChange::to(rider_wants)),
    );

    let outcomes = [first, second];
    let committed: Vec<&Ride> = outcomes.iter().filter_map(|r| r.as_ref().ok()).collect();
    assert_eq!(committed.len(), 1, "exactly one writer commits");

    let loser = outcomes
        .iter()
        .find_map(|r| r.as_ref().err())
        .expect("one writer loses");
    assert!(matches!(
        loser.code(),
        ErrorCode::Conflict | ErrorCode::IllegalTransition
    ));

    let stored = store.ride(ride.id()).expect("ride stored");
    assert_eq!(stored.status(), committed[0].status());
    assert_eq!(stored.revision(), committed[0].revision());
}
