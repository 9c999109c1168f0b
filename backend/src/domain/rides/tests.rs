//! Regression coverage for the ride lifecycle.

use chrono::{DateTime, Duration, TimeZone, Utc};
use rstest::{fixture, rstest};

use super::*;
use crate::domain::{Role, UserId};

#[fixture]
fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0)
        .single()
        .expect("valid timestamp")
}

#[fixture]
fn draft(now: DateTime<Utc>) -> RideDraft {
    RideDraft {
        pickup: Location::new("pickup", "Central Station", 52.52, 13.405).expect("pickup"),
        destination: Location::new("destination", "Airport", 52.36, 13.50).expect("destination"),
        scheduled_time: now + Duration::hours(2),
        seats_available: None,
        notes: Some("  bring snacks ".to_owned()),
        route_polyline: None,
        estimated_duration: Some(35),
    }
}

#[fixture]
fn driver() -> UserId {
    UserId::random()
}

#[fixture]
fn ride(driver: UserId, draft: RideDraft, now: DateTime<Utc>) -> Ride {
    Ride::schedule(driver, Role::Driver, draft, now).expect("valid ride")
}

#[rstest]
#[case(RideStatus::Scheduled, RideStatus::Active, true)]
#[case(RideStatus::Scheduled, RideStatus::Cancelled, true)]
#[case(RideStatus::Active, RideStatus::Completed, true)]
#[case(RideStatus::Active, RideStatus::Cancelled, true)]
#[case(RideStatus::Scheduled, RideStatus::Completed, false)]
#[case(RideStatus::Scheduled, RideStatus::Scheduled, false)]
#[case(RideStatus::Active, RideStatus::Scheduled, false)]
#[case(RideStatus::Completed, RideStatus::Active, false)]
#[case(RideStatus::Completed, RideStatus::Cancelled, false)]
#[case(RideStatus::Cancelled, RideStatus::Scheduled, false)]
fn transition_graph(#[case] from: RideStatus, #[case] to: RideStatus, #[case] allowed: bool) {
    assert_eq!(from.can_transition_to(to), allowed);
}

#[rstest]
fn terminal_states_have_no_successors() {
    for status in RideStatus::ALL {
        assert_eq!(status.is_terminal(), status.successors().is_empty());
    }
}

#[rstest]
#[case("Scheduled", RideStatus::Scheduled)]
#[case("cancelled", RideStatus::Cancelled)]
fn status_parses_case_insensitively(#[case] raw: &str, #[case] expected: RideStatus) {
    assert_eq!(raw.parse::<RideStatus>(), Ok(expected));
}

#[rstest]
fn status_rejects_unknown_value() {
    assert!("finished".parse::<RideStatus>().is_err());
}

#[rstest]
fn driver_creation_fills_driver_slot(ride: Ride, driver: UserId) {
    assert_eq!(ride.driver_id(), Some(driver));
    assert_eq!(ride.rider_id(), None);
    assert_eq!(ride.status(), RideStatus::Scheduled);
    assert_eq!(ride.seats_available(), 1);
    assert_eq!(ride.notes(), Some("bring snacks"));
    assert_eq!(ride.revision(), 0);
}

#[rstest]
fn rider_creation_fills_rider_slot(draft: RideDraft, now: DateTime<Utc>) {
    let rider = UserId::random();
    let created = Ride::schedule(rider, Role::Rider, draft, now).expect("valid ride");
    assert_eq!(created.rider_id(), Some(rider));
    assert_eq!(created.driver_id(), None);
}

#[rstest]
#[case(Some(-1), None, RideValidationError::NegativeSeats)]
#[case(None, Some(-5), RideValidationError::NegativeDuration)]
#[case(
    Some(i64::from(u32::MAX) + 1),
    None,
    RideValidationError::CountTooLarge { field: "seats_available", max: u32::MAX }
)]
#[case(
    None,
    Some(i64::MAX),
    RideValidationError::CountTooLarge { field: "estimated_duration", max: u32::MAX }
)]
fn schedule_rejects_out_of_range_counts(
    mut draft: RideDraft,
    now: DateTime<Utc>,
    #[case] seats: Option<i64>,
    #[case] duration: Option<i64>,
    #[case] expected: RideValidationError,
) {
    draft.seats_available = seats;
    draft.estimated_duration = duration;
    let err = Ride::schedule(UserId::random(), Role::Driver, draft, now).expect_err("invalid");
    assert_eq!(err, expected);
}

#[rstest]
fn schedule_accepts_zero_seats(mut draft: RideDraft, now: DateTime<Utc>) {
    draft.seats_available = Some(0);
    let created = Ride::schedule(UserId::random(), Role::Driver, draft, now).expect("valid");
    assert_eq!(created.seats_available(), 0);
}

#[rstest]
#[case(f64::NAN, 0.0, "pickup_latitude")]
#[case(0.0, f64::INFINITY, "pickup_longitude")]
fn location_rejects_non_finite(
    #[case] lat: f64,
    #[case] lng: f64,
    #[case] field: &'static str,
) {
    let err = Location::new("pickup", "Somewhere", lat, lng).expect_err("invalid");
    assert_eq!(err, RideValidationError::NonFiniteCoordinate { field });
}

#[rstest]
fn location_rejects_out_of_range_latitude() {
    let err = Location::new("destination", "North", 91.0, 0.0).expect_err("invalid");
    assert!(matches!(
        err,
        RideValidationError::CoordinateOutOfRange {
            field: "destination_latitude",
            limit: 90,
            ..
        }
    ));
}

#[rstest]
fn location_rejects_blank_label() {
    let err = Location::new("pickup", "  ", 0.0, 0.0).expect_err("invalid");
    assert_eq!(
        err,
        RideValidationError::EmptyLabel {
            field: "pickup_location"
        }
    );
}

#[rstest]
fn full_lifecycle_stamps_times(mut ride: Ride, now: DateTime<Utc>) {
    let start = now + Duration::hours(2);
    let end = start + Duration::minutes(40);

    ride.transition(
        StatusChange {
            actual_start_time: Some(start),
            ..StatusChange::to(RideStatus::Active)
        },
        now,
    )
    .expect("scheduled -> active");
    ride.transition(
        StatusChange {
            actual_end_time: Some(end),
            notes: Some("smooth trip".to_owned()),
            ..StatusChange::to(RideStatus::Completed)
        },
        now,
    )
    .expect("active -> completed");

    assert_eq!(ride.status(), RideStatus::Completed);
    assert_eq!(ride.actual_start_time(), Some(start));
    assert_eq!(ride.actual_end_time(), Some(end));
    assert_eq!(ride.notes(), Some("smooth trip"));
    assert_eq!(ride.revision(), 2);
}

#[rstest]
fn transition_defaults_timestamps_to_now(mut ride: Ride, now: DateTime<Utc>) {
    ride.transition(StatusChange::to(RideStatus::Active), now)
        .expect("scheduled -> active");
    assert_eq!(ride.actual_start_time(), Some(now));
}

#[rstest]
fn illegal_transition_leaves_ride_untouched(mut ride: Ride, now: DateTime<Utc>) {
    let before = ride.clone();
    let err = ride
        .transition(StatusChange::to(RideStatus::Completed), now)
        .expect_err("scheduled -> completed is illegal");
    assert_eq!(
        err,
        TransitionError::Illegal {
            from: RideStatus::Scheduled,
            to: RideStatus::Completed
        }
    );
    assert_eq!(ride, before);
}

#[rstest]
fn end_before_start_is_rejected(mut ride: Ride, now: DateTime<Utc>) {
    ride.transition(StatusChange::to(RideStatus::Active), now)
        .expect("scheduled -> active");
    let before = ride.clone();
    let err = ride
        .transition(
            StatusChange {
                actual_end_time: Some(now - Duration::minutes(1)),
                ..StatusChange::to(RideStatus::Completed)
            },
            now,
        )
        .expect_err("end before start");
    assert_eq!(
        err,
        TransitionError::Invalid(RideValidationError::EndBeforeStart)
    );
    assert_eq!(ride, before);
}

#[rstest]
fn end_time_outside_completion_is_rejected(mut ride: Ride, now: DateTime<Utc>) {
    let err = ride
        .transition(
            StatusChange {
                actual_end_time: Some(now),
                ..StatusChange::to(RideStatus::Cancelled)
            },
            now,
        )
        .expect_err("end time on cancel");
    assert!(matches!(
        err,
        TransitionError::Invalid(RideValidationError::UnexpectedTimestamp {
            field: "actual_end_time",
            ..
        })
    ));
}

#[rstest]
fn rider_join_consumes_a_seat(mut ride: Ride, driver: UserId, now: DateTime<Utc>) {
    let rider = UserId::random();
    ride.join(rider, Role::Rider, now).expect("join");
    assert_eq!(ride.rider_id(), Some(rider));
    assert_eq!(ride.seats_available(), 0);
    assert_eq!(ride.counterpart_of(driver), Some(rider));
    assert_eq!(ride.counterpart_of(rider), Some(driver));
}

#[rstest]
fn join_rejections(mut ride: Ride, driver: UserId, now: DateTime<Utc>) {
    assert_eq!(
        ride.join(driver, Role::Rider, now),
        Err(JoinError::AlreadyParticipant)
    );
    assert_eq!(
        ride.join(UserId::random(), Role::Driver, now),
        Err(JoinError::SlotTaken { role: Role::Driver })
    );
    ride.transition(StatusChange::to(RideStatus::Cancelled), now)
        .expect("cancel");
    assert_eq!(
        ride.join(UserId::random(), Role::Rider, now),
        Err(JoinError::NotScheduled {
            status: RideStatus::Cancelled
        })
    );
}

#[rstest]
fn join_without_seats_fails(mut draft: RideDraft, now: DateTime<Utc>) {
    draft.seats_available = Some(0);
    let mut full = Ride::schedule(UserId::random(), Role::Driver, draft, now).expect("valid");
    assert_eq!(
        full.join(UserId::random(), Role::Rider, now),
        Err(JoinError::NoSeatsLeft)
    );
}

#[rstest]
fn counterpart_is_none_for_outsiders_and_empty_slots(ride: Ride, driver: UserId) {
    assert_eq!(ride.counterpart_of(driver), None);
    assert_eq!(ride.counterpart_of(UserId::random()), None);
    assert!(!ride.is_participant(UserId::random()));
}

#[rstest]
fn restore_round_trips_record(ride: Ride) {
    let restored = Ride::restore(ride.to_record()).expect("valid record");
    assert_eq!(restored, ride);
}

#[rstest]
fn restore_rejects_orphan_rows(ride: Ride) {
    let mut record = ride.to_record();
    record.driver_id = None;
    assert_eq!(
        Ride::restore(record),
        Err(RideValidationError::MissingParticipant)
    );
}
