//! Ride fixtures.

use chrono::{DateTime, Utc};

use crate::domain::{Location, RideDraft};

/// A valid draft from the station to the airport.
#[must_use]
pub fn sample_draft(scheduled_time: DateTime<Utc>) -> RideDraft {
    fn location(prefix: &'static str, label: &str, lat: f64, lng: f64) -> Location {
        match Location::new(prefix, label, lat, lng) {
            Ok(location) => location,
            Err(err) => panic!("fixture location is valid: {err}"),
        }
    }
    RideDraft {
        pickup: location("pickup", "Central Station", 52.379, 4.900),
        destination: location("destination", "Schiphol Airport", 52.310, 4.768),
        scheduled_time,
        seats_available: Some(3),
        notes: None,
        route_polyline: None,
        estimated_duration: Some(25),
    }
}
