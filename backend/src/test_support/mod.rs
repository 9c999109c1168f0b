//! In-memory adapters and deterministic collaborators for tests.
//!
//! Compiled for unit tests and behind the `test-support` feature for
//! integration tests. None of this is wired into the production server.

mod auth;
mod clock;
mod http;
mod repositories;
mod rides;

pub use auth::StubAuthProvider;
pub use clock::FixtureClock;
pub use http::in_memory_http_state;
pub use repositories::{
    InMemoryMessageRepository, InMemoryRatingRepository, InMemoryRideRepository,
    InMemoryStore, InMemoryUserRepository,
};
pub use rides::sample_draft;
