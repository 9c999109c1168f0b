//! HTTP state over the in-memory adapters.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::{
    IdentityService, MessageLedgerService, RatingLedgerService, RideLedgerService,
};
use crate::inbound::http::state::HttpState;

use super::{
    InMemoryMessageRepository, InMemoryRatingRepository, InMemoryRideRepository, InMemoryStore,
    InMemoryUserRepository, StubAuthProvider,
};

/// Wire the four services over `store`, with stub credentials and `clock`.
#[must_use]
pub fn in_memory_http_state(store: &Arc<InMemoryStore>, clock: Arc<dyn Clock>) -> HttpState {
    let rides = Arc::new(InMemoryRideRepository::new(Arc::clone(store)));
    HttpState::new(
        Arc::new(IdentityService::new(
            Arc::new(InMemoryUserRepository::new(Arc::clone(store))),
            Arc::new(StubAuthProvider),
            Arc::clone(&clock),
        )),
        Arc::new(RideLedgerService::new(Arc::clone(&rides), Arc::clone(&clock))),
        Arc::new(RatingLedgerService::new(
            Arc::clone(&rides),
            Arc::new(InMemoryRatingRepository::new(Arc::clone(store))),
            Arc::clone(&clock),
        )),
        Arc::new(MessageLedgerService::new(
            rides,
            Arc::new(InMemoryMessageRepository::new(Arc::clone(store))),
            clock,
        )),
    )
}
