//! Builders for the shared HTTP state.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};

use carpool_backend::domain::ports::{
    AuthProvider, MessageRepository, RatingRepository, RideRepository, UserRepository,
};
use carpool_backend::domain::{
    IdentityService, MessageLedgerService, RatingLedgerService, RideLedgerService,
};
use carpool_backend::inbound::http::state::HttpState;
use carpool_backend::outbound::persistence::{
    DieselMessageRepository, DieselRatingRepository, DieselRideRepository, DieselUserRepository,
};

use super::ServerConfig;

/// Repositories the four services are wired over.
pub(super) struct Repositories<U, R, G, M> {
    pub users: Arc<U>,
    pub rides: Arc<R>,
    pub ratings: Arc<G>,
    pub messages: Arc<M>,
}

/// Wire the identity store and the three ledgers over `repos`.
///
/// The ride repository is shared so ratings and messages see the same
/// participants the ride ledger writes.
pub(super) fn build_ports<U, R, G, M>(
    repos: Repositories<U, R, G, M>,
    auth: Arc<dyn AuthProvider>,
    clock: Arc<dyn Clock>,
) -> HttpState
where
    U: UserRepository + 'static,
    R: RideRepository + 'static,
    G: RatingRepository + 'static,
    M: MessageRepository + 'static,
{
    let Repositories {
        users,
        rides,
        ratings,
        messages,
    } = repos;
    HttpState::new(
        Arc::new(IdentityService::new(users, auth, Arc::clone(&clock))),
        Arc::new(RideLedgerService::new(Arc::clone(&rides), Arc::clone(&clock))),
        Arc::new(RatingLedgerService::new(
            Arc::clone(&rides),
            ratings,
            Arc::clone(&clock),
        )),
        Arc::new(MessageLedgerService::new(rides, messages, clock)),
    )
}

/// Build the shared HTTP state from the configured pool and auth provider.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let pool = &config.db_pool;
    let repos = Repositories {
        users: Arc::new(DieselUserRepository::new(pool.clone())),
        rides: Arc::new(DieselRideRepository::new(pool.clone())),
        ratings: Arc::new(DieselRatingRepository::new(pool.clone())),
        messages: Arc::new(DieselMessageRepository::new(pool.clone())),
    };
    web::Data::new(build_ports(
        repos,
        Arc::clone(&config.auth),
        Arc::new(DefaultClock),
    ))
}
