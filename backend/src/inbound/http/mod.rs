//! HTTP inbound adapter exposing REST endpoints.

use actix_web::web;

pub mod accounts;
pub mod auth;
pub mod error;
pub mod health;
pub mod messages;
pub mod ratings;
pub mod rides;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod validation;

pub use error::ApiResult;

/// Register the JSON error handler and every API route.
///
/// Health probes are registered separately because they carry their own
/// state.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use carpool_backend::inbound::http::configure_api;
///
/// let app = App::new().configure(configure_api);
/// ```
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.app_data(validation::json_config())
        .service(accounts::signup)
        .service(accounts::login)
        .service(accounts::get_profile)
        .service(accounts::update_profile)
        .service(rides::create_ride)
        .service(rides::list_rides)
        .service(rides::get_ride)
        .service(rides::update_ride_status)
        .service(rides::join_ride)
        .service(rides::list_ride_messages)
        .service(ratings::submit_rating)
        .service(messages::send_message)
        .service(messages::mark_message_read);
}
