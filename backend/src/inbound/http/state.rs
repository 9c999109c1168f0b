//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on the driving ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{IdentityStore, MessageLedger, RatingLedger, RideLedger};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub identity: Arc<dyn IdentityStore>,
    pub rides: Arc<dyn RideLedger>,
    pub ratings: Arc<dyn RatingLedger>,
    pub messages: Arc<dyn MessageLedger>,
}

impl HttpState {
    /// Bundle the four driving ports.
    pub fn new(
        identity: Arc<dyn IdentityStore>,
        rides: Arc<dyn RideLedger>,
        ratings: Arc<dyn RatingLedger>,
        messages: Arc<dyn MessageLedger>,
    ) -> Self {
        Self {
            identity,
            rides,
            ratings,
            messages,
        }
    }
}
