//! Translation of driven-port failures into domain errors.
//!
//! Connectivity problems surface as `service_unavailable`; everything else a
//! caller cannot act on becomes `internal_error` and is logged here, before
//! redaction hides the detail from clients.

use tracing::error;

use super::Error;
use super::ports::{
    AuthProviderError, MessageRepositoryError, RatingRepositoryError, RideRepositoryError,
    UserRepositoryError,
};

pub(crate) fn internal(context: &str, detail: impl std::fmt::Display) -> Error {
    error!(error = %detail, "{context}");
    Error::internal(format!("{context}: {detail}"))
}

pub(crate) fn map_user_error(err: UserRepositoryError) -> Error {
    match err {
        UserRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserRepositoryError::DuplicateEmail { .. } => {
            Error::duplicate_email("Email already registered")
        }
        UserRepositoryError::NotFound { .. } => Error::not_found("User not found"),
        other @ UserRepositoryError::Query { .. } => internal("user repository error", other),
    }
}

pub(crate) fn map_ride_error(err: RideRepositoryError) -> Error {
    match err {
        RideRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("ride repository unavailable: {message}"))
        }
        RideRepositoryError::StaleRevision { .. } => {
            Error::conflict("Ride was modified concurrently; reload and retry")
        }
        other @ (RideRepositoryError::Query { .. } | RideRepositoryError::Corrupt { .. }) => {
            internal("ride repository error", other)
        }
    }
}

pub(crate) fn map_rating_error(err: RatingRepositoryError) -> Error {
    match err {
        RatingRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("rating repository unavailable: {message}"))
        }
        RatingRepositoryError::RideNotCompleted { .. } => {
            Error::invalid_state("Can only rate completed rides")
        }
        other @ RatingRepositoryError::Query { .. } => internal("rating repository error", other),
    }
}

pub(crate) fn map_message_error(err: MessageRepositoryError) -> Error {
    match err {
        MessageRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("message repository unavailable: {message}"))
        }
        other @ MessageRepositoryError::Query { .. } => internal("message repository error", other),
    }
}

pub(crate) fn map_auth_error(err: AuthProviderError) -> Error {
    internal("auth provider error", err)
}
