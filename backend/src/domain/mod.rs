//! Domain primitives, aggregates and services.
//!
//! Purpose: define strongly typed entities for identity, rides, ratings and
//! messages, and the services that enforce their invariants. Nothing here
//! knows about HTTP or SQL; adapters reach the domain through [`ports`].
//!
//! Public surface:
//! - `Error`/`ErrorCode`: transport-agnostic failure payload.
//! - `User`, `Ride`, `Rating`, `Message` and their value objects.
//! - `IdentityService`, `RideLedgerService`, `RatingLedgerService`,
//!   `MessageLedgerService`: driving port implementations.

pub mod auth;
pub mod error;
pub mod message;
pub mod ports;
pub mod rating;
pub mod rides;
pub mod trace_id;
pub mod user;

mod identity_service;
mod message_service;
mod rating_service;
mod repository_errors;
mod ride_service;

pub use self::auth::{CredentialsValidationError, LoginCredentials, PASSWORD_MIN, SignupRequest};
pub use self::error::{Error, ErrorCode, TRACE_ID_HEADER};
pub use self::identity_service::IdentityService;
pub use self::message::{Message, MessageContent, MessageId, MessageValidationError};
pub use self::message_service::MessageLedgerService;
pub use self::rating::{
    Rating, RatingId, RatingSubmission, RatingValidationError, Score, normalise_comment,
};
pub use self::rating_service::RatingLedgerService;
pub use self::ride_service::RideLedgerService;
pub use self::rides::{
    Coordinate, JoinError, Location, Ride, RideDraft, RideId, RideRecord, RideStatus,
    RideValidationError, StatusChange, TransitionError,
};
pub use self::trace_id::TraceId;
pub use self::user::{
    CredentialHash, EmailAddress, FieldPatch, ProfileUpdate, Role, User, UserId, UserProfile,
    UserValidationError, normalise_profile_text,
};
