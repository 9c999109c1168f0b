//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every malformed input, whether a body that fails to deserialise or a
//! field the domain rejects, leaves as `invalid_request` with a `details`
//! object naming the offending field.

use std::fmt::Display;

use actix_web::{HttpRequest, error::JsonPayloadError, web};
use serde_json::json;
use uuid::Uuid;

use crate::domain::{
    CredentialsValidationError, Error, MessageId, RideId, RideValidationError,
    UserValidationError,
};

/// Validation error codes carried in `details.code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    InvalidUuid,
    InvalidBody,
    InvalidField,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidBody => "invalid_body",
            ErrorCode::InvalidField => "invalid_field",
        }
    }
}

/// Newtype wrapper for HTTP field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &'static str {
        self.0
    }
}

struct ValidationError {
    field: &'static str,
    message: String,
}

impl ValidationError {
    fn new(field: FieldName, message: impl Into<String>) -> Self {
        Self {
            field: field.as_str(),
            message: message.into(),
        }
    }

    fn with_code(self, code: ErrorCode) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "code": code.as_str(),
        }))
    }

    fn with_value(self, code: ErrorCode, value: impl Into<String>) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "value": value.into(),
            "code": code.as_str(),
        }))
    }
}

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let name = field.as_str();
    ValidationError::new(field, format!("{name} must be a valid UUID"))
        .with_value(ErrorCode::InvalidUuid, value)
}

pub(crate) fn parse_uuid(value: &str, field: FieldName) -> Result<Uuid, Error> {
    Uuid::parse_str(value.trim()).map_err(|_| invalid_uuid_error(field, value))
}

pub(crate) fn parse_ride_id(value: &str) -> Result<RideId, Error> {
    parse_uuid(value, FieldName::new("ride_id")).map(RideId::from_uuid)
}

pub(crate) fn parse_message_id(value: &str) -> Result<MessageId, Error> {
    parse_uuid(value, FieldName::new("message_id")).map(MessageId::from_uuid)
}

/// Report a domain validation failure against a named field.
pub(crate) fn invalid_field(field: FieldName, err: impl Display) -> Error {
    ValidationError::new(field, err.to_string()).with_code(ErrorCode::InvalidField)
}

pub(crate) fn user_validation_error(err: UserValidationError) -> Error {
    let field = match &err {
        UserValidationError::EmptyEmail | UserValidationError::InvalidEmail => "email",
        UserValidationError::InvalidRole => "user_type",
        UserValidationError::FieldTooLong { field, .. } => *field,
    };
    invalid_field(FieldName::new(field), err)
}

pub(crate) fn credentials_validation_error(err: CredentialsValidationError) -> Error {
    match err {
        CredentialsValidationError::Email(inner) => user_validation_error(inner),
        CredentialsValidationError::EmptyPassword
        | CredentialsValidationError::PasswordTooShort { .. } => {
            invalid_field(FieldName::new("password"), err)
        }
        CredentialsValidationError::PasswordMismatch => {
            invalid_field(FieldName::new("confirm_password"), err)
        }
    }
}

pub(crate) fn ride_validation_error(err: RideValidationError) -> Error {
    let field = match &err {
        RideValidationError::EmptyLabel { field }
        | RideValidationError::NonFiniteCoordinate { field }
        | RideValidationError::CoordinateOutOfRange { field, .. }
        | RideValidationError::TextTooLong { field, .. }
        | RideValidationError::CountTooLarge { field, .. }
        | RideValidationError::UnexpectedTimestamp { field, .. } => *field,
        RideValidationError::NegativeSeats => "seats_available",
        RideValidationError::NegativeDuration => "estimated_duration",
        RideValidationError::MissingParticipant => "role",
        RideValidationError::EndBeforeStart => "actual_end_time",
    };
    invalid_field(FieldName::new(field), err)
}

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let message = match &err {
        JsonPayloadError::ContentType => "request body must be application/json".to_owned(),
        JsonPayloadError::Deserialize(inner) => format!("invalid request body: {inner}"),
        other => format!("invalid request body: {other}"),
    };
    Error::invalid_request(message)
        .with_details(json!({ "code": ErrorCode::InvalidBody.as_str() }))
        .into()
}

/// JSON extractor configuration reporting failures in the error envelope.
#[must_use]
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(json_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ErrorCode as DomainCode, RideStatus};
    use rstest::rstest;
    use serde_json::Value;

    #[rstest]
    fn parse_uuid_rejects_garbage_with_field_context() {
        let err = parse_ride_id("not-a-uuid").expect_err("invalid uuid");

        assert_eq!(err.code(), DomainCode::InvalidRequest);
        assert_eq!(err.message(), "ride_id must be a valid UUID");
        assert_eq!(
            err.details(),
            Some(&json!({ "field": "ride_id", "value": "not-a-uuid", "code": "invalid_uuid" }))
        );
    }

    #[rstest]
    fn parse_uuid_accepts_padded_input() {
        let id = parse_message_id(" 3fa85f64-5717-4562-b3fc-2c963f66afa6 ").expect("valid");
        assert_eq!(
            id.as_uuid().to_string(),
            "3fa85f64-5717-4562-b3fc-2c963f66afa6"
        );
    }

    fn field_of(err: &Error) -> Option<&str> {
        err.details()
            .and_then(|details| details.get("field"))
            .and_then(Value::as_str)
    }

    #[rstest]
    #[case(CredentialsValidationError::EmptyPassword, "password")]
    #[case(CredentialsValidationError::PasswordTooShort { min: 6 }, "password")]
    #[case(CredentialsValidationError::PasswordMismatch, "confirm_password")]
    #[case(
        CredentialsValidationError::Email(UserValidationError::InvalidEmail),
        "email"
    )]
    fn credential_errors_name_their_field(
        #[case] err: CredentialsValidationError,
        #[case] field: &str,
    ) {
        let mapped = credentials_validation_error(err);
        assert_eq!(mapped.code(), DomainCode::InvalidRequest);
        assert_eq!(field_of(&mapped), Some(field));
    }

    #[rstest]
    #[case(RideValidationError::NegativeSeats, "seats_available")]
    #[case(RideValidationError::EndBeforeStart, "actual_end_time")]
    #[case(
        RideValidationError::CountTooLarge { field: "estimated_duration", max: u32::MAX },
        "estimated_duration"
    )]
    #[case(
        RideValidationError::CoordinateOutOfRange {
            field: "pickup_latitude",
            limit: 90,
            value: 91.0,
        },
        "pickup_latitude"
    )]
    #[case(
        RideValidationError::UnexpectedTimestamp {
            field: "actual_start_time",
            status: RideStatus::Active,
        },
        "actual_start_time"
    )]
    fn ride_errors_name_their_field(#[case] err: RideValidationError, #[case] field: &str) {
        let message = err.to_string();
        let mapped = ride_validation_error(err);
        assert_eq!(field_of(&mapped), Some(field));
        assert_eq!(mapped.message(), message);
    }
}
