//! User identity model.
//!
//! A [`User`] is created at signup and mutated only through a
//! [`ProfileUpdate`]. Email addresses are case-normalised on construction so
//! that uniqueness checks are case-insensitive everywhere downstream.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Validation errors raised by user value objects.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// Email was blank once trimmed.
    #[error("email is required")]
    EmptyEmail,
    /// Email did not look like `local@domain`.
    #[error("email must be a valid address")]
    InvalidEmail,
    /// Role was neither `driver` nor `rider`.
    #[error("user type must be 'driver' or 'rider'")]
    InvalidRole,
    /// A profile text field exceeded its maximum length.
    #[error("{field} must be at most {max} characters")]
    FieldTooLong {
        /// Offending field.
        field: &'static str,
        /// Maximum permitted length in characters.
        max: usize,
    },
}

/// Stable user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = String, format = Uuid)]
pub struct UserId(Uuid);

impl UserId {
    /// Generate a new random identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Case-normalised email address.
///
/// # Examples
/// ```
/// use carpool_backend::domain::EmailAddress;
///
/// let email = EmailAddress::new("  Ada@Example.COM ").expect("valid email");
/// assert_eq!(email.as_ref(), "ada@example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

/// Maximum accepted email length.
pub const EMAIL_MAX: usize = 254;

impl EmailAddress {
    /// Validate, trim and lowercase an email address.
    ///
    /// # Errors
    /// Returns [`UserValidationError`] when the input is blank, too long, or
    /// lacks a non-empty local part and dotted domain.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let normalised = raw.as_ref().trim().to_lowercase();
        if normalised.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if normalised.chars().count() > EMAIL_MAX {
            return Err(UserValidationError::FieldTooLong {
                field: "email",
                max: EMAIL_MAX,
            });
        }
        let Some((local, domain)) = normalised.split_once('@') else {
            return Err(UserValidationError::InvalidEmail);
        };
        let domain_ok = !domain.contains('@')
            && domain.contains('.')
            && !domain.starts_with('.')
            && !domain.ends_with('.');
        if local.is_empty() || !domain_ok || normalised.chars().any(char::is_whitespace) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(normalised))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

/// Role a user plays when creating or joining rides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Offers seats in their vehicle.
    Driver,
    /// Occupies a seat.
    Rider,
}

impl Role {
    /// Lowercase wire and storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Driver => "driver",
            Self::Rider => "rider",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "driver" => Ok(Self::Driver),
            "rider" => Ok(Self::Rider),
            _ => Err(UserValidationError::InvalidRole),
        }
    }
}

/// Opaque credential hash produced by the auth provider.
///
/// The value never appears in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialHash(String);

impl CredentialHash {
    /// Wrap an encoded hash.
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Encoded hash string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for CredentialHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CredentialHash(<redacted>)")
    }
}

/// Maximum length of free-text profile fields.
pub const PROFILE_FIELD_MAX: usize = 255;

/// Trim a free-text field, mapping blank input to `None`.
///
/// # Errors
/// Returns [`UserValidationError::FieldTooLong`] above [`PROFILE_FIELD_MAX`].
pub fn normalise_profile_text(
    field: &'static str,
    value: Option<String>,
) -> Result<Option<String>, UserValidationError> {
    let Some(raw) = value else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.chars().count() > PROFILE_FIELD_MAX {
        return Err(UserValidationError::FieldTooLong {
            field,
            max: PROFILE_FIELD_MAX,
        });
    }
    Ok(Some(trimmed.to_owned()))
}

/// Display profile attached to a user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserProfile {
    /// Full name.
    pub name: Option<String>,
    /// Contact phone number.
    pub phone_number: Option<String>,
    /// Date of birth as supplied by the user.
    pub date_of_birth: Option<String>,
    /// Preferred role, if the user has chosen one.
    pub role: Option<Role>,
    /// External Google account identifier.
    pub google_id: Option<String>,
    /// Profile picture URL.
    pub profile_picture: Option<String>,
}

/// Tri-state patch for a single nullable field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FieldPatch<T> {
    /// Leave the stored value untouched.
    #[default]
    Keep,
    /// Reset the stored value to null.
    Clear,
    /// Replace the stored value.
    Set(T),
}

impl<T> FieldPatch<T> {
    /// Build a patch from a "present or absent, null or value" pair.
    pub fn from_presence(value: Option<Option<T>>) -> Self {
        match value {
            None => Self::Keep,
            Some(None) => Self::Clear,
            Some(Some(inner)) => Self::Set(inner),
        }
    }

    fn apply_to(self, slot: &mut Option<T>) {
        match self {
            Self::Keep => {}
            Self::Clear => *slot = None,
            Self::Set(value) => *slot = Some(value),
        }
    }

    /// Transform the carried value, preserving `Keep` and `Clear`.
    ///
    /// # Errors
    /// Propagates the mapping closure's error.
    pub fn try_map<U, E>(self, f: impl FnOnce(T) -> Result<U, E>) -> Result<FieldPatch<U>, E> {
        Ok(match self {
            Self::Keep => FieldPatch::Keep,
            Self::Clear => FieldPatch::Clear,
            Self::Set(value) => FieldPatch::Set(f(value)?),
        })
    }
}

/// Partial profile update; only fields carrying a patch change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    /// Full name patch.
    pub name: FieldPatch<String>,
    /// Phone number patch.
    pub phone_number: FieldPatch<String>,
    /// Date of birth patch.
    pub date_of_birth: FieldPatch<String>,
    /// Role patch.
    pub role: FieldPatch<Role>,
    /// Profile picture patch.
    pub profile_picture: FieldPatch<String>,
}

impl ProfileUpdate {
    /// Returns `true` when no field would change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Registered user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Identifier.
    pub id: UserId,
    /// Normalised email; unique across all users.
    pub email: EmailAddress,
    /// Hash of the login secret.
    pub credential: CredentialHash,
    /// Display profile.
    pub profile: UserProfile,
    /// Whether the email address has been verified.
    pub is_verified: bool,
    /// Inactive users can neither log in nor use tokens.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Build a freshly registered user.
    #[must_use]
    pub fn register(
        email: EmailAddress,
        credential: CredentialHash,
        profile: UserProfile,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: UserId::random(),
            email,
            credential,
            profile,
            is_verified: false,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update and bump `updated_at`.
    pub fn apply_update(&mut self, update: ProfileUpdate, now: DateTime<Utc>) {
        let ProfileUpdate {
            name,
            phone_number,
            date_of_birth,
            role,
            profile_picture,
        } = update;
        name.apply_to(&mut self.profile.name);
        phone_number.apply_to(&mut self.profile.phone_number);
        date_of_birth.apply_to(&mut self.profile.date_of_birth);
        role.apply_to(&mut self.profile.role);
        profile_picture.apply_to(&mut self.profile.profile_picture);
        self.updated_at = now;
    }
}
