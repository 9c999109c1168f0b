//! Authentication primitives: login and signup credentials.
//!
//! Constructors validate raw strings before a handler talks to a port, and
//! secrets are held in [`Zeroizing`] buffers so they are wiped on drop.

use zeroize::Zeroizing;

use super::user::{EmailAddress, UserProfile, UserValidationError};

/// Minimum password length accepted at signup.
pub const PASSWORD_MIN: usize = 6;

/// Validation errors for credential payloads.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialsValidationError {
    /// Email failed validation.
    #[error(transparent)]
    Email(#[from] UserValidationError),
    /// Password was blank.
    #[error("password is required")]
    EmptyPassword,
    /// Password was shorter than [`PASSWORD_MIN`].
    #[error("password must be at least {min} characters long")]
    PasswordTooShort {
        /// Minimum length.
        min: usize,
    },
    /// Confirmation did not match the password.
    #[error("passwords do not match")]
    PasswordMismatch,
}

/// Validated login credentials.
///
/// ## Invariants
/// - `email` is trimmed and lowercased.
/// - `password` is non-empty and keeps caller-provided whitespace.
///
/// # Examples
/// ```
/// use carpool_backend::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("Rider@Example.com", "hunter22").unwrap();
/// assert_eq!(creds.email().as_ref(), "rider@example.com");
/// assert_eq!(creds.password(), "hunter22");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: EmailAddress,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    ///
    /// # Errors
    /// Fails when the email is malformed or the password is blank.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, CredentialsValidationError> {
        let parsed = EmailAddress::new(email)?;
        if password.is_empty() {
            return Err(CredentialsValidationError::EmptyPassword);
        }
        Ok(Self {
            email: parsed,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Normalised email used for lookups.
    #[must_use]
    pub const fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Password provided by the caller.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Validated signup request: credentials plus initial profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupRequest {
    credentials: LoginCredentials,
    profile: UserProfile,
}

impl SignupRequest {
    /// Validate signup inputs.
    ///
    /// `confirm_password` is optional; when present it must equal `password`.
    ///
    /// # Errors
    /// Fails on a malformed email, a short password or a mismatched
    /// confirmation.
    pub fn try_new(
        email: &str,
        password: &str,
        confirm_password: Option<&str>,
        profile: UserProfile,
    ) -> Result<Self, CredentialsValidationError> {
        let credentials = LoginCredentials::try_from_parts(email, password)?;
        if password.chars().count() < PASSWORD_MIN {
            return Err(CredentialsValidationError::PasswordTooShort { min: PASSWORD_MIN });
        }
        if confirm_password.is_some_and(|confirm| confirm != password) {
            return Err(CredentialsValidationError::PasswordMismatch);
        }
        Ok(Self {
            credentials,
            profile,
        })
    }

    /// Credentials the user will log in with.
    #[must_use]
    pub const fn credentials(&self) -> &LoginCredentials {
        &self.credentials
    }

    /// Initial display profile.
    #[must_use]
    pub const fn profile(&self) -> &UserProfile {
        &self.profile
    }

    /// Split into credentials and profile.
    #[must_use]
    pub fn into_parts(self) -> (LoginCredentials, UserProfile) {
        (self.credentials, self.profile)
    }
}
