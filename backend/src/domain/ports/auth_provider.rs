//! Credential hashing and bearer token capability.
//!
//! Synchronous by design: hashing is CPU bound, so callers decide whether to
//! move it onto a blocking thread.

use std::fmt;

use crate::domain::{CredentialHash, EmailAddress};

use super::define_port_error;

define_port_error! {
    /// Errors raised by auth provider adapters.
    pub enum AuthProviderError {
        /// The secret could not be hashed.
        Hashing { message: String } => "credential hashing failed: {message}",
        /// A token could not be minted.
        Issue { message: String } => "token issuance failed: {message}",
        /// The token is malformed, forged or expired.
        InvalidToken { message: String } => "invalid token: {message}",
    }
}

/// Opaque bearer token.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap an encoded token.
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Encoded token for the `Authorization` header.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// Password hashing and token issuance/verification.
#[cfg_attr(test, mockall::automock)]
pub trait AuthProvider: Send + Sync {
    /// Hash a plaintext secret for storage.
    fn hash_secret(&self, secret: &str) -> Result<CredentialHash, AuthProviderError>;

    /// Check a plaintext secret against a stored hash.
    fn verify_secret(&self, secret: &str, hash: &CredentialHash) -> bool;

    /// Mint a bearer token whose subject is `subject`.
    fn issue_token(&self, subject: &EmailAddress) -> Result<AccessToken, AuthProviderError>;

    /// Validate a bearer token and return its subject.
    fn resolve_token(&self, token: &str) -> Result<EmailAddress, AuthProviderError>;
}
