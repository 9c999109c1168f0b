//! Deterministic auth provider.

use crate::domain::ports::{AccessToken, AuthProvider, AuthProviderError};
use crate::domain::{CredentialHash, EmailAddress};

const HASH_PREFIX: &str = "stub$";
const TOKEN_PREFIX: &str = "stub-token:";

/// Reversible "hashing" and tokens of the form `stub-token:<email>`.
///
/// Fast and predictable, so HTTP tests can mint tokens without a login.
#[derive(Debug, Default, Clone, Copy)]
pub struct StubAuthProvider;

impl StubAuthProvider {
    /// Token the provider would issue for `email`.
    #[must_use]
    pub fn token_for(email: &str) -> String {
        format!("{TOKEN_PREFIX}{}", email.to_lowercase())
    }
}

impl AuthProvider for StubAuthProvider {
    fn hash_secret(&self, secret: &str) -> Result<CredentialHash, AuthProviderError> {
        Ok(CredentialHash::new(format!("{HASH_PREFIX}{secret}")))
    }

    fn verify_secret(&self, secret: &str, hash: &CredentialHash) -> bool {
        hash.as_str()
            .strip_prefix(HASH_PREFIX)
            .is_some_and(|stored| stored == secret)
    }

    fn issue_token(&self, subject: &EmailAddress) -> Result<AccessToken, AuthProviderError> {
        Ok(AccessToken::new(Self::token_for(subject.as_ref())))
    }

    fn resolve_token(&self, token: &str) -> Result<EmailAddress, AuthProviderError> {
        let subject = token
            .strip_prefix(TOKEN_PREFIX)
            .ok_or_else(|| AuthProviderError::invalid_token("unrecognised token"))?;
        EmailAddress::new(subject).map_err(|err| AuthProviderError::invalid_token(err.to_string()))
    }
}
