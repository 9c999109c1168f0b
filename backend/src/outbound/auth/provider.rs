//! Argon2id password hashing and HS256 bearer tokens.

use std::sync::Arc;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::Duration;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::ports::{AccessToken, AuthProvider, AuthProviderError};
use crate::domain::{CredentialHash, EmailAddress};

use super::TokenSettings;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
}

/// [`AuthProvider`] backed by Argon2id and HS256 JWTs.
///
/// Issue times come from the injected clock; expiry is checked against
/// system time by `jsonwebtoken`.
pub struct Argon2JwtAuthProvider {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for Argon2JwtAuthProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Argon2JwtAuthProvider")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl Argon2JwtAuthProvider {
    /// Build a provider from validated settings.
    #[must_use]
    pub fn new(settings: &TokenSettings, clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(&settings.secret),
            decoding: DecodingKey::from_secret(&settings.secret),
            validation,
            ttl: settings.ttl,
            clock,
        }
    }
}

impl AuthProvider for Argon2JwtAuthProvider {
    fn hash_secret(&self, secret: &str) -> Result<CredentialHash, AuthProviderError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(secret.as_bytes(), &salt)
            .map(|hash| CredentialHash::new(hash.to_string()))
            .map_err(|err| AuthProviderError::hashing(err.to_string()))
    }

    fn verify_secret(&self, secret: &str, hash: &CredentialHash) -> bool {
        let Ok(parsed) = PasswordHash::new(hash.as_str()) else {
            debug!("stored credential is not a PHC string");
            return false;
        };
        Argon2::default()
            .verify_password(secret.as_bytes(), &parsed)
            .is_ok()
    }

    fn issue_token(&self, subject: &EmailAddress) -> Result<AccessToken, AuthProviderError> {
        let issued_at = self.clock.utc();
        let claims = Claims {
            sub: subject.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + self.ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map(AccessToken::new)
            .map_err(|err| AuthProviderError::issue(err.to_string()))
    }

    fn resolve_token(&self, token: &str) -> Result<EmailAddress, AuthProviderError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|err| AuthProviderError::invalid_token(err.to_string()))?;
        EmailAddress::new(&data.claims.sub)
            .map_err(|err| AuthProviderError::invalid_token(err.to_string()))
    }
}
