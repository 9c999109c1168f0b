//! Driving port for account management.

use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, ProfileUpdate, SignupRequest, User, UserId};

use super::AccessToken;

/// A user together with a freshly issued bearer token.
#[derive(Debug, Clone)]
pub struct AuthSession {
    /// The authenticated user.
    pub user: User,
    /// Token to present on protected routes.
    pub access_token: AccessToken,
}

/// Account use-cases: signup, login, profile and bearer resolution.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Register a new account and issue a token.
    ///
    /// Fails with `duplicate_email` when the normalised email is taken.
    async fn register(&self, request: SignupRequest) -> Result<AuthSession, Error>;

    /// Verify credentials and issue a token.
    ///
    /// Unknown emails and wrong passwords fail identically with
    /// `invalid_credentials`.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<AuthSession, Error>;

    /// Apply a partial profile update.
    async fn update_profile(&self, user_id: UserId, update: ProfileUpdate) -> Result<User, Error>;

    /// Load a user by identifier.
    async fn get_user(&self, user_id: UserId) -> Result<User, Error>;

    /// Resolve a bearer token to an active user, failing with `unauthorized`.
    async fn resolve_bearer(&self, token: &str) -> Result<User, Error>;
}
