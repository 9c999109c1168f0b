//! Account management service implementing [`IdentityStore`].
//!
//! Password hashing and verification run on tokio's blocking pool so that
//! Argon2 work never stalls the request executor. Logins for unknown or
//! inactive accounts verify against a placeholder hash so every rejected
//! login pays the same hashing cost.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tokio::sync::OnceCell;
use tracing::{debug, info};
use zeroize::Zeroizing;

use super::ports::{AccessToken, AuthProvider, AuthSession, IdentityStore, UserRepository};
use super::repository_errors::{internal, map_auth_error, map_user_error};
use super::{
    CredentialHash, EmailAddress, Error, LoginCredentials, ProfileUpdate, SignupRequest, User,
    UserId,
};

const INVALID_CREDENTIALS: &str = "Invalid credentials";
const PLACEHOLDER_SECRET: &str = "carpool-placeholder-credential";

/// Identity store backed by a [`UserRepository`] and an [`AuthProvider`].
#[derive(Clone)]
pub struct IdentityService<U> {
    users: Arc<U>,
    auth: Arc<dyn AuthProvider>,
    clock: Arc<dyn Clock>,
    placeholder: Arc<OnceCell<CredentialHash>>,
}

impl<U> IdentityService<U> {
    /// Create a service over the given collaborators.
    pub fn new(users: Arc<U>, auth: Arc<dyn AuthProvider>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            auth,
            clock,
            placeholder: Arc::new(OnceCell::new()),
        }
    }
}

impl<U> IdentityService<U>
where
    U: UserRepository,
{
    async fn hash_password(&self, password: &str) -> Result<CredentialHash, Error> {
        let auth = Arc::clone(&self.auth);
        let secret = Zeroizing::new(password.to_owned());
        tokio::task::spawn_blocking(move || auth.hash_secret(&secret))
            .await
            .map_err(|err| internal("credential hashing task failed", err))?
            .map_err(map_auth_error)
    }

    async fn verify_password(&self, password: &str, hash: CredentialHash) -> Result<bool, Error> {
        let auth = Arc::clone(&self.auth);
        let secret = Zeroizing::new(password.to_owned());
        tokio::task::spawn_blocking(move || auth.verify_secret(&secret, &hash))
            .await
            .map_err(|err| internal("credential verification task failed", err))
    }

    /// Burn one verification against a hash no password matches.
    async fn reject_login(&self, password: &str) -> Result<AuthSession, Error> {
        let placeholder = self
            .placeholder
            .get_or_try_init(|| self.hash_password(PLACEHOLDER_SECRET))
            .await?
            .clone();
        self.verify_password(password, placeholder).await?;
        debug!("login rejected");
        Err(Error::invalid_credentials(INVALID_CREDENTIALS))
    }

    fn issue_token(&self, email: &EmailAddress) -> Result<AccessToken, Error> {
        self.auth.issue_token(email).map_err(map_auth_error)
    }

    async fn load(&self, user_id: UserId) -> Result<User, Error> {
        self.users
            .find_by_id(&user_id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found("User not found"))
    }
}

#[async_trait]
impl<U> IdentityStore for IdentityService<U>
where
    U: UserRepository,
{
    async fn register(&self, request: SignupRequest) -> Result<AuthSession, Error> {
        let (credentials, profile) = request.into_parts();
        let email = credentials.email().clone();
        let existing = self
            .users
            .find_by_email(&email)
            .await
            .map_err(map_user_error)?;
        if existing.is_some() {
            return Err(Error::duplicate_email("Email already registered"));
        }

        let hash = self.hash_password(credentials.password()).await?;
        let user = User::register(email, hash, profile, self.clock.utc());
        // The adapter's unique index catches registrations racing past the
        // pre-check above.
        self.users.insert(&user).await.map_err(map_user_error)?;
        let access_token = self.issue_token(&user.email)?;
        info!(user_id = %user.id, "user registered");
        Ok(AuthSession { user, access_token })
    }

    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<AuthSession, Error> {
        let found = self
            .users
            .find_by_email(credentials.email())
            .await
            .map_err(map_user_error)?;
        let Some(user) = found.filter(|user| user.is_active) else {
            return self.reject_login(credentials.password()).await;
        };
        if !self
            .verify_password(credentials.password(), user.credential.clone())
            .await?
        {
            debug!("login rejected");
            return Err(Error::invalid_credentials(INVALID_CREDENTIALS));
        }
        let access_token = self.issue_token(&user.email)?;
        info!(user_id = %user.id, "user logged in");
        Ok(AuthSession { user, access_token })
    }

    async fn update_profile(&self, user_id: UserId, update: ProfileUpdate) -> Result<User, Error> {
        let mut user = self.load(user_id).await?;
        let touches_profile = !update.is_empty();
        user.apply_update(update, self.clock.utc());
        self.users.update(&user).await.map_err(map_user_error)?;
        info!(user_id = %user.id, touches_profile, "profile updated");
        Ok(user)
    }

    async fn get_user(&self, user_id: UserId) -> Result<User, Error> {
        self.load(user_id).await
    }

    async fn resolve_bearer(&self, token: &str) -> Result<User, Error> {
        let subject = self.auth.resolve_token(token).map_err(|err| {
            debug!(error = %err, "bearer token rejected");
            Error::unauthorized("Could not validate credentials")
        })?;
        self.users
            .find_by_email(&subject)
            .await
            .map_err(map_user_error)?
            .filter(|user| user.is_active)
            .ok_or_else(|| Error::unauthorized("User not found"))
    }
}

#[cfg(test)]
#[path = "identity_service_tests.rs"]
mod tests;
