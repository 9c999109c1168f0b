//! Bearer token extractor for protected handlers.
//!
//! Handlers that take an [`AuthenticatedUser`] argument are protected: the
//! extractor reads `Authorization: Bearer <token>` and asks the identity
//! store to resolve it to an active user. Every failure is `401`.

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web};
use futures_util::future::LocalBoxFuture;

use crate::domain::{Error, User, UserId};

use super::state::HttpState;

const BEARER_SCHEME: &str = "bearer";

/// The caller resolved from a valid bearer token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(User);

impl AuthenticatedUser {
    /// Identifier of the caller.
    #[must_use]
    pub fn id(&self) -> UserId {
        self.0.id
    }

    /// Full user record.
    #[must_use]
    pub fn user(&self) -> &User {
        &self.0
    }

    /// Take ownership of the user record.
    #[must_use]
    pub fn into_inner(self) -> User {
        self.0
    }
}

/// Extract the token from an `Authorization` header value.
///
/// The scheme is matched case-insensitively.
fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case(BEARER_SCHEME) && !token.is_empty()).then_some(token)
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        let header_value = req
            .headers()
            .get(header::AUTHORIZATION)
            .map(|value| value.to_str().map(str::to_owned));
        Box::pin(async move {
            let state = state.ok_or_else(|| Error::internal("HTTP state is not configured"))?;
            let raw = match header_value {
                None => return Err(Error::unauthorized("Not authenticated")),
                Some(Err(_)) => return Err(Error::unauthorized("Malformed authorization header")),
                Some(Ok(raw)) => raw,
            };
            let token = bearer_token(&raw)
                .ok_or_else(|| Error::unauthorized("Authorization must use the Bearer scheme"))?;
            state.identity.resolve_bearer(token).await.map(Self)
        })
    }
}
