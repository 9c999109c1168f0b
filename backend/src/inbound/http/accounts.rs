//! Account handlers: signup, login and the caller's profile.
//!
//! ```text
//! POST /signup {"email":"ada@example.com","password":"secret1","user_type":"driver"}
//! POST /login {"email":"ada@example.com","password":"secret1"}
//! GET /user/profile
//! PUT /user/profile {"name":"Ada","phone_number":null}
//! ```

use actix_web::{get, post, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    Error, FieldPatch, LoginCredentials, ProfileUpdate, Role, SignupRequest, User, UserId,
    UserProfile, normalise_profile_text,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    credentials_validation_error, user_validation_error,
};

const TOKEN_TYPE: &str = "bearer";

/// Public view of a user. Never includes the credential hash.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: UserId,
    pub email: String,
    pub name: Option<String>,
    pub phone_number: Option<String>,
    pub date_of_birth: Option<String>,
    /// Preferred role: `driver`, `rider` or null.
    pub user_type: Option<Role>,
    pub google_id: Option<String>,
    pub profile_picture: Option<String>,
    pub is_verified: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        let User {
            id,
            email,
            credential: _,
            profile,
            is_verified,
            is_active,
            created_at,
            updated_at,
        } = user;
        Self {
            id,
            email: email.into(),
            name: profile.name,
            phone_number: profile.phone_number,
            date_of_birth: profile.date_of_birth,
            user_type: profile.role,
            google_id: profile.google_id,
            profile_picture: profile.profile_picture,
            is_verified,
            is_active,
            created_at,
            updated_at,
        }
    }
}

/// Signup request body for `POST /signup`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct SignupBody {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub confirm_password: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<String>,
    /// `driver` or `rider`, any case.
    #[serde(default)]
    pub user_type: Option<String>,
    #[serde(default)]
    pub google_id: Option<String>,
    #[serde(default)]
    pub profile_picture: Option<String>,
}

fn parse_role(raw: &str) -> Result<Role, Error> {
    raw.parse::<Role>().map_err(user_validation_error)
}

fn optional_role(raw: Option<String>) -> Result<Option<Role>, Error> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_role(value).map(Some),
    }
}

fn profile_text(field: &'static str, value: Option<String>) -> Result<Option<String>, Error> {
    normalise_profile_text(field, value).map_err(user_validation_error)
}

impl TryFrom<SignupBody> for SignupRequest {
    type Error = Error;

    fn try_from(body: SignupBody) -> Result<Self, Self::Error> {
        let profile = UserProfile {
            name: profile_text("name", body.name)?,
            phone_number: profile_text("phone_number", body.phone_number)?,
            date_of_birth: profile_text("date_of_birth", body.date_of_birth)?,
            role: optional_role(body.user_type)?,
            google_id: profile_text("google_id", body.google_id)?,
            profile_picture: profile_text("profile_picture", body.profile_picture)?,
        };
        Self::try_new(
            &body.email,
            &body.password,
            body.confirm_password.as_deref(),
            profile,
        )
        .map_err(credentials_validation_error)
    }
}

/// Token issued by signup.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SignupResponse {
    pub message: String,
    pub access_token: String,
    /// Always `bearer`.
    pub token_type: String,
}

/// Create an account and return a bearer token.
#[utoipa::path(
    post,
    path = "/signup",
    request_body = SignupBody,
    responses(
        (status = 200, description = "Account created", body = SignupResponse),
        (status = 400, description = "Invalid request or email already registered", body = Error),
        (status = 503, description = "Storage unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "signup",
    security([])
)]
#[post("/signup")]
pub async fn signup(
    state: web::Data<HttpState>,
    payload: web::Json<SignupBody>,
) -> ApiResult<web::Json<SignupResponse>> {
    let request = SignupRequest::try_from(payload.into_inner())?;
    let session = state.identity.register(request).await?;
    Ok(web::Json(SignupResponse {
        message: "User created successfully".to_owned(),
        access_token: session.access_token.as_str().to_owned(),
        token_type: TOKEN_TYPE.to_owned(),
    }))
}

/// Login request body for `POST /login`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct LoginBody {
    pub email: String,
    pub password: String,
}

/// Token and user returned by login.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub message: String,
    pub access_token: String,
    pub token_type: String,
    pub user: UserResponse,
}

/// Exchange credentials for a bearer token.
///
/// Unknown emails and wrong passwords both yield `401 invalid_credentials`.
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginBody,
    responses(
        (status = 200, description = "Login success", body = LoginResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 503, description = "Storage unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginBody>,
) -> ApiResult<web::Json<LoginResponse>> {
    let LoginBody { email, password } = payload.into_inner();
    let credentials = LoginCredentials::try_from_parts(&email, &password)
        .map_err(credentials_validation_error)?;
    let session = state.identity.authenticate(&credentials).await?;
    Ok(web::Json(LoginResponse {
        message: "Login successful".to_owned(),
        access_token: session.access_token.as_str().to_owned(),
        token_type: TOKEN_TYPE.to_owned(),
        user: session.user.into(),
    }))
}

/// `{user}` envelope for `GET /user/profile`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProfileResponse {
    pub user: UserResponse,
}

/// The caller's own account.
#[utoipa::path(
    get,
    path = "/user/profile",
    responses(
        (status = 200, description = "Current user", body = ProfileResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "getProfile"
)]
#[get("/user/profile")]
pub async fn get_profile(caller: AuthenticatedUser) -> web::Json<ProfileResponse> {
    web::Json(ProfileResponse {
        user: caller.into_inner().into(),
    })
}

/// Distinguish an absent key (`None`) from an explicit `null` (`Some(None)`).
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Partial profile update for `PUT /user/profile`.
///
/// Absent keys are left alone, `null` clears and a value replaces.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct ProfileUpdateBody {
    #[serde(
        default,
        deserialize_with = "deserialize_some",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>)]
    pub name: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "deserialize_some",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>)]
    pub phone_number: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "deserialize_some",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>)]
    pub date_of_birth: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "deserialize_some",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>)]
    pub user_type: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "deserialize_some",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>)]
    pub profile_picture: Option<Option<String>>,
}

fn text_patch(
    field: &'static str,
    value: Option<Option<String>>,
) -> Result<FieldPatch<String>, Error> {
    match FieldPatch::from_presence(value) {
        FieldPatch::Set(raw) => Ok(match profile_text(field, Some(raw))? {
            Some(text) => FieldPatch::Set(text),
            None => FieldPatch::Clear,
        }),
        other => Ok(other),
    }
}

impl TryFrom<ProfileUpdateBody> for ProfileUpdate {
    type Error = Error;

    fn try_from(body: ProfileUpdateBody) -> Result<Self, Self::Error> {
        Ok(Self {
            name: text_patch("name", body.name)?,
            phone_number: text_patch("phone_number", body.phone_number)?,
            date_of_birth: text_patch("date_of_birth", body.date_of_birth)?,
            role: FieldPatch::from_presence(body.user_type).try_map(|raw| parse_role(&raw))?,
            profile_picture: text_patch("profile_picture", body.profile_picture)?,
        })
    }
}

/// `{message, user}` envelope for `PUT /user/profile`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProfileUpdatedResponse {
    pub message: String,
    pub user: UserResponse,
}

/// Apply a partial update to the caller's profile.
#[utoipa::path(
    put,
    path = "/user/profile",
    request_body = ProfileUpdateBody,
    responses(
        (status = 200, description = "Updated user", body = ProfileUpdatedResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 503, description = "Storage unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "updateProfile"
)]
#[put("/user/profile")]
pub async fn update_profile(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    payload: web::Json<ProfileUpdateBody>,
) -> ApiResult<web::Json<ProfileUpdatedResponse>> {
    let update = ProfileUpdate::try_from(payload.into_inner())?;
    let user = state.identity.update_profile(caller.id(), update).await?;
    Ok(web::Json(ProfileUpdatedResponse {
        message: "Profile updated successfully".to_owned(),
        user: user.into(),
    }))
}

#[cfg(test)]
#[path = "accounts_tests.rs"]
mod tests;
