//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::{CredentialHash, EmailAddress, Role, User, UserId, UserProfile};

use super::diesel_basic_error_mapping::{
    is_unique_violation, map_basic_diesel_error, map_basic_pool_error,
};
use super::models::{NewUserRow, UserProfileUpdate, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the user repository port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserRepositoryError {
    map_basic_pool_error(error, UserRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> UserRepositoryError {
    map_basic_diesel_error(
        error,
        UserRepositoryError::query,
        UserRepositoryError::connection,
    )
}

fn row_to_user(row: UserRow) -> Result<User, UserRepositoryError> {
    let UserRow {
        id,
        email,
        password_hash,
        name,
        phone_number,
        date_of_birth,
        role,
        google_id,
        profile_picture,
        is_verified,
        is_active,
        created_at,
        updated_at,
    } = row;

    let email = EmailAddress::new(&email)
        .map_err(|err| UserRepositoryError::query(format!("stored email for {id}: {err}")))?;
    let role = role
        .as_deref()
        .map(str::parse::<Role>)
        .transpose()
        .map_err(|err| UserRepositoryError::query(format!("stored role for {id}: {err}")))?;

    Ok(User {
        id: UserId::from_uuid(id),
        email,
        credential: CredentialHash::new(password_hash),
        profile: UserProfile {
            name,
            phone_number,
            date_of_birth,
            role,
            google_id,
            profile_picture,
        },
        is_verified,
        is_active,
        created_at,
        updated_at,
    })
}

fn new_row(user: &User) -> NewUserRow<'_> {
    let profile = &user.profile;
    NewUserRow {
        id: *user.id.as_uuid(),
        email: user.email.as_ref(),
        password_hash: user.credential.as_str(),
        name: profile.name.as_deref(),
        phone_number: profile.phone_number.as_deref(),
        date_of_birth: profile.date_of_birth.as_deref(),
        role: profile.role.map(Role::as_str),
        google_id: profile.google_id.as_deref(),
        profile_picture: profile.profile_picture.as_deref(),
        is_verified: user.is_verified,
        is_active: user.is_active,
        created_at: user.created_at,
        updated_at: user.updated_at,
    }
}

fn profile_update(user: &User) -> UserProfileUpdate<'_> {
    let profile = &user.profile;
    UserProfileUpdate {
        name: profile.name.as_deref(),
        phone_number: profile.phone_number.as_deref(),
        date_of_birth: profile.date_of_birth.as_deref(),
        role: profile.role.map(Role::as_str),
        profile_picture: profile.profile_picture.as_deref(),
        updated_at: user.updated_at,
    }
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, user: &User) -> Result<(), UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(users::table)
            .values(&new_row(user))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| {
                if is_unique_violation(&err) {
                    UserRepositoryError::duplicate_email(user.email.as_ref())
                } else {
                    map_diesel_error(err)
                }
            })
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .filter(users::id.eq(id.as_uuid()))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_user).transpose()
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        // Emails are stored normalised; the unique index is on lower(email).
        let row = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_user).transpose()
    }

    async fn update(&self, user: &User) -> Result<(), UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(users::table.filter(users::id.eq(user.id.as_uuid())))
            .set(&profile_update(user))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if updated == 0 {
            return Err(UserRepositoryError::not_found(user.id.to_string()));
        }
        Ok(())
    }
}
