//! Credential hashing and bearer tokens.
//!
//! [`Argon2JwtAuthProvider`] implements the `AuthProvider` port with Argon2id
//! PHC hashes and HS256 JSON Web Tokens. [`token_settings_from_env`] loads
//! the signing secret and token lifetime.

mod config;
mod provider;

pub use config::{BuildMode, TokenConfigError, TokenSettings, token_settings_from_env};
pub use provider::Argon2JwtAuthProvider;
