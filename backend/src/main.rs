//! Backend entry-point: loads settings, prepares the database and serves the API.

mod server;

use std::sync::Arc;

use actix_web::web;
use mockable::{DefaultClock, DefaultEnv};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use carpool_backend::inbound::http::health::HealthState;
use carpool_backend::outbound::auth::{
    Argon2JwtAuthProvider, BuildMode, token_settings_from_env,
};
use carpool_backend::outbound::persistence::{DbPool, run_pending_migrations};
use ortho_config::OrthoConfig;
#[cfg(feature = "metrics")]
use server::make_metrics;
use server::{ServerConfig, ServerSettings, create_server};

fn startup_error(context: &str, err: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::other(format!("{context}: {err}"))
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServerSettings::load().map_err(|e| startup_error("configuration", e))?;
    let bind_addr = settings
        .bind_addr()
        .map_err(|e| startup_error("configuration", e))?;
    let database_url = settings
        .database_url()
        .map_err(|e| startup_error("configuration", e))?;
    let pool_config = settings
        .pool_config()
        .map_err(|e| startup_error("configuration", e))?;

    let tokens = token_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .map_err(|e| startup_error("token settings", e))?;

    if settings.run_migrations {
        run_pending_migrations(database_url)
            .await
            .map_err(|e| startup_error("migrations", e))?;
        info!("database migrations applied");
    }

    let db_pool = DbPool::new(pool_config)
        .await
        .map_err(|e| startup_error("database pool", e))?;
    let auth = Arc::new(Argon2JwtAuthProvider::new(&tokens, Arc::new(DefaultClock)));

    let config = ServerConfig::new(bind_addr, db_pool, auth);
    #[cfg(feature = "metrics")]
    let config = config.with_metrics(make_metrics());

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)?;
    server.await
}
