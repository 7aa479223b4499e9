use std::time::Duration;

use common::config::{DbAuth, DbConfig};
use common::identity::ManagedIdentity;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgSslMode};
use tracing::info;

use crate::error::StoreError;

const SCHEMA: &str = include_str!("../sql/schema.sql");

/// Opens the pool for the configured auth mode.
///
/// Password auth is meant for local containers and only prefers TLS; token
/// auth targets the managed server and requires it.
pub async fn connect(config: &DbConfig, identity: &ManagedIdentity) -> Result<PgPool, StoreError> {
    let base = PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .database(&config.database);

    let options = match &config.auth {
        DbAuth::Password { username, password } => {
            info!("[DB] Connecting to {}:{} with password auth", config.host, config.port);
            base.username(username)
                .password(password)
                .ssl_mode(PgSslMode::Prefer)
        }
        DbAuth::ManagedIdentity { username, resource } => {
            info!("[DB] Connecting to {}:{} with managed identity", config.host, config.port);
            let token = identity.token(resource).await?;
            base.username(username)
                .password(&token)
                .ssl_mode(PgSslMode::Require)
        }
    };

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .acquire_timeout(Duration::from_secs(30))
        .connect_with(options)
        .await?;

    if config.bootstrap_schema {
        sqlx::raw_sql(SCHEMA).execute(&pool).await?;
        info!("[DB] Schema bootstrap applied");
    }

    Ok(pool)
}
