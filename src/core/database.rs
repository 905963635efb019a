use crate::core::config::{DatabaseConfig, StoreConfig};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use std::str::FromStr;
use std::time::Duration;

/// Pool acquisition never waits longer than one record store call may take.
fn acquire_timeout(config: &DatabaseConfig, store: &StoreConfig) -> Duration {
    Duration::from_secs(config.acquire_timeout_secs).min(store.record_timeout)
}

/// Server-side statement timeout, so a query abandoned at its deadline stops running too.
fn statement_timeout(store: &StoreConfig) -> String {
    format!("{}ms", store.record_timeout.as_millis())
}

pub async fn create_pool(config: &DatabaseConfig, store: &StoreConfig) -> Result<PgPool, sqlx::Error> {
    let acquire = acquire_timeout(config, store);
    let statement = statement_timeout(store);
    tracing::debug!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        acquire_timeout = ?acquire,
        statement_timeout = %statement,
        "Opening record store pool"
    );

    let options = PgConnectOptions::from_str(&config.url)?
        .options([("statement_timeout", statement.as_str())]);

    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(acquire)
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
        .connect_with(options)
        .await
}
