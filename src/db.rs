use sea_orm::{ConnectOptions, Database as SeaDatabase, DatabaseConnection};
use std::time::Duration;

use crate::config::Config;

/// Initialize the database connection from config.
pub async fn connect(config: &Config) -> Result<DatabaseConnection, sea_orm::DbErr> {
    let mut opts = ConnectOptions::new(&config.database_url);

    if config.database_url.contains(":memory:") {
        // An in-memory SQLite database exists per connection, so the pool
        // must stay at a single long-lived connection or queries see an
        // empty schema.
        opts.max_connections(1)
            .min_connections(1)
            .connect_timeout(Duration::from_secs(8))
            .acquire_timeout(Duration::from_secs(8))
            .sqlx_logging(config.is_dev());
    } else {
        opts.max_connections(100)
            .min_connections(5)
            .connect_timeout(Duration::from_secs(8))
            .acquire_timeout(Duration::from_secs(8))
            .idle_timeout(Duration::from_secs(8))
            .max_lifetime(Duration::from_secs(8))
            .sqlx_logging(config.is_dev());
    }

    SeaDatabase::connect(opts).await
}

/// Open a fresh single-connection in-memory SQLite database.
///
/// Intended for tests; the single connection keeps the database alive for
/// the lifetime of the handle.
pub async fn connect_in_memory() -> Result<DatabaseConnection, sea_orm::DbErr> {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1).min_connections(1).sqlx_logging(false);
    SeaDatabase::connect(opts).await
}
