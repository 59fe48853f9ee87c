use std::str::FromStr;

use secrecy::ExposeSecret;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
pub use sqlx::Error as DbError;
pub use sqlx::SqlitePool as Pool;

use crate::configuration::DatabaseSettings;

pub mod articles;
pub mod channels;
pub mod errors;
pub mod model;
pub mod word_count;

/// Build the SQLite connection pool and bring the schema up to date.
pub async fn init_sqlite_connection(settings: &DatabaseSettings) -> Result<Pool, DbError> {
    // Foreign keys are enforced by the connection options, sqlx turns them on by default
    let options = SqliteConnectOptions::from_str(settings.url.expose_secret())?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(settings.max_connections)
        // An in-memory database vanishes with its last connection
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    sqlx::migrate!().run(&pool).await?;

    Ok(pool)
}
