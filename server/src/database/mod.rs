pub mod accounts;
pub mod create;
pub mod principals;
pub mod utils;

pub use create::create_tables;

use std::str::FromStr;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::info;

/// Open a connection pool for `url` and make sure the schema exists.
pub async fn connect(url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    info!("Opening database: {}", url);

    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    create_tables(&pool).await?;
    Ok(pool)
}

/// Single-connection in-memory database with the schema applied.
///
/// Every SQLite connection to `:memory:` gets its own database, so the pool
/// is pinned to one connection that never idles out.
pub async fn connect_in_memory() -> Result<SqlitePool, sqlx::Error> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;

    create_tables(&pool).await?;
    Ok(pool)
}
