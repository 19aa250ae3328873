use sqlx::SqlitePool;
use tracing::info;

/// Create the principals table and its indexes if they do not exist yet.
///
/// The `role` column only admits the gateway's own role vocabulary; the
/// member-facing admin roles live elsewhere.
pub async fn create_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS users (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            username      TEXT    NOT NULL UNIQUE,
            email         TEXT    NOT NULL UNIQUE,
            password_hash TEXT    NOT NULL,
            role          TEXT    NOT NULL
                          CHECK (role IN ('superadmin', 'editor', 'analyst')),
            created_at    INTEGER NOT NULL,
            last_login    INTEGER
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_email    ON users(email)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_username ON users(username)")
        .execute(pool)
        .await?;

    info!("Database schema ready");
    Ok(())
}
