use std::env;

use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};

pub type DbPool = Pool<Postgres>;

/// Connects to Postgres and applies the embedded migrations before the
/// server starts taking requests. Pool size comes from `DB_MAX_CONNECTIONS`;
/// the admin surface serves a handful of editors, so the default stays small.
pub async fn init_db(database_url: &str) -> anyhow::Result<DbPool> {
    let max_connections = env::var("DB_MAX_CONNECTIONS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(5);

    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    sqlx::migrate!().run(&pool).await?;

    Ok(pool)
}
