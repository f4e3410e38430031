use crate::http_error::AppError;
use axum::http::StatusCode;
use sqlx::PgPool;
use uuid::Uuid;

pub async fn find_admin_by_username(
    pool: &PgPool,
    username: &str,
) -> Result<Option<(Uuid, String)>, AppError> {
    let row: Option<(Uuid, String)> =
        sqlx::query_as("SELECT id, password_hash FROM admin_users WHERE username = $1")
            .bind(username)
            .fetch_optional(pool)
            .await
            .map_err(AppError::from)?;
    Ok(row)
}

pub async fn get_admin_basic(pool: &PgPool, id: Uuid) -> Result<(Uuid, String), AppError> {
    let row: (Uuid, String) = sqlx::query_as("SELECT id, username FROM admin_users WHERE id = $1")
        .bind(id)
        .fetch_one(pool)
        .await
        .map_err(AppError::from)?;
    Ok(row)
}

/// Seeds an admin account; used by the startup bootstrap and the test harness.
pub async fn insert_admin(pool: &PgPool, username: &str, password: &str) -> Result<Uuid, AppError> {
    let hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    let (id,): (Uuid,) = sqlx::query_as(
        "INSERT INTO admin_users (username, password_hash) VALUES ($1, $2) RETURNING id",
    )
    .bind(username)
    .bind(hash)
    .fetch_one(pool)
    .await
    .map_err(AppError::from)?;
    Ok(id)
}
