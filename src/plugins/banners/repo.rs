use crate::http_error::AppError;
use crate::plugins::banners::models::BannerRow;
use sqlx::PgPool;

const SELECT_JOINED: &str = "SELECT b.id, b.title, b.subtitle, b.image_url, b.link_url, b.blog_id, \
     bl.title AS blog_title, bl.slug AS blog_slug, b.sort_order, b.is_active, b.created_at \
     FROM banner_images b LEFT JOIN blogs bl ON b.blog_id = bl.id";

pub async fn list_all(pool: &PgPool) -> Result<Vec<BannerRow>, AppError> {
    let rows = sqlx::query_as::<_, BannerRow>(&format!(
        "{} ORDER BY b.sort_order ASC, b.created_at DESC",
        SELECT_JOINED
    ))
    .fetch_all(pool)
    .await
    .map_err(AppError::from)?;
    Ok(rows)
}

pub async fn list_active(pool: &PgPool) -> Result<Vec<BannerRow>, AppError> {
    let rows = sqlx::query_as::<_, BannerRow>(&format!(
        "{} WHERE b.is_active = TRUE ORDER BY b.sort_order ASC",
        SELECT_JOINED
    ))
    .fetch_all(pool)
    .await
    .map_err(AppError::from)?;
    Ok(rows)
}

pub async fn count_active(pool: &PgPool) -> Result<i64, AppError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM banner_images WHERE is_active = TRUE")
        .fetch_one(pool)
        .await
        .map_err(AppError::from)?;
    Ok(count)
}

pub async fn max_sort_order(pool: &PgPool) -> Result<i32, AppError> {
    let max: Option<i32> = sqlx::query_scalar("SELECT MAX(sort_order) FROM banner_images")
        .fetch_one(pool)
        .await
        .map_err(AppError::from)?;
    Ok(max.unwrap_or(0))
}

#[allow(clippy::too_many_arguments)]
pub async fn insert_banner(
    pool: &PgPool,
    title: &str,
    subtitle: &str,
    image_url: &str,
    link_url: &str,
    blog_id: i32,
    sort_order: i32,
    is_active: bool,
) -> Result<i32, AppError> {
    let (id,): (i32,) = sqlx::query_as(
        "INSERT INTO banner_images (title, subtitle, image_url, link_url, blog_id, sort_order, is_active) \
         VALUES ($1,$2,$3,$4,$5,$6,$7) RETURNING id",
    )
    .bind(title)
    .bind(subtitle)
    .bind(image_url)
    .bind(link_url)
    .bind(blog_id)
    .bind(sort_order)
    .bind(is_active)
    .fetch_one(pool)
    .await
    .map_err(AppError::from)?;
    Ok(id)
}

/// Image column is written only when a fresh upload arrived.
#[allow(clippy::too_many_arguments)]
pub async fn update_banner(
    pool: &PgPool,
    id: i32,
    title: &str,
    subtitle: &str,
    image_url: Option<&str>,
    link_url: &str,
    blog_id: i32,
    sort_order: i32,
    is_active: bool,
) -> Result<u64, AppError> {
    let mut sql = String::from(
        "UPDATE banner_images SET title = $1, subtitle = $2, link_url = $3, blog_id = $4, \
         sort_order = $5, is_active = $6",
    );
    let mut next = 7;
    if image_url.is_some() {
        sql.push_str(&format!(", image_url = ${}", next));
        next += 1;
    }
    sql.push_str(&format!(" WHERE id = ${}", next));

    let mut query = sqlx::query(&sql)
        .bind(title)
        .bind(subtitle)
        .bind(link_url)
        .bind(blog_id)
        .bind(sort_order)
        .bind(is_active);
    if let Some(img) = image_url {
        query = query.bind(img);
    }
    let result = query.bind(id).execute(pool).await.map_err(AppError::from)?;
    Ok(result.rows_affected())
}

pub async fn delete_banner(pool: &PgPool, id: i32) -> Result<u64, AppError> {
    let result = sqlx::query("DELETE FROM banner_images WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .map_err(AppError::from)?;
    Ok(result.rows_affected())
}
