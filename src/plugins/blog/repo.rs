use crate::http_error::AppError;
use crate::plugins::blog::models::BlogRow;
use sqlx::PgPool;

pub async fn slug_exists(pool: &PgPool, slug: &str) -> Result<bool, AppError> {
    let row: Option<(i32,)> = sqlx::query_as("SELECT id FROM blogs WHERE slug = $1")
        .bind(slug)
        .fetch_optional(pool)
        .await
        .map_err(AppError::from)?;
    Ok(row.is_some())
}

#[allow(clippy::too_many_arguments)]
pub async fn insert_blog(
    pool: &PgPool,
    title: &str,
    slug: &str,
    content: &str,
    excerpt: &str,
    featured_image: Option<&str>,
    featured_image_2: Option<&str>,
    category_id: i32,
    tags: &str,
    meta_title: &str,
    meta_description: &str,
    is_featured: bool,
    status: &str,
) -> Result<i32, AppError> {
    let (id,): (i32,) = sqlx::query_as(
        "INSERT INTO blogs (title, slug, content, excerpt, featured_image, featured_image_2, category_id, tags, meta_title, meta_description, is_featured, status) \
         VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12) RETURNING id",
    )
    .bind(title)
    .bind(slug)
    .bind(content)
    .bind(excerpt)
    .bind(featured_image)
    .bind(featured_image_2)
    .bind(category_id)
    .bind(tags)
    .bind(meta_title)
    .bind(meta_description)
    .bind(is_featured)
    .bind(status)
    .fetch_one(pool)
    .await
    .map_err(AppError::from)?;
    Ok(id)
}

/// Updates a blog row. The two image columns are written only when a new
/// file arrived with this request; the column list is built dynamically but
/// every value still travels as a bind parameter.
#[allow(clippy::too_many_arguments)]
pub async fn update_blog(
    pool: &PgPool,
    id: i32,
    title: &str,
    content: &str,
    excerpt: Option<&str>,
    category_id: i32,
    tags: &str,
    meta_title: Option<&str>,
    meta_description: Option<&str>,
    is_featured: bool,
    status: &str,
    featured_image: Option<&str>,
    featured_image_2: Option<&str>,
) -> Result<u64, AppError> {
    let mut sql = String::from(
        "UPDATE blogs SET title = $1, content = $2, excerpt = $3, category_id = $4, tags = $5, \
         meta_title = $6, meta_description = $7, is_featured = $8, status = $9, updated_at = now()",
    );
    let mut next = 10;
    if featured_image.is_some() {
        sql.push_str(&format!(", featured_image = ${}", next));
        next += 1;
    }
    if featured_image_2.is_some() {
        sql.push_str(&format!(", featured_image_2 = ${}", next));
        next += 1;
    }
    sql.push_str(&format!(" WHERE id = ${}", next));

    let mut query = sqlx::query(&sql)
        .bind(title)
        .bind(content)
        .bind(excerpt)
        .bind(category_id)
        .bind(tags)
        .bind(meta_title)
        .bind(meta_description)
        .bind(is_featured)
        .bind(status);
    if let Some(img) = featured_image {
        query = query.bind(img);
    }
    if let Some(img) = featured_image_2 {
        query = query.bind(img);
    }
    let result = query.bind(id).execute(pool).await.map_err(AppError::from)?;
    Ok(result.rows_affected())
}

pub async fn fetch_blog(pool: &PgPool, id: i32) -> Result<Option<BlogRow>, AppError> {
    let row = sqlx::query_as::<_, BlogRow>(
        "SELECT id, title, slug, content, excerpt, featured_image, featured_image_2, category_id, \
         tags, meta_title, meta_description, is_featured, status, created_at, updated_at \
         FROM blogs WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(AppError::from)?;
    Ok(row)
}

pub async fn delete_blog(pool: &PgPool, id: i32) -> Result<u64, AppError> {
    let result = sqlx::query("DELETE FROM blogs WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .map_err(AppError::from)?;
    Ok(result.rows_affected())
}

/// Slug of the referenced blog when it exists and is published. Banners may
/// only point at published posts.
pub async fn find_published_slug(pool: &PgPool, blog_id: i32) -> Result<Option<String>, AppError> {
    let row: Option<(String,)> =
        sqlx::query_as("SELECT slug FROM blogs WHERE id = $1 AND status = 'published'")
            .bind(blog_id)
            .fetch_optional(pool)
            .await
            .map_err(AppError::from)?;
    Ok(row.map(|(slug,)| slug))
}

pub async fn blog_exists(pool: &PgPool, blog_id: i32) -> Result<bool, AppError> {
    let row: Option<(i32,)> = sqlx::query_as("SELECT id FROM blogs WHERE id = $1")
        .bind(blog_id)
        .fetch_optional(pool)
        .await
        .map_err(AppError::from)?;
    Ok(row.is_some())
}
