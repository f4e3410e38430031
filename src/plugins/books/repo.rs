use crate::http_error::AppError;
use crate::plugins::books::models::BookRow;
use sqlx::PgPool;

const SELECT_JOINED: &str = "SELECT rb.id, rb.blog_id, bl.title AS blog_title, bl.slug AS blog_slug, \
     rb.title, rb.author, rb.purchase_link, rb.cover_image, rb.description, rb.price, rb.created_at \
     FROM related_books rb LEFT JOIN blogs bl ON rb.blog_id = bl.id";

pub async fn list_all(pool: &PgPool) -> Result<Vec<BookRow>, AppError> {
    let rows = sqlx::query_as::<_, BookRow>(&format!("{} ORDER BY rb.created_at DESC", SELECT_JOINED))
        .fetch_all(pool)
        .await
        .map_err(AppError::from)?;
    Ok(rows)
}

pub async fn list_for_blog(pool: &PgPool, blog_id: i32) -> Result<Vec<BookRow>, AppError> {
    let rows = sqlx::query_as::<_, BookRow>(&format!(
        "{} WHERE rb.blog_id = $1 ORDER BY rb.created_at DESC",
        SELECT_JOINED
    ))
    .bind(blog_id)
    .fetch_all(pool)
    .await
    .map_err(AppError::from)?;
    Ok(rows)
}

/// Insertion-ordered variant used when a blog response echoes its book set
/// right after a replace.
pub async fn list_for_blog_in_order(pool: &PgPool, blog_id: i32) -> Result<Vec<BookRow>, AppError> {
    let rows = sqlx::query_as::<_, BookRow>(&format!(
        "{} WHERE rb.blog_id = $1 ORDER BY rb.id ASC",
        SELECT_JOINED
    ))
    .bind(blog_id)
    .fetch_all(pool)
    .await
    .map_err(AppError::from)?;
    Ok(rows)
}

/// First step of the replace-set flow: drop every book the blog currently
/// owns before the submitted set is inserted.
pub async fn delete_for_blog(pool: &PgPool, blog_id: i32) -> Result<u64, AppError> {
    let result = sqlx::query("DELETE FROM related_books WHERE blog_id = $1")
        .bind(blog_id)
        .execute(pool)
        .await
        .map_err(AppError::from)?;
    Ok(result.rows_affected())
}

#[allow(clippy::too_many_arguments)]
pub async fn insert_book(
    pool: &PgPool,
    blog_id: i32,
    title: &str,
    author: &str,
    purchase_link: &str,
    cover_image: Option<&str>,
    description: &str,
    price: &str,
) -> Result<i32, AppError> {
    let (id,): (i32,) = sqlx::query_as(
        "INSERT INTO related_books (blog_id, title, author, purchase_link, cover_image, description, price) \
         VALUES ($1,$2,$3,$4,$5,$6,$7) RETURNING id",
    )
    .bind(blog_id)
    .bind(title)
    .bind(author)
    .bind(purchase_link)
    .bind(cover_image)
    .bind(description)
    .bind(price)
    .fetch_one(pool)
    .await
    .map_err(AppError::from)?;
    Ok(id)
}

/// Cover column is written only when a fresh upload arrived.
#[allow(clippy::too_many_arguments)]
pub async fn update_book(
    pool: &PgPool,
    id: i32,
    blog_id: i32,
    title: &str,
    author: &str,
    purchase_link: &str,
    cover_image: Option<&str>,
    description: &str,
    price: &str,
) -> Result<u64, AppError> {
    let mut sql = String::from(
        "UPDATE related_books SET blog_id = $1, title = $2, author = $3, purchase_link = $4, \
         description = $5, price = $6",
    );
    let mut next = 7;
    if cover_image.is_some() {
        sql.push_str(&format!(", cover_image = ${}", next));
        next += 1;
    }
    sql.push_str(&format!(" WHERE id = ${}", next));

    let mut query = sqlx::query(&sql)
        .bind(blog_id)
        .bind(title)
        .bind(author)
        .bind(purchase_link)
        .bind(description)
        .bind(price);
    if let Some(cover) = cover_image {
        query = query.bind(cover);
    }
    let result = query.bind(id).execute(pool).await.map_err(AppError::from)?;
    Ok(result.rows_affected())
}

pub async fn get_cover_image(pool: &PgPool, id: i32) -> Result<Option<Option<String>>, AppError> {
    let row: Option<(Option<String>,)> =
        sqlx::query_as("SELECT cover_image FROM related_books WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(AppError::from)?;
    Ok(row.map(|(cover,)| cover))
}

pub async fn delete_book(pool: &PgPool, id: i32) -> Result<u64, AppError> {
    let result = sqlx::query("DELETE FROM related_books WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .map_err(AppError::from)?;
    Ok(result.rows_affected())
}
