use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::Query;
use axum::http::{HeaderMap, StatusCode};
use axum::{Extension, Json};
use serde_json::{json, Value};
use sqlx::PgPool;

use crate::http_error::AppError;
use crate::plugins::blog::repo as blog_repo;
use crate::plugins::books::models::{BookInput, BookRow};
use crate::plugins::books::repo;
use crate::storage::{form, paths, FormPayload, UploadStore, UploadedFile};

#[derive(Debug, serde::Deserialize)]
pub struct ListQuery {
    pub blog_id: Option<i32>,
}

#[derive(Debug, serde::Deserialize)]
pub struct IdQuery {
    pub id: Option<i32>,
}

fn read_input(headers: &HeaderMap, body: &Bytes) -> Result<(BookInput, HashMap<String, UploadedFile>), AppError> {
    if form::is_multipart(headers) {
        let payload = FormPayload::parse(body)
            .map_err(|e| AppError::new(StatusCode::BAD_REQUEST, e.to_string()))?;
        let input = BookInput::from_form(&payload);
        Ok((input, payload.files))
    } else {
        let input: BookInput = serde_json::from_slice(body)
            .map_err(|_| AppError::new(StatusCode::BAD_REQUEST, "Invalid JSON body"))?;
        Ok((input, HashMap::new()))
    }
}

fn book_json(book: &BookRow, base: &str) -> Value {
    json!({
        "id": book.id,
        "blog_id": book.blog_id,
        "blog_title": book.blog_title,
        "blog_slug": book.blog_slug,
        "title": book.title,
        "author": book.author,
        "purchase_link": book.purchase_link,
        "cover_image": paths::absolutize(base, &book.cover_image),
        "description": book.description,
        "price": book.price,
        "created_at": book.created_at,
    })
}

pub async fn list_books(
    Extension(pool): Extension<PgPool>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, AppError> {
    let books = match query.blog_id {
        Some(blog_id) => repo::list_for_blog(&pool, blog_id).await?,
        None => repo::list_all(&pool).await?,
    };
    let base = paths::public_base_url();
    let formatted: Vec<Value> = books.iter().map(|b| book_json(b, &base)).collect();
    Ok(Json(json!({ "books": formatted })))
}

pub async fn create_book(
    Extension(pool): Extension<PgPool>,
    Extension(store): Extension<Arc<UploadStore>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let (input, files) = read_input(&headers, &body)?;
    let input = input.sanitized();

    let (Some(blog_id), Some(title), Some(purchase_link)) = (
        input.blog_id,
        input.title.clone().filter(|t| !t.is_empty()),
        input.purchase_link.clone().filter(|l| !l.is_empty()),
    ) else {
        return Err(AppError::new(
            StatusCode::BAD_REQUEST,
            "Blog ID, title, and purchase link are required",
        ));
    };

    if !blog_repo::blog_exists(&pool, blog_id).await? {
        return Err(AppError::new(StatusCode::BAD_REQUEST, "Blog not found"));
    }

    let cover_image = match files.get("cover_image") {
        Some(file) => Some(store.save(file, Some("book_covers")).map_err(|e| {
            tracing::warn!("book cover upload rejected: {}", e);
            AppError::new(StatusCode::BAD_REQUEST, "Failed to upload book cover image")
        })?),
        None => None,
    };

    let book_id = repo::insert_book(
        &pool,
        blog_id,
        &title,
        input.author.as_deref().unwrap_or(""),
        &purchase_link,
        cover_image.as_deref(),
        input.description.as_deref().unwrap_or(""),
        input.price.as_deref().unwrap_or(""),
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Related book created successfully",
            "book_id": book_id,
            "cover_image": cover_image,
        })),
    ))
}

pub async fn update_book(
    Extension(pool): Extension<PgPool>,
    Extension(store): Extension<Arc<UploadStore>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let (input, files) = read_input(&headers, &body)?;
    let input = input.sanitized();

    let (Some(id), Some(blog_id), Some(title), Some(purchase_link)) = (
        input.id,
        input.blog_id,
        input.title.clone().filter(|t| !t.is_empty()),
        input.purchase_link.clone().filter(|l| !l.is_empty()),
    ) else {
        return Err(AppError::new(
            StatusCode::BAD_REQUEST,
            "ID, blog ID, title, and purchase link are required",
        ));
    };

    let cover_image = match files.get("cover_image") {
        Some(file) => Some(store.save(file, Some("book_covers")).map_err(|e| {
            tracing::warn!("book cover upload rejected: {}", e);
            AppError::new(StatusCode::BAD_REQUEST, "Failed to upload book cover image")
        })?),
        None => None,
    };

    let rows = repo::update_book(
        &pool,
        id,
        blog_id,
        &title,
        input.author.as_deref().unwrap_or(""),
        &purchase_link,
        cover_image.as_deref(),
        input.description.as_deref().unwrap_or(""),
        input.price.as_deref().unwrap_or(""),
    )
    .await?;
    if rows == 0 {
        return Err(AppError::new(StatusCode::NOT_FOUND, "Related book not found"));
    }

    Ok(Json(json!({ "message": "Related book updated successfully" })))
}

pub async fn delete_book(
    Extension(pool): Extension<PgPool>,
    Extension(store): Extension<Arc<UploadStore>>,
    Query(query): Query<IdQuery>,
) -> Result<Json<Value>, AppError> {
    let id = query
        .id
        .ok_or_else(|| AppError::new(StatusCode::BAD_REQUEST, "Book ID required for deletion"))?;

    // fetch the cover first so the backing file can be cleaned up after the
    // row is gone
    let cover = repo::get_cover_image(&pool, id).await?;

    let rows = repo::delete_book(&pool, id).await?;
    if rows == 0 {
        return Err(AppError::new(StatusCode::NOT_FOUND, "Related book not found"));
    }

    if let Some(Some(cover)) = cover {
        // best-effort: an orphaned file is logged, never a client error
        store.remove(&cover);
    }

    Ok(Json(json!({ "message": "Related book deleted successfully" })))
}
