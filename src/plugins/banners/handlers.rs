use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::Query;
use axum::http::{HeaderMap, StatusCode};
use axum::{Extension, Json};
use serde_json::{json, Value};
use sqlx::PgPool;

use crate::http_error::AppError;
use crate::plugins::banners::models::BannerInput;
use crate::plugins::banners::repo;
use crate::plugins::blog::repo as blog_repo;
use crate::plugins::shared::delete_id;
use crate::storage::{form, paths, FormPayload, UploadStore, UploadedFile};

/// At most this many banners may be active at once; the homepage carousel
/// shows four slots.
const MAX_ACTIVE_BANNERS: i64 = 4;

#[derive(Debug, serde::Deserialize)]
pub struct IdQuery {
    pub id: Option<i32>,
}

fn read_input(headers: &HeaderMap, body: &Bytes) -> Result<(BannerInput, HashMap<String, UploadedFile>), AppError> {
    if form::is_multipart(headers) {
        let payload = FormPayload::parse(body)
            .map_err(|e| AppError::new(StatusCode::BAD_REQUEST, e.to_string()))?;
        let input = BannerInput::from_form(&payload);
        Ok((input, payload.files))
    } else {
        let input: BannerInput = serde_json::from_slice(body)
            .map_err(|_| AppError::new(StatusCode::BAD_REQUEST, "Invalid JSON body"))?;
        Ok((input, HashMap::new()))
    }
}

fn banner_json(banner: &crate::plugins::banners::models::BannerRow, base: &str) -> Value {
    json!({
        "id": banner.id,
        "title": banner.title,
        "subtitle": banner.subtitle,
        "image_url": paths::to_absolute_url(base, &banner.image_url),
        "link_url": banner.link_url,
        "blog_id": banner.blog_id,
        "blog_title": banner.blog_title,
        "blog_slug": banner.blog_slug,
        "sort_order": banner.sort_order,
        "is_active": banner.is_active,
        "created_at": banner.created_at,
    })
}

pub async fn list_banners(Extension(pool): Extension<PgPool>) -> Result<Json<Value>, AppError> {
    let banners = repo::list_all(&pool).await?;
    let base = paths::public_base_url();
    let formatted: Vec<Value> = banners.iter().map(|b| banner_json(b, &base)).collect();
    Ok(Json(json!({ "banners": formatted })))
}

/// Public, unauthenticated listing of the active carousel, with a blog link
/// derived from the joined slug.
pub async fn list_active_banners(Extension(pool): Extension<PgPool>) -> Result<Json<Value>, AppError> {
    let banners = repo::list_active(&pool).await?;
    let base = paths::public_base_url();
    let formatted: Vec<Value> = banners
        .iter()
        .map(|b| {
            let mut v = banner_json(b, &base);
            v["blog_link"] = match &b.blog_slug {
                Some(slug) => json!(format!("/blog/{}", slug)),
                None => json!(b.link_url),
            };
            v
        })
        .collect();
    Ok(Json(json!({ "banners": formatted })))
}

pub async fn create_banner(
    Extension(pool): Extension<PgPool>,
    Extension(store): Extension<Arc<UploadStore>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<Value>), AppError> {
    if repo::count_active(&pool).await? >= MAX_ACTIVE_BANNERS {
        return Err(AppError::new(
            StatusCode::BAD_REQUEST,
            "Maximum of 4 active banners allowed. Please deactivate or delete an existing banner first.",
        ));
    }

    let (input, files) = read_input(&headers, &body)?;
    let input = input.sanitized();

    let (Some(title), Some(blog_id)) = (input.title.clone().filter(|t| !t.is_empty()), input.blog_id) else {
        return Err(AppError::new(StatusCode::BAD_REQUEST, "Title and blog selection are required"));
    };

    let slug = blog_repo::find_published_slug(&pool, blog_id)
        .await?
        .ok_or_else(|| AppError::new(StatusCode::BAD_REQUEST, "Selected blog not found or not published"))?;

    let image_url = match files.get("banner_image") {
        Some(file) => store.save(file, Some("banners")).map_err(|e| {
            tracing::warn!("banner image upload rejected: {}", e);
            AppError::new(StatusCode::BAD_REQUEST, "Failed to upload banner image")
        })?,
        None => return Err(AppError::new(StatusCode::BAD_REQUEST, "Banner image is required")),
    };

    // link target is never client-supplied; it always follows the blog slug
    let link_url = format!("/blog/{}", slug);

    let mut sort_order = input.sort_order.unwrap_or(0);
    if sort_order == 0 {
        sort_order = repo::max_sort_order(&pool).await? + 1;
    }
    let is_active = input.is_active.unwrap_or(true);

    let banner_id = repo::insert_banner(
        &pool,
        &title,
        input.subtitle.as_deref().unwrap_or(""),
        &image_url,
        &link_url,
        blog_id,
        sort_order,
        is_active,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Banner created successfully",
            "banner_id": banner_id,
            "image_url": image_url,
            "link_url": link_url,
        })),
    ))
}

pub async fn update_banner(
    Extension(pool): Extension<PgPool>,
    Extension(store): Extension<Arc<UploadStore>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let (input, files) = read_input(&headers, &body)?;
    let input = input.sanitized();

    let (Some(id), Some(title), Some(blog_id)) = (
        input.id,
        input.title.clone().filter(|t| !t.is_empty()),
        input.blog_id,
    ) else {
        return Err(AppError::new(StatusCode::BAD_REQUEST, "ID, title, and blog selection are required"));
    };

    let slug = blog_repo::find_published_slug(&pool, blog_id)
        .await?
        .ok_or_else(|| AppError::new(StatusCode::BAD_REQUEST, "Selected blog not found or not published"))?;
    let link_url = format!("/blog/{}", slug);

    let image_url = match files.get("banner_image") {
        Some(file) => Some(store.save(file, Some("banners")).map_err(|e| {
            tracing::warn!("banner image upload rejected: {}", e);
            AppError::new(StatusCode::BAD_REQUEST, "Failed to upload banner image")
        })?),
        None => None,
    };

    let rows = repo::update_banner(
        &pool,
        id,
        &title,
        input.subtitle.as_deref().unwrap_or(""),
        image_url.as_deref(),
        &link_url,
        blog_id,
        input.sort_order.unwrap_or(0),
        input.is_active.unwrap_or(true),
    )
    .await?;
    if rows == 0 {
        return Err(AppError::new(StatusCode::NOT_FOUND, "Banner not found"));
    }

    Ok(Json(json!({
        "message": "Banner updated successfully",
        "link_url": link_url,
    })))
}

pub async fn delete_banner(
    Extension(pool): Extension<PgPool>,
    Query(query): Query<IdQuery>,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let id = delete_id(query.id, &body)
        .ok_or_else(|| AppError::new(StatusCode::BAD_REQUEST, "Banner ID required for deletion"))?;

    let rows = repo::delete_banner(&pool, id).await?;
    if rows == 0 {
        return Err(AppError::new(StatusCode::NOT_FOUND, "Banner not found"));
    }
    Ok(Json(json!({ "message": "Banner deleted successfully" })))
}
