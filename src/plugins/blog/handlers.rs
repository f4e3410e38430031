use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::Query;
use axum::http::{HeaderMap, StatusCode};
use axum::{Extension, Json};
use chrono::Utc;
use serde_json::{json, Value};
use sqlx::PgPool;

use crate::http_error::AppError;
use crate::plugins::blog::models::{generate_slug, make_excerpt, BlogInput, RelatedBookInput};
use crate::plugins::blog::repo;
use crate::plugins::books::repo as books_repo;
use crate::plugins::shared::delete_id;
use crate::storage::{form, paths, FormPayload, UploadStore, UploadedFile};

#[derive(Debug, serde::Deserialize)]
pub struct IdQuery {
    pub id: Option<i32>,
}

/// Decodes either input mode into the same shape: a multipart body goes
/// through the form decoder (files included), anything else is a JSON body.
fn read_input(headers: &HeaderMap, body: &Bytes) -> Result<(BlogInput, HashMap<String, UploadedFile>), AppError> {
    if form::is_multipart(headers) {
        let payload = FormPayload::parse(body)
            .map_err(|e| AppError::new(StatusCode::BAD_REQUEST, e.to_string()))?;
        let input = BlogInput::from_form(&payload);
        Ok((input, payload.files))
    } else {
        let input: BlogInput = serde_json::from_slice(body)
            .map_err(|_| AppError::new(StatusCode::BAD_REQUEST, "Invalid JSON body"))?;
        Ok((input, HashMap::new()))
    }
}

/// Saves an optional image field. Absence of the field is `Ok(None)`; a file
/// that was supplied but rejected is a 400, so clients can tell the two
/// apart.
fn save_optional_image(
    store: &UploadStore,
    files: &HashMap<String, UploadedFile>,
    key: &str,
    label: &str,
) -> Result<Option<String>, AppError> {
    let Some(file) = files.get(key) else {
        return Ok(None);
    };
    let rel = store.save(file, None).map_err(|e| {
        tracing::warn!("{} upload rejected: {}", key, e);
        AppError::new(StatusCode::BAD_REQUEST, format!("Failed to upload {}", label))
    })?;
    Ok(Some(rel))
}

fn validate(input: &BlogInput, require_id: bool) -> Result<(), AppError> {
    let mut errors: Vec<&str> = Vec::new();
    if require_id && input.id.is_none() {
        errors.push("Blog ID is required for update");
    }
    if input.title.as_deref().map_or(true, |t| t.trim().is_empty()) {
        errors.push("Title is required and cannot be empty");
    }
    if input.content.as_deref().map_or(true, |c| c.trim().is_empty()) {
        errors.push("Content is required and cannot be empty");
    }
    if input.category_id.map_or(true, |c| c <= 0) {
        errors.push("Valid category is required");
    }
    if errors.is_empty() {
        Ok(())
    } else {
        tracing::warn!("blog validation errors: {}", errors.join(", "));
        Err(AppError::new(StatusCode::UNPROCESSABLE_ENTITY, "Validation failed")
            .with_details(json!(errors)))
    }
}

pub async fn create_blog(
    Extension(pool): Extension<PgPool>,
    Extension(store): Extension<Arc<UploadStore>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let (input, files) = read_input(&headers, &body)?;
    let input = input.sanitized();
    validate(&input, false)?;

    let title = input.title.clone().unwrap_or_default();
    let content = input.content.clone().unwrap_or_default();
    let category_id = input.category_id.unwrap_or_default();

    let mut slug = generate_slug(&title);
    if repo::slug_exists(&pool, &slug).await? {
        slug = format!("{}-{}", slug, Utc::now().timestamp());
    }

    let featured_image = save_optional_image(&store, &files, "featured_image", "featured image")?;
    let featured_image_2 =
        save_optional_image(&store, &files, "featured_image_2", "second featured image")?;

    let excerpt = match input.excerpt.clone().filter(|e| !e.trim().is_empty()) {
        Some(e) => e,
        None => make_excerpt(&content),
    };
    let meta_title = input.meta_title.clone().filter(|v| !v.is_empty()).unwrap_or_else(|| title.clone());
    let meta_description = input
        .meta_description
        .clone()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| excerpt.clone());
    let tags = input.tags.clone().unwrap_or_default();
    let is_featured = input.is_featured.unwrap_or(false);
    let status = input.status.clone().filter(|v| !v.is_empty()).unwrap_or_else(|| "draft".to_string());

    let blog_id = repo::insert_blog(
        &pool,
        &title,
        &slug,
        &content,
        &excerpt,
        featured_image.as_deref(),
        featured_image_2.as_deref(),
        category_id,
        &tags,
        &meta_title,
        &meta_description,
        is_featured,
        &status,
    )
    .await?;

    let books_added = match &input.related_books {
        Some(books) => {
            let added = replace_related_books(&pool, &store, blog_id, books, &files).await;
            tracing::info!("blog {}: added {} related books", blog_id, added);
            Some(added)
        }
        None => None,
    };

    let mut response = json!({
        "message": "Blog created successfully",
        "blog_id": blog_id,
        "slug": slug,
    });
    if let Some(added) = books_added {
        response["related_books_added"] = json!(added);
        if added > 0 {
            response["message"] =
                json!(format!("Blog created successfully with {} related books", added));
        }
    }

    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn update_blog(
    Extension(pool): Extension<PgPool>,
    Extension(store): Extension<Arc<UploadStore>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let is_form = form::is_multipart(&headers);
    let (input, files) = read_input(&headers, &body)?;
    let input = input.sanitized();
    validate(&input, true)?;

    let id = input.id.unwrap_or_default();
    let title = input.title.clone().unwrap_or_default();
    let content = input.content.clone().unwrap_or_default();
    let category_id = input.category_id.unwrap_or_default();

    // image columns are only touched when this request carried a new file
    let featured_image = save_optional_image(&store, &files, "featured_image", "featured image")?;
    let featured_image_2 =
        save_optional_image(&store, &files, "featured_image_2", "second featured image")?;

    repo::update_blog(
        &pool,
        id,
        &title,
        &content,
        input.excerpt.as_deref(),
        category_id,
        input.tags.as_deref().unwrap_or(""),
        input.meta_title.as_deref(),
        input.meta_description.as_deref(),
        input.is_featured.unwrap_or(false),
        input.status.as_deref().unwrap_or("draft"),
        featured_image.as_deref(),
        featured_image_2.as_deref(),
    )
    .await?;

    let books_updated = match (is_form, &input.related_books) {
        (true, Some(books)) => {
            let added = replace_related_books(&pool, &store, id, books, &files).await;
            tracing::info!("blog {}: updated with {} related books", id, added);
            Some(added)
        }
        _ => None,
    };

    let blog = repo::fetch_blog(&pool, id)
        .await?
        .ok_or_else(|| AppError::new(StatusCode::NOT_FOUND, "Blog not found"))?;
    let books = books_repo::list_for_blog_in_order(&pool, id).await?;

    let base = paths::public_base_url();
    let books_json: Vec<Value> = books
        .iter()
        .map(|b| {
            json!({
                "id": b.id,
                "blog_id": b.blog_id,
                "title": b.title,
                "author": b.author,
                "purchase_link": b.purchase_link,
                "cover_image": paths::absolutize(&base, &b.cover_image),
                "description": b.description,
                "price": b.price,
                "created_at": b.created_at,
            })
        })
        .collect();

    let mut response = json!({
        "message": "Blog updated successfully",
        "blog": {
            "id": blog.id,
            "title": blog.title,
            "slug": blog.slug,
            "content": blog.content,
            "excerpt": blog.excerpt,
            "featured_image": paths::absolutize(&base, &blog.featured_image),
            "featured_image_2": paths::absolutize(&base, &blog.featured_image_2),
            "category_id": blog.category_id,
            "tags": blog.tags,
            "meta_title": blog.meta_title,
            "meta_description": blog.meta_description,
            "is_featured": blog.is_featured,
            "status": blog.status,
            "created_at": blog.created_at,
            "updated_at": blog.updated_at,
            "related_books": books_json,
        },
    });
    if let Some(updated) = books_updated {
        response["related_books_updated"] = json!(updated);
        if updated > 0 {
            response["message"] =
                json!(format!("Blog updated successfully with {} related books", updated));
        }
    }

    Ok(Json(response))
}

pub async fn delete_blog(
    Extension(pool): Extension<PgPool>,
    Query(query): Query<IdQuery>,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let id = delete_id(query.id, &body)
        .ok_or_else(|| AppError::new(StatusCode::BAD_REQUEST, "Blog ID required for deletion"))?;

    let rows = repo::delete_blog(&pool, id).await?;
    if rows == 0 {
        return Err(AppError::new(StatusCode::NOT_FOUND, "Blog not found"));
    }
    Ok(Json(json!({ "message": "Blog deleted successfully" })))
}

/// Replace-set semantics for a blog's related books: the existing set is
/// dropped, then the submitted entries are inserted one by one. Entries
/// missing a title or purchase link are skipped; individual failures are
/// logged and reduce the reported count, but never abort the parent write.
pub(crate) async fn replace_related_books(
    pool: &PgPool,
    store: &UploadStore,
    blog_id: i32,
    books: &[RelatedBookInput],
    files: &HashMap<String, UploadedFile>,
) -> i64 {
    if let Err(e) = books_repo::delete_for_blog(pool, blog_id).await {
        tracing::error!("failed to clear related books for blog {}: {:?}", blog_id, e);
        return 0;
    }

    let mut added = 0i64;
    for (index, book) in books.iter().enumerate() {
        let title = book.title.as_deref().map(str::trim).unwrap_or("");
        let purchase_link = book.purchase_link.as_deref().map(str::trim).unwrap_or("");
        if title.is_empty() || purchase_link.is_empty() {
            continue;
        }

        // cover priority: fresh upload, then the client-echoed existing path
        let mut cover: Option<String> = None;
        if let Some(file) = files.get(&format!("book_cover_{}", index)) {
            match store.save(file, Some("book_covers")) {
                Ok(rel) => {
                    tracing::info!("book {}: new cover image uploaded - {}", index, rel);
                    cover = Some(rel);
                }
                Err(e) => tracing::warn!("book {}: cover upload rejected: {}", index, e),
            }
        }
        if cover.is_none() {
            cover = book
                .cover_image_url
                .as_deref()
                .and_then(paths::to_relative_path);
        }
        if cover.is_none() {
            cover = book.cover_image.as_deref().and_then(paths::to_relative_path);
        }

        let insert = books_repo::insert_book(
            pool,
            blog_id,
            title,
            book.author.as_deref().map(str::trim).unwrap_or(""),
            purchase_link,
            cover.as_deref(),
            book.description.as_deref().map(str::trim).unwrap_or(""),
            book.price.as_deref().map(str::trim).unwrap_or(""),
        )
        .await;
        match insert {
            Ok(_) => added += 1,
            Err(e) => tracing::error!("failed to add related book for blog {}: {:?}", blog_id, e),
        }
    }
    added
}
