mod common;

use common::{
    create_test_db_and_pool, png_bytes, png_bytes_sized, seed_admin_and_login, spawn_full_app,
    temp_upload_store, test_database_url,
};
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde_json::Value;

fn png_part() -> Part {
    Part::bytes(png_bytes())
        .file_name("image.png")
        .mime_str("image/png")
        .unwrap()
}

#[tokio::test]
async fn create_blog_multipart_with_related_books() -> anyhow::Result<()> {
    let (pool, _guard) = create_test_db_and_pool(&test_database_url()).await?;
    let store = temp_upload_store();
    let (base, server_handle) = spawn_full_app(pool.clone(), store.clone()).await?;
    let client = reqwest::Client::new();
    let token = seed_admin_and_login(&pool, &base, &client).await?;

    // one valid related book plus one missing its purchase link, which must
    // be skipped rather than failing the blog create
    let related_books = serde_json::json!([
        {"title": "The Sea", "author": "A. Writer", "purchase_link": "https://shop.example/sea"},
        {"title": "No Link Book"}
    ]);
    let form = Form::new()
        .text("title", "My First Post")
        .text("content", "<p>Hello <b>world</b>, this is the body.</p>")
        .text("category_id", "3")
        .text("status", "published")
        .text("related_books", related_books.to_string())
        .part("featured_image", png_part())
        .part("book_cover_0", png_part());

    let resp = client
        .post(format!("{}/blog", base))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await?;
    let blog_id = body["blog_id"].as_i64().unwrap();
    assert_eq!(body["slug"].as_str(), Some("my-first-post"));
    assert_eq!(body["related_books_added"].as_i64(), Some(1));
    assert_eq!(
        body["message"].as_str(),
        Some("Blog created successfully with 1 related books")
    );

    // the related book landed with an uploaded cover
    let books = client
        .get(format!("{}/books?blog_id={}", base, blog_id))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(books.status(), StatusCode::OK);
    let books: Value = books.json().await?;
    let items = books["books"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["title"].as_str(), Some("The Sea"));
    let cover = items[0]["cover_image"].as_str().unwrap();
    assert!(cover.contains("/uploads/book_covers/"), "got {cover}");

    server_handle.abort();
    let _ = server_handle.await;
    Ok(())
}

#[tokio::test]
async fn upload_size_limits_span_the_allowed_range() -> anyhow::Result<()> {
    let (pool, _guard) = create_test_db_and_pool(&test_database_url()).await?;
    let store = temp_upload_store();
    let (base, server_handle) = spawn_full_app(pool.clone(), store.clone()).await?;
    let client = reqwest::Client::new();
    let token = seed_admin_and_login(&pool, &base, &client).await?;

    // 3 MiB is well past axum's stock body cap but within the allowed range
    let form = Form::new()
        .text("title", "Large Image Post")
        .text("content", "body")
        .text("category_id", "1")
        .part(
            "featured_image",
            Part::bytes(png_bytes_sized(3 * 1024 * 1024))
                .file_name("large.png")
                .mime_str("image/png")
                .unwrap(),
        );
    let resp = client
        .post(format!("{}/blog", base))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = resp.json().await?;
    let blog_id = created["blog_id"].as_i64().unwrap();

    let fetched = client
        .put(format!("{}/blog", base))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "id": blog_id,
            "title": "Large Image Post",
            "content": "body",
            "category_id": 1
        }))
        .send()
        .await?;
    let fetched: Value = fetched.json().await?;
    assert!(fetched["blog"]["featured_image"].as_str().unwrap().contains("/uploads/"));

    // past the per-file ceiling the request still reaches the handler and
    // fails as an upload rejection, not a transport error
    let form = Form::new()
        .text("title", "Oversize Image Post")
        .text("content", "body")
        .text("category_id", "1")
        .part(
            "featured_image",
            Part::bytes(png_bytes_sized(6 * 1024 * 1024))
                .file_name("oversize.png")
                .mime_str("image/png")
                .unwrap(),
        );
    let resp = client
        .post(format!("{}/blog", base))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await?;
    assert_eq!(body["error"].as_str(), Some("Failed to upload featured image"));

    server_handle.abort();
    let _ = server_handle.await;
    Ok(())
}

#[tokio::test]
async fn update_replaces_related_books_skipping_invalid_entries() -> anyhow::Result<()> {
    let (pool, _guard) = create_test_db_and_pool(&test_database_url()).await?;
    let store = temp_upload_store();
    let (base, server_handle) = spawn_full_app(pool.clone(), store).await?;
    let client = reqwest::Client::new();
    let token = seed_admin_and_login(&pool, &base, &client).await?;

    let created = client
        .post(format!("{}/blog", base))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "title": "Reading List",
            "content": "initial content",
            "category_id": 1,
            "related_books": [
                {"title": "Old Book", "purchase_link": "https://shop.example/old"}
            ]
        }))
        .send()
        .await?;
    assert_eq!(created.status(), StatusCode::CREATED);
    let created: Value = created.json().await?;
    let blog_id = created["blog_id"].as_i64().unwrap();
    assert_eq!(created["related_books_added"].as_i64(), Some(1));

    // form-mode update with three entries, one missing its title: the old
    // set is replaced by exactly the two valid entries
    let related_books = serde_json::json!([
        {"title": "First", "purchase_link": "https://shop.example/first"},
        {"title": "", "purchase_link": "https://shop.example/blank"},
        {"title": "Second", "purchase_link": "https://shop.example/second"}
    ]);
    let form = Form::new()
        .text("id", blog_id.to_string())
        .text("title", "Reading List")
        .text("content", "revised content")
        .text("category_id", "1")
        .text("related_books", related_books.to_string());
    let updated = client
        .put(format!("{}/blog", base))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await?;
    assert_eq!(updated.status(), StatusCode::OK);
    let updated: Value = updated.json().await?;
    assert_eq!(updated["related_books_updated"].as_i64(), Some(2));
    assert_eq!(
        updated["message"].as_str(),
        Some("Blog updated successfully with 2 related books")
    );
    assert_eq!(updated["blog"]["content"].as_str(), Some("revised content"));
    let books = updated["blog"]["related_books"].as_array().unwrap();
    assert_eq!(books.len(), 2);
    assert_eq!(books[0]["title"].as_str(), Some("First"));
    assert_eq!(books[1]["title"].as_str(), Some("Second"));

    // a JSON update leaves the book set alone
    let resp = client
        .put(format!("{}/blog", base))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "id": blog_id,
            "title": "Reading List",
            "content": "revised once more",
            "category_id": 1
        }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let resp: Value = resp.json().await?;
    assert!(resp.get("related_books_updated").is_none());
    assert_eq!(resp["blog"]["related_books"].as_array().unwrap().len(), 2);

    server_handle.abort();
    let _ = server_handle.await;
    Ok(())
}

#[tokio::test]
async fn blog_validation_collects_all_errors() -> anyhow::Result<()> {
    let (pool, _guard) = create_test_db_and_pool(&test_database_url()).await?;
    let store = temp_upload_store();
    let (base, server_handle) = spawn_full_app(pool.clone(), store).await?;
    let client = reqwest::Client::new();
    let token = seed_admin_and_login(&pool, &base, &client).await?;

    let resp = client
        .post(format!("{}/blog", base))
        .bearer_auth(&token)
        .json(&serde_json::json!({"title": "   "}))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = resp.json().await?;
    assert_eq!(body["error"].as_str(), Some("Validation failed"));
    let details = body["details"].as_array().unwrap();
    assert_eq!(details.len(), 3);

    server_handle.abort();
    let _ = server_handle.await;
    Ok(())
}

#[tokio::test]
async fn duplicate_title_gets_suffixed_slug() -> anyhow::Result<()> {
    let (pool, _guard) = create_test_db_and_pool(&test_database_url()).await?;
    let store = temp_upload_store();
    let (base, server_handle) = spawn_full_app(pool.clone(), store).await?;
    let client = reqwest::Client::new();
    let token = seed_admin_and_login(&pool, &base, &client).await?;

    let payload = serde_json::json!({
        "title": "Same Title",
        "content": "body text",
        "category_id": 1
    });
    let first = client
        .post(format!("{}/blog", base))
        .bearer_auth(&token)
        .json(&payload)
        .send()
        .await?;
    assert_eq!(first.status(), StatusCode::CREATED);
    let first: Value = first.json().await?;
    assert_eq!(first["slug"].as_str(), Some("same-title"));

    let second = client
        .post(format!("{}/blog", base))
        .bearer_auth(&token)
        .json(&payload)
        .send()
        .await?;
    assert_eq!(second.status(), StatusCode::CREATED);
    let second: Value = second.json().await?;
    let slug = second["slug"].as_str().unwrap();
    assert!(slug.starts_with("same-title-"), "got {slug}");
    assert_ne!(slug, "same-title");

    server_handle.abort();
    let _ = server_handle.await;
    Ok(())
}

#[tokio::test]
async fn update_preserves_image_unless_replaced() -> anyhow::Result<()> {
    let (pool, _guard) = create_test_db_and_pool(&test_database_url()).await?;
    let store = temp_upload_store();
    let (base, server_handle) = spawn_full_app(pool.clone(), store).await?;
    let client = reqwest::Client::new();
    let token = seed_admin_and_login(&pool, &base, &client).await?;

    let form = Form::new()
        .text("title", "Post With Image")
        .text("content", "original content")
        .text("category_id", "2")
        .part("featured_image", png_part());
    let created = client
        .post(format!("{}/blog", base))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await?;
    assert_eq!(created.status(), StatusCode::CREATED);
    let created: Value = created.json().await?;
    let blog_id = created["blog_id"].as_i64().unwrap();

    // JSON update without an image keeps the stored one
    let updated = client
        .put(format!("{}/blog", base))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "id": blog_id,
            "title": "Post With Image",
            "content": "revised content",
            "category_id": 2
        }))
        .send()
        .await?;
    assert_eq!(updated.status(), StatusCode::OK);
    let updated: Value = updated.json().await?;
    assert_eq!(updated["blog"]["content"].as_str(), Some("revised content"));
    let image_before = updated["blog"]["featured_image"].as_str().unwrap().to_string();
    assert!(image_before.contains("/uploads/"), "got {image_before}");

    // multipart update with a fresh file replaces it
    let form = Form::new()
        .text("id", blog_id.to_string())
        .text("title", "Post With Image")
        .text("content", "revised again")
        .text("category_id", "2")
        .part("featured_image", png_part());
    let replaced = client
        .put(format!("{}/blog", base))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await?;
    assert_eq!(replaced.status(), StatusCode::OK);
    let replaced: Value = replaced.json().await?;
    let image_after = replaced["blog"]["featured_image"].as_str().unwrap();
    assert!(image_after.contains("/uploads/"));
    assert_ne!(image_after, image_before);

    server_handle.abort();
    let _ = server_handle.await;
    Ok(())
}

#[tokio::test]
async fn delete_blog_by_query_or_body() -> anyhow::Result<()> {
    let (pool, _guard) = create_test_db_and_pool(&test_database_url()).await?;
    let store = temp_upload_store();
    let (base, server_handle) = spawn_full_app(pool.clone(), store).await?;
    let client = reqwest::Client::new();
    let token = seed_admin_and_login(&pool, &base, &client).await?;

    let mut ids = Vec::new();
    for i in 0..2 {
        let resp = client
            .post(format!("{}/blog", base))
            .bearer_auth(&token)
            .json(&serde_json::json!({
                "title": format!("Disposable {}", i),
                "content": "body",
                "category_id": 1
            }))
            .send()
            .await?;
        let body: Value = resp.json().await?;
        ids.push(body["blog_id"].as_i64().unwrap());
    }

    // id in the query string
    let del = client
        .delete(format!("{}/blog?id={}", base, ids[0]))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(del.status(), StatusCode::OK);

    // id in a JSON body
    let del = client
        .delete(format!("{}/blog", base))
        .bearer_auth(&token)
        .json(&serde_json::json!({"id": ids[1]}))
        .send()
        .await?;
    assert_eq!(del.status(), StatusCode::OK);

    // already gone
    let del = client
        .delete(format!("{}/blog?id={}", base, ids[0]))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(del.status(), StatusCode::NOT_FOUND);

    // no id anywhere
    let del = client
        .delete(format!("{}/blog", base))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(del.status(), StatusCode::BAD_REQUEST);

    server_handle.abort();
    let _ = server_handle.await;
    Ok(())
}
