mod common;

use common::{
    create_test_db_and_pool, png_bytes, seed_admin_and_login, spawn_full_app, temp_upload_store,
    test_database_url,
};
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde_json::Value;

async fn create_blog(
    client: &reqwest::Client,
    base: &str,
    token: &str,
    title: &str,
) -> anyhow::Result<i64> {
    let resp = client
        .post(format!("{}/blog", base))
        .bearer_auth(token)
        .json(&serde_json::json!({
            "title": title,
            "content": "content for book tests",
            "category_id": 1
        }))
        .send()
        .await?;
    anyhow::ensure!(resp.status() == StatusCode::CREATED, "blog create failed: {}", resp.status());
    let body: Value = resp.json().await?;
    Ok(body["blog_id"].as_i64().unwrap())
}

#[tokio::test]
async fn book_crud_with_cover_upload() -> anyhow::Result<()> {
    let (pool, _guard) = create_test_db_and_pool(&test_database_url()).await?;
    let store = temp_upload_store();
    let (base, server_handle) = spawn_full_app(pool.clone(), store.clone()).await?;
    let client = reqwest::Client::new();
    let token = seed_admin_and_login(&pool, &base, &client).await?;

    let blog_id = create_blog(&client, &base, &token, "Book Host").await?;

    let form = Form::new()
        .text("blog_id", blog_id.to_string())
        .text("title", "Walden")
        .text("author", "H. D. Thoreau")
        .text("purchase_link", "https://shop.example/walden")
        .text("price", "12.50")
        .part(
            "cover_image",
            Part::bytes(png_bytes()).file_name("walden.png").mime_str("image/png").unwrap(),
        );
    let resp = client
        .post(format!("{}/books", base))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = resp.json().await?;
    assert_eq!(created["message"].as_str(), Some("Related book created successfully"));
    let book_id = created["book_id"].as_i64().unwrap();
    let cover_rel = created["cover_image"].as_str().unwrap().to_string();
    assert!(cover_rel.starts_with("uploads/book_covers/"), "got {cover_rel}");
    assert!(store.resolve(&cover_rel).exists());

    // list filtered by blog returns the book with an absolute cover url
    let resp = client
        .get(format!("{}/books?blog_id={}", base, blog_id))
        .bearer_auth(&token)
        .send()
        .await?;
    let body: Value = resp.json().await?;
    let items = body["books"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["blog_title"].as_str(), Some("Book Host"));
    let cover = items[0]["cover_image"].as_str().unwrap();
    assert!(cover.starts_with("http"), "got {cover}");
    assert!(cover.ends_with(cover_rel.rsplit('/').next().unwrap()));

    // JSON update without a new cover keeps the stored one
    let resp = client
        .put(format!("{}/books", base))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "id": book_id,
            "blog_id": blog_id,
            "title": "Walden; or, Life in the Woods",
            "purchase_link": "https://shop.example/walden"
        }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .get(format!("{}/books?blog_id={}", base, blog_id))
        .bearer_auth(&token)
        .send()
        .await?;
    let body: Value = resp.json().await?;
    let items = body["books"].as_array().unwrap();
    assert_eq!(items[0]["title"].as_str(), Some("Walden; or, Life in the Woods"));
    assert!(items[0]["cover_image"].as_str().unwrap().starts_with("http"));

    // delete removes the row and the backing file
    let resp = client
        .delete(format!("{}/books?id={}", base, book_id))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(!store.resolve(&cover_rel).exists());

    let resp = client
        .delete(format!("{}/books?id={}", base, book_id))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    server_handle.abort();
    let _ = server_handle.await;
    Ok(())
}

#[tokio::test]
async fn book_input_validation() -> anyhow::Result<()> {
    let (pool, _guard) = create_test_db_and_pool(&test_database_url()).await?;
    let store = temp_upload_store();
    let (base, server_handle) = spawn_full_app(pool.clone(), store).await?;
    let client = reqwest::Client::new();
    let token = seed_admin_and_login(&pool, &base, &client).await?;

    // missing required fields
    let resp = client
        .post(format!("{}/books", base))
        .bearer_auth(&token)
        .json(&serde_json::json!({"title": "Lonely Book"}))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await?;
    assert_eq!(body["error"].as_str(), Some("Blog ID, title, and purchase link are required"));

    // blog reference must exist
    let resp = client
        .post(format!("{}/books", base))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "blog_id": 999999,
            "title": "Orphan Book",
            "purchase_link": "https://shop.example/orphan"
        }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await?;
    assert_eq!(body["error"].as_str(), Some("Blog not found"));

    // delete only accepts a query-string id
    let resp = client
        .delete(format!("{}/books", base))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await?;
    assert_eq!(body["error"].as_str(), Some("Book ID required for deletion"));

    // update of a missing book
    let resp = client
        .put(format!("{}/books", base))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "id": 424242,
            "blog_id": 1,
            "title": "Ghost",
            "purchase_link": "https://shop.example/ghost"
        }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    server_handle.abort();
    let _ = server_handle.await;
    Ok(())
}
