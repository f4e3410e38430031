use axum::extract::DefaultBodyLimit;
use axum::{middleware, routing::{delete, get, post, put}, Extension, Router};
use crate::kernel::Plugin;
use crate::storage::upload::MAX_UPLOAD_BYTES;
use crate::plugins::books::handlers::*;
use crate::storage::UploadStore;
use sqlx::PgPool;
use std::sync::Arc;

pub struct BooksPlugin {
    pub pool: PgPool,
    pub store: Arc<UploadStore>,
}

impl BooksPlugin {
    pub fn new(pool: PgPool, store: Arc<UploadStore>) -> Self {
        Self { pool, store }
    }
}

#[async_trait::async_trait]
impl Plugin for BooksPlugin {
    async fn router(&self) -> Router {
        Router::new()
            .route("/", get(list_books))
            .route("/", post(create_book))
            .route("/", put(update_book))
            .route("/", delete(delete_book))
            .layer(middleware::from_fn(crate::plugins::auth::middleware::require_admin))
            // one cover image plus form fields
            .layer(DefaultBodyLimit::max(2 * MAX_UPLOAD_BYTES))
            .layer(Extension(self.pool.clone()))
            .layer(Extension(self.store.clone()))
    }

    fn name(&self) -> &'static str { "books" }
}
