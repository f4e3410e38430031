use axum::extract::DefaultBodyLimit;
use axum::{middleware, routing::{delete, post, put}, Extension, Router};
use crate::kernel::Plugin;
use crate::storage::upload::MAX_UPLOAD_BYTES;
use crate::plugins::blog::handlers::*;
use crate::storage::UploadStore;
use sqlx::PgPool;
use std::sync::Arc;

pub struct BlogPlugin {
    pub pool: PgPool,
    pub store: Arc<UploadStore>,
}

impl BlogPlugin {
    pub fn new(pool: PgPool, store: Arc<UploadStore>) -> Self {
        Self { pool, store }
    }
}

#[async_trait::async_trait]
impl Plugin for BlogPlugin {
    async fn router(&self) -> Router {
        Router::new()
            .route("/", post(create_blog))
            .route("/", put(update_blog))
            .route("/", delete(delete_blog))
            .layer(middleware::from_fn(crate::plugins::auth::middleware::require_admin))
            // a submission can carry two featured images plus a cover per book
            .layer(DefaultBodyLimit::max(8 * MAX_UPLOAD_BYTES))
            .layer(Extension(self.pool.clone()))
            .layer(Extension(self.store.clone()))
    }

    fn name(&self) -> &'static str { "blog" }
}
