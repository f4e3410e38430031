use axum::extract::DefaultBodyLimit;
use axum::{middleware, routing::{delete, get, post, put}, Extension, Router};
use crate::kernel::Plugin;
use crate::storage::upload::MAX_UPLOAD_BYTES;
use crate::plugins::banners::handlers::*;
use crate::storage::UploadStore;
use sqlx::PgPool;
use std::sync::Arc;

pub struct BannersPlugin {
    pub pool: PgPool,
    pub store: Arc<UploadStore>,
}

impl BannersPlugin {
    pub fn new(pool: PgPool, store: Arc<UploadStore>) -> Self {
        Self { pool, store }
    }
}

#[async_trait::async_trait]
impl Plugin for BannersPlugin {
    async fn router(&self) -> Router {
        // the active-carousel listing is public; everything else is admin-only
        let public = Router::new().route("/active", get(list_active_banners));

        let protected = Router::new()
            .route("/", get(list_banners))
            .route("/", post(create_banner))
            .route("/", put(update_banner))
            .route("/", delete(delete_banner))
            .layer(middleware::from_fn(crate::plugins::auth::middleware::require_admin));

        public
            .merge(protected)
            // one banner image plus form fields
            .layer(DefaultBodyLimit::max(2 * MAX_UPLOAD_BYTES))
            .layer(Extension(self.pool.clone()))
            .layer(Extension(self.store.clone()))
    }

    fn name(&self) -> &'static str { "banners" }
}
