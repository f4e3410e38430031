use crate::kernel::Plugin;
use crate::plugins::auth::handlers;
use crate::plugins::auth::middleware::require_admin;
use async_trait::async_trait;
use axum::{middleware, routing::{get, post}, Router};
use sqlx::PgPool;

/// Admin account plugin: a public login route issuing bearer tokens, and a
/// gated identity check.
pub struct AuthPlugin {
    pool: PgPool,
}

impl AuthPlugin {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Plugin for AuthPlugin {
    async fn router(&self) -> Router {
        let public = Router::new().route("/login", post(handlers::login));

        let protected = Router::new()
            .route("/whoami", get(handlers::whoami))
            .layer(middleware::from_fn(require_admin));

        public.merge(protected).with_state(self.pool.clone())
    }

    fn name(&self) -> &'static str {
        "auth"
    }
}
