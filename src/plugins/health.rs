use crate::kernel::Plugin;
use axum::{routing::get, Json, Router};
use serde::Serialize;

/// Liveness probe for the deployment; no database round-trip involved.
#[derive(Serialize)]
struct HealthStatus {
    status: &'static str,
    service: &'static str,
}

pub struct HealthPlugin;

async fn health_handler() -> Json<HealthStatus> {
    Json(HealthStatus { status: "ok", service: "boganto-api" })
}

#[async_trait::async_trait]
impl Plugin for HealthPlugin {
    async fn router(&self) -> Router {
        Router::new().route("/", get(health_handler))
    }

    fn name(&self) -> &'static str {
        "health"
    }

    async fn on_start(&self) {
        tracing::info!("health endpoint ready");
    }
}
