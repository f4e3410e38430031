use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, HeaderValue, Method};
use axum::Router;
use async_trait::async_trait;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::info;

use crate::plugins::metrics::MetricsPlugin;

#[async_trait]
pub trait Plugin: Send + Sync {
    async fn router(&self) -> Router;

    fn name(&self) -> &'static str;
    /// Optional lifecycle hook called when the kernel starts.
    async fn on_start(&self) {}
    /// Optional lifecycle hook called on shutdown.
    async fn on_shutdown(&self) {}
}

/// Builds the application router by mounting each plugin under
/// `/{plugin.name()}`, instrumenting its routes when a metrics plugin is
/// supplied, and wrapping the whole app in the CORS layer (preflight OPTIONS
/// requests are answered there and never reach a handler).
pub async fn build_app(plugins: &Vec<Box<dyn Plugin>>, metrics: Option<MetricsPlugin>) -> Router {
    let mut app = Router::new();

    for plugin in plugins.iter() {
        info!("starting plugin {}", plugin.name());
        plugin.on_start().await;
        let mut router = plugin.router().await;
        if let Some(m) = &metrics {
            router = m.instrument(router, plugin.name());
        }
        app = app.nest(&format!("/{}", plugin.name()), router);
    }

    app.layer(cors_layer())
}

fn cors_layer() -> CorsLayer {
    let configured = std::env::var("ALLOWED_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:5173,http://localhost:3000".to_string());
    let origins: Vec<HeaderValue> = configured
        .split(',')
        .filter_map(|o| o.trim().parse::<HeaderValue>().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, HeaderName::from_static("x-requested-with")])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}
