use axum::body::Body;
use axum::http::Request;
use axum::middleware::Next;
use axum::{routing::get, Router};
use prometheus::{Encoder, TextEncoder, IntCounterVec, Opts, Registry, HistogramVec, HistogramOpts};
use std::sync::Arc;

#[derive(Clone)]
pub struct MetricsPlugin {
    registry: Arc<Registry>,
    pub request_counter: Arc<IntCounterVec>,
    pub request_duration: Arc<HistogramVec>,
}

impl MetricsPlugin {
    pub fn new() -> Self {
        let registry = Registry::new();
        let ctr_opts = Opts::new("requests_total", "Total HTTP requests");
        let counter = IntCounterVec::new(ctr_opts, &["method", "plugin", "status"]).expect("counter");
        registry.register(Box::new(counter.clone())).ok();

        let hist_opts = HistogramOpts::new("request_duration_seconds", "HTTP request latencies in seconds");
        let histogram = HistogramVec::new(hist_opts, &["method", "plugin"]).expect("histogram");
        registry.register(Box::new(histogram.clone())).ok();

        // register process collector only on Linux when the prometheus `process` feature is enabled
        #[cfg(target_os = "linux")]
        {
            let collector = prometheus::process_collector::ProcessCollector::for_self();
            registry.register(Box::new(collector)).ok();
        }

        MetricsPlugin {
            registry: Arc::new(registry),
            request_counter: Arc::new(counter),
            request_duration: Arc::new(histogram),
        }
    }

    /// Wraps a plugin router so every request through it is counted and timed
    /// under the plugin's mount name.
    pub fn instrument(&self, router: Router, plugin: &'static str) -> Router {
        let counter = self.request_counter.clone();
        let duration = self.request_duration.clone();
        router.layer(axum::middleware::from_fn(move |req: Request<Body>, next: Next| {
            let counter = counter.clone();
            let duration = duration.clone();
            async move {
                let method = req.method().as_str().to_string();
                let timer = duration.with_label_values(&[&method, plugin]).start_timer();
                let resp = next.run(req).await;
                timer.observe_duration();
                counter
                    .with_label_values(&[&method, plugin, resp.status().as_str()])
                    .inc();
                resp
            }
        }))
    }

    pub fn router(&self) -> Router {
        let reg = self.registry.clone();
        Router::new().route("/", get(move || {
            let encoder = TextEncoder::new();
            let metric_families = reg.gather();
            let mut buffer = Vec::new();
            encoder.encode(&metric_families, &mut buffer).unwrap_or_default();
            let body = String::from_utf8_lossy(&buffer).into_owned();
            async move { (axum::http::StatusCode::OK, body) }
        }))
    }
}
