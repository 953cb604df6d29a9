//! Prometheus metrics shared by both services
//!
//! Every request is counted in `http_requests_total` and timed in
//! `http_request_duration_seconds`, labeled by method, matched route and
//! status code. The registry is exposed in the text exposition format.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{MatchedPath, Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use prometheus::core::Collector;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

const LABELS: &[&str] = &["method", "route", "status"];

/// Per-service metrics registry
#[derive(Clone)]
pub struct HttpMetrics {
    inner: Arc<Inner>,
}

struct Inner {
    registry: Registry,
    requests: IntCounterVec,
    latency: HistogramVec,
}

impl HttpMetrics {
    /// Create a registry whose metrics all carry `service=<service>`.
    pub fn new(service: &str) -> prometheus::Result<Self> {
        let registry = Registry::new();

        let requests = IntCounterVec::new(
            Opts::new("http_requests_total", "Total HTTP requests handled")
                .const_label("service", service),
            LABELS,
        )?;
        let latency = HistogramVec::new(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "HTTP request latency in seconds",
            )
            .const_label("service", service),
            LABELS,
        )?;
        let info = IntGauge::with_opts(
            Opts::new("app_info", "Application build information")
                .const_label("service", service)
                .const_label("version", env!("CARGO_PKG_VERSION")),
        )?;
        info.set(1);

        registry.register(Box::new(requests.clone()))?;
        registry.register(Box::new(latency.clone()))?;
        registry.register(Box::new(info))?;

        Ok(Self {
            inner: Arc::new(Inner {
                registry,
                requests,
                latency,
            }),
        })
    }

    /// Register an additional collector in this registry.
    pub fn register<C>(&self, collector: C) -> prometheus::Result<C>
    where
        C: Collector + Clone + 'static,
    {
        self.inner.registry.register(Box::new(collector.clone()))?;
        Ok(collector)
    }

    pub fn observe(&self, method: &str, route: &str, status: u16, elapsed: Duration) {
        let status = status.to_string();
        let labels = [method, route, status.as_str()];
        self.inner.requests.with_label_values(&labels).inc();
        self.inner
            .latency
            .with_label_values(&labels)
            .observe(elapsed.as_secs_f64());
    }

    /// Render every registered metric in the text exposition format.
    pub fn render(&self) -> prometheus::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.inner.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

/// Middleware recording count and latency of every request.
pub async fn track(State(metrics): State<HttpMetrics>, req: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = req.method().to_string();
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_owned());

    let response = next.run(req).await;

    metrics.observe(&method, &route, response.status().as_u16(), started.elapsed());
    response
}

/// Scrape endpoint body
pub fn scrape(metrics: &HttpMetrics) -> Response {
    match metrics.render() {
        Ok(body) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("failed to render metrics: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus::IntCounter;

    #[test]
    fn observe_is_rendered_with_labels() {
        let metrics = HttpMetrics::new("backend").unwrap();
        metrics.observe("GET", "/data", 200, Duration::from_millis(12));
        metrics.observe("GET", "/data", 200, Duration::from_millis(8));

        let text = metrics.render().unwrap();
        assert!(text.contains("http_requests_total"));
        assert!(text.contains(r#"route="/data""#));
        assert!(text.contains(r#"service="backend""#));
        assert!(text.contains(r#"status="200""#));
        assert!(text.contains("http_request_duration_seconds_bucket"));
        assert!(text.contains("app_info"));
    }

    #[test]
    fn extra_collectors_are_exported() {
        let metrics = HttpMetrics::new("frontend").unwrap();
        let counter = metrics
            .register(IntCounter::new("backend_retries_total", "Retries").unwrap())
            .unwrap();
        counter.inc_by(3);

        let text = metrics.render().unwrap();
        assert!(text.contains("backend_retries_total 3"));
    }

    #[test]
    fn duplicate_registration_fails() {
        let metrics = HttpMetrics::new("frontend").unwrap();
        let counter = IntCounter::new("dup_total", "dup").unwrap();
        metrics.register(counter.clone()).unwrap();
        assert!(metrics.register(counter).is_err());
    }
}
