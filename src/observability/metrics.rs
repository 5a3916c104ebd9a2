//! Metrics collection and exposition.
//!
//! # Metrics
//! - `trellis_requests_total` (counter): requests by method, route, status
//! - `trellis_request_duration_seconds` (histogram): latency distribution
//! - `trellis_view_renders_total` (counter): template renders by outcome
//! - `trellis_view_render_duration_seconds` (histogram)
//!
//! # Design Decisions
//! - Route label is the route name (or `-`), never the raw path,
//!   to keep label cardinality bounded

use std::net::SocketAddr;
use std::time::Duration;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Serve Prometheus metrics on `addr`. Must run inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Label for a request's route, `-` when nothing matched.
fn route_label(route: Option<&str>) -> String {
    route.unwrap_or("-").to_string()
}

pub fn record_request(method: &str, route: Option<&str>, status: u16, elapsed: Duration) {
    let route = route_label(route);
    metrics::counter!(
        "trellis_requests_total",
        "method" => method.to_string(),
        "route" => route.clone(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!(
        "trellis_request_duration_seconds",
        "method" => method.to_string(),
        "route" => route
    )
    .record(elapsed.as_secs_f64());
}

pub fn record_view_render(ok: bool, elapsed: Duration) {
    let outcome = if ok { "ok" } else { "error" };
    metrics::counter!("trellis_view_renders_total", "outcome" => outcome).increment(1);
    metrics::histogram!("trellis_view_render_duration_seconds").record(elapsed.as_secs_f64());
}
