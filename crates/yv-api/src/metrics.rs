//! Request metrics exported at `/metrics`.

use std::time::Instant;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

const REQUESTS: &str = "yv_http_requests_total";
const LATENCY: &str = "yv_http_request_duration_seconds";
const IN_FLIGHT: &str = "yv_http_requests_in_flight";

/// Installs the global recorder. The handle renders the scrape body.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Route template for a concrete path, keeping label cardinality bounded:
/// numeric segments become `:id`, the segment after `channels` becomes
/// `:name`, and anything under `/media` collapses.
fn route_label(path: &str) -> String {
    if path.starts_with("/media/") {
        return "/media/*".to_string();
    }
    let segments: Vec<&str> = path.split('/').collect();
    segments
        .iter()
        .enumerate()
        .map(|(i, &segment)| {
            if i > 0 && segments[i - 1] == "channels" {
                ":name"
            } else if !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()) {
                ":id"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let route = route_label(request.uri().path());
    let started = Instant::now();

    gauge!(IN_FLIGHT).increment(1.0);
    let response = next.run(request).await;
    gauge!(IN_FLIGHT).decrement(1.0);

    let labels = [
        ("method", method),
        ("path", route),
        ("status", response.status().as_u16().to_string()),
    ];
    counter!(REQUESTS, &labels).increment(1);
    histogram!(LATENCY, &labels).record(started.elapsed().as_secs_f64());
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_label() {
        assert_eq!(route_label("/api/videos/42"), "/api/videos/:id");
        assert_eq!(
            route_label("/api/playlists/7/videos/9"),
            "/api/playlists/:id/videos/:id"
        );
        assert_eq!(route_label("/api/channels/neo"), "/api/channels/:name");
        assert_eq!(
            route_label("/api/channels/u-1/subscription"),
            "/api/channels/:name/subscription"
        );
        assert_eq!(route_label("/media/videos/a.mp4"), "/media/*");
        assert_eq!(route_label("/health"), "/health");
    }
}
