use axum::{
    body::Body,
    extract::{ConnectInfo, Request},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};

/// Type alias for the public governor layer (IP-based rate limiting)
pub type PublicGovernorLayer = GovernorLayer<
    tower_governor::key_extractor::PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware<governor::clock::QuantaInstant>,
    Body,
>;

/// Create a GovernorLayer for the public booking and quote routes (per IP address)
/// - 100 requests per minute (one token every 600ms)
/// - Quotes are cheap, but every booking writes a reservation
pub fn create_public_governor() -> PublicGovernorLayer {
    let config = Arc::new(
        GovernorConfigBuilder::default()
            .per_millisecond(600)
            .burst_size(100)
            .finish()
            .expect("public rate limit configuration is valid"),
    );

    GovernorLayer::new(config)
}

fn route_group(path: &str) -> &'static str {
    if path.starts_with("/api/admin") {
        "admin"
    } else if path.starts_with("/api/") {
        "public"
    } else {
        "other"
    }
}

/// Log every request with its route group; flags quotes and bookings the
/// public governor turned away.
pub async fn log_request(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let group = route_group(&path);

    let response = next.run(request).await;
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        tracing::warn!(client_ip = %addr.ip(), %method, path = %path, group, "Public rate limit hit");
    } else if status.is_server_error() {
        tracing::error!(client_ip = %addr.ip(), %method, path = %path, group, %status, "Request failed");
    } else if status.is_client_error() {
        tracing::info!(client_ip = %addr.ip(), %method, path = %path, group, %status, "Request rejected");
    } else {
        tracing::debug!(client_ip = %addr.ip(), %method, path = %path, group, %status, "Request served");
    }

    response
}
