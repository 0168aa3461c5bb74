use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// API Router Module
///
/// JSON endpoints. The `/api/` prefix is on the gatekeeper's exclusion list, so these
/// handlers do their own session handling where they need one.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // GET /api/health
        // Liveness probe for the load balancer.
        .route("/api/health", get(handlers::health))
        // GET /api/me
        // The caller's session user and role, or 401.
        .route("/api/me", get(handlers::get_me))
}
