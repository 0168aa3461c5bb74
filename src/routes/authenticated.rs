use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Authenticated Router Module
///
/// Pages under a `dashboard` segment. The gatekeeper only lets a request through here
/// when a session cookie is present; it does not resolve the identity.
pub fn authenticated_routes() -> Router<AppState> {
    Router::new()
        // GET /{locale}/dashboard
        // Also the landing spot for signed-in users refused from the admin area.
        .route("/{locale}/dashboard", get(handlers::dashboard))
}
