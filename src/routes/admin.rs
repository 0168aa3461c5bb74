use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Admin Router Module
///
/// Content moderation pages. The gatekeeper resolves the session and requires the
/// `teacher` or `admin` role before any of these handlers run.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/{locale}/admin", get(handlers::admin_home))
        // GET /{locale}/admin/{section}
        // One of lessons, news, posts, users; anything else is a 404.
        .route("/{locale}/admin/{section}", get(handlers::admin_section))
}
