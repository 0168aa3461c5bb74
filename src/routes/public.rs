use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Public Router Module
///
/// Locale-prefixed pages anyone can read. Requests without a locale prefix never get
/// here: the gatekeeper redirects them to `/{locale}{path}` first.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /{locale} and /{locale}/
        // The redirect target for `/` is `/{locale}/`, so both spellings resolve.
        .route("/{locale}", get(handlers::home))
        .route("/{locale}/", get(handlers::home))
        .route("/{locale}/lessons", get(handlers::lessons))
        .route("/{locale}/news", get(handlers::news))
        .route("/{locale}/blog", get(handlers::blog))
        // GET /{locale}/login
        // Where the gatekeeper sends visitors with no (or an unusable) session.
        .route("/{locale}/login", get(handlers::login))
}
