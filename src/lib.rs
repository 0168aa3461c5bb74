use axum::{Router, extract::FromRef, http::HeaderName};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod config;
pub mod cookies;
pub mod error;
pub mod gatekeeper;
pub mod handlers;
pub mod locale;
pub mod middleware;
pub mod models;
pub mod session;

// Page routers split by access level, plus the JSON API.
pub mod routes;
use routes::{admin, api, authenticated, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use gatekeeper::{Decision, GateOutcome, Gatekeeper, RequestContext};
pub use locale::Locale;
pub use session::{InMemorySessionProvider, SessionState, SupabaseSessionProvider};

/// ApiDoc
///
/// OpenAPI document for the page and API handlers, served under `/api/docs`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::home, handlers::lessons, handlers::news, handlers::blog, handlers::login,
        handlers::dashboard, handlers::admin_home, handlers::admin_section,
        handlers::health, handlers::get_me
    ),
    components(
        schemas(
            models::PageResponse, models::SessionProfile, models::ErrorResponse,
            models::Role, locale::Locale,
        )
    ),
    tags(
        (name = "osvita-portal", description = "Bilingual educational site")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single, cheaply cloneable container shared by the gatekeeper middleware and the
/// handlers. The session provider is injected here; nothing reaches for a global client.
#[derive(Clone)]
pub struct AppState {
    /// Resolves session cookies to users and roles.
    pub sessions: SessionState,
    /// Decision core, built over the same provider.
    pub gatekeeper: Gatekeeper,
    /// The loaded, immutable environment configuration.
    pub config: AppConfig,
}

impl AppState {
    pub fn new(sessions: SessionState, config: AppConfig) -> Self {
        let gatekeeper = Gatekeeper::new(sessions.clone(), &config);
        Self {
            sessions,
            gatekeeper,
            config,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for SessionState {
    fn from_ref(app_state: &AppState) -> SessionState {
        app_state.sessions.clone()
    }
}

impl FromRef<AppState> for Gatekeeper {
    fn from_ref(app_state: &AppState) -> Gatekeeper {
        app_state.gatekeeper.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Assembles the routers, wraps all of them (fallback included) in the gatekeeper, then
/// adds request correlation, tracing and CORS.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", ApiDoc::openapi()))
        .merge(api::api_routes())
        .merge(public::public_routes())
        .merge(authenticated::authenticated_routes())
        .merge(admin::admin_routes())
        // The fallback is registered before the gatekeeper layer so unknown,
        // unprefixed paths still get their locale redirect.
        .fallback(handlers::not_found)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::gatekeeper_middleware,
        ))
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// Span per request carrying the `x-request-id`, so every log line of one request,
/// gatekeeper denials included, can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
