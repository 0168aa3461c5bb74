use crate::{
    AppState,
    cookies::parse_cookie_headers,
    locale::Locale,
    middleware::apply_cookies,
    models::{ErrorResponse, PageResponse, SessionProfile},
    session::SessionTokens,
};
use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};

/// Sections of the admin area that have a page.
const ADMIN_SECTIONS: &[&str] = &["lessons", "news", "posts", "users"];

/// Localized page titles. Full dictionaries live with the frontend; these only label
/// the placeholder responses.
fn title(locale: Locale, page: &str) -> &'static str {
    match (locale, page) {
        (Locale::Uk, "home") => "Головна",
        (Locale::En, "home") => "Home",
        (Locale::Uk, "lessons") => "Уроки",
        (Locale::En, "lessons") => "Lessons",
        (Locale::Uk, "news") => "Новини",
        (Locale::En, "news") => "News",
        (Locale::Uk, "blog") => "Блог",
        (Locale::En, "blog") => "Blog",
        (Locale::Uk, "login") => "Вхід",
        (Locale::En, "login") => "Sign in",
        (Locale::Uk, "dashboard") => "Кабінет",
        (Locale::En, "dashboard") => "Dashboard",
        (Locale::Uk, "posts") => "Дописи",
        (Locale::En, "posts") => "Posts",
        (Locale::Uk, "users") => "Користувачі",
        (Locale::En, "users") => "Users",
        (Locale::Uk, _) => "Адміністрування",
        (Locale::En, _) => "Administration",
    }
}

/// Builds a placeholder page, rejecting locale segments outside the supported set.
fn render_page(locale: &str, page: &str) -> Result<Json<PageResponse>, StatusCode> {
    let locale = Locale::parse(locale).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(PageResponse {
        locale,
        page: page.to_string(),
        title: title(locale, page.rsplit('/').next().unwrap_or(page)).to_string(),
    }))
}

// --- Public Pages ---

#[utoipa::path(
    get,
    path = "/{locale}",
    params(("locale" = Locale, Path, description = "Site language")),
    responses(
        (status = 200, description = "Home page", body = PageResponse),
        (status = 404, description = "Unsupported locale")
    )
)]
pub async fn home(Path(locale): Path<String>) -> Result<Json<PageResponse>, StatusCode> {
    render_page(&locale, "home")
}

#[utoipa::path(
    get,
    path = "/{locale}/lessons",
    params(("locale" = Locale, Path, description = "Site language")),
    responses((status = 200, description = "Lesson index", body = PageResponse))
)]
pub async fn lessons(Path(locale): Path<String>) -> Result<Json<PageResponse>, StatusCode> {
    render_page(&locale, "lessons")
}

#[utoipa::path(
    get,
    path = "/{locale}/news",
    params(("locale" = Locale, Path, description = "Site language")),
    responses((status = 200, description = "News feed", body = PageResponse))
)]
pub async fn news(Path(locale): Path<String>) -> Result<Json<PageResponse>, StatusCode> {
    render_page(&locale, "news")
}

#[utoipa::path(
    get,
    path = "/{locale}/blog",
    params(("locale" = Locale, Path, description = "Site language")),
    responses((status = 200, description = "Blog posts", body = PageResponse))
)]
pub async fn blog(Path(locale): Path<String>) -> Result<Json<PageResponse>, StatusCode> {
    render_page(&locale, "blog")
}

#[utoipa::path(
    get,
    path = "/{locale}/login",
    params(("locale" = Locale, Path, description = "Site language")),
    responses((status = 200, description = "Sign-in page", body = PageResponse))
)]
pub async fn login(Path(locale): Path<String>) -> Result<Json<PageResponse>, StatusCode> {
    render_page(&locale, "login")
}

// --- Signed-in Pages ---

/// [Authenticated Route] Only reachable once the gatekeeper has seen a session cookie.
#[utoipa::path(
    get,
    path = "/{locale}/dashboard",
    params(("locale" = Locale, Path, description = "Site language")),
    responses((status = 200, description = "Personal dashboard", body = PageResponse))
)]
pub async fn dashboard(Path(locale): Path<String>) -> Result<Json<PageResponse>, StatusCode> {
    render_page(&locale, "dashboard")
}

/// [Admin Route] The gatekeeper has already confirmed a teacher or admin role.
#[utoipa::path(
    get,
    path = "/{locale}/admin",
    params(("locale" = Locale, Path, description = "Site language")),
    responses((status = 200, description = "Admin overview", body = PageResponse))
)]
pub async fn admin_home(Path(locale): Path<String>) -> Result<Json<PageResponse>, StatusCode> {
    render_page(&locale, "admin")
}

#[utoipa::path(
    get,
    path = "/{locale}/admin/{section}",
    params(
        ("locale" = Locale, Path, description = "Site language"),
        ("section" = String, Path, description = "lessons, news, posts or users")
    ),
    responses(
        (status = 200, description = "Admin section", body = PageResponse),
        (status = 404, description = "Unknown section")
    )
)]
pub async fn admin_section(
    Path((locale, section)): Path<(String, String)>,
) -> Result<Json<PageResponse>, StatusCode> {
    if !ADMIN_SECTIONS.contains(&section.as_str()) {
        return Err(StatusCode::NOT_FOUND);
    }
    render_page(&locale, &format!("admin/{section}"))
}

// --- API ---

#[utoipa::path(
    get,
    path = "/api/health",
    responses((status = 200, description = "Service is up"))
)]
pub async fn health() -> &'static str {
    "ok"
}

/// get_me
///
/// Resolves the caller's session through the session provider and reports the user
/// and role. Lives under `/api/`, so the gatekeeper never runs in front of it.
/// Refreshed session cookies are relayed on the response.
#[utoipa::path(
    get,
    path = "/api/me",
    responses(
        (status = 200, description = "Current session", body = SessionProfile),
        (status = 401, description = "No valid session"),
        (status = 503, description = "Session provider unavailable")
    )
)]
pub async fn get_me(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let cookies = parse_cookie_headers(&headers);
    let Some(access_token) = cookies
        .get(&state.config.session_cookie)
        .filter(|t| !t.is_empty())
    else {
        return StatusCode::UNAUTHORIZED.into_response();
    };

    let mut tokens = SessionTokens::new(access_token.as_str());
    if let Some(refresh_token) = cookies
        .get(&state.config.refresh_cookie)
        .filter(|t| !t.is_empty())
    {
        tokens = tokens.with_refresh(refresh_token.as_str());
    }

    let lookup = match state.sessions.get_current_user(&tokens).await {
        Ok(lookup) => lookup,
        Err(e) => {
            tracing::warn!(error = %e, "get_me: identity lookup failed");
            return StatusCode::SERVICE_UNAVAILABLE.into_response();
        }
    };

    let mut response = match lookup.user {
        None => StatusCode::UNAUTHORIZED.into_response(),
        Some(user) => match state.sessions.get_user_role(user.id).await {
            Ok(role) => Json(SessionProfile {
                id: user.id,
                email: user.email,
                role,
            })
            .into_response(),
            Err(e) => {
                tracing::warn!(user_id = %user.id, error = %e, "get_me: role lookup failed");
                StatusCode::SERVICE_UNAVAILABLE.into_response()
            }
        },
    };

    apply_cookies(response.headers_mut(), &lookup.cookies);
    response
}

/// Fallback for every unmatched path that made it past the gatekeeper.
pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "not found".to_string(),
        }),
    )
}
