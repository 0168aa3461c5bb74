use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::SET_COOKIE},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::{
    AppState,
    cookies::{CookieMutation, parse_cookie_headers},
    gatekeeper::{Decision, RequestContext},
};

/// gatekeeper_middleware
///
/// Axum adapter around `Gatekeeper::evaluate`. Excluded prefixes (API, static assets,
/// favicon) pass straight through. Everything else is either redirected (307) or
/// forwarded, and in both cases the provider's cookie mutations are written as
/// `Set-Cookie` headers on the response that actually leaves.
pub async fn gatekeeper_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path();
    if state.config.is_excluded(path) {
        return next.run(request).await;
    }

    let ctx = RequestContext::new(path).with_cookies(parse_cookie_headers(request.headers()));
    let outcome = state.gatekeeper.evaluate(&ctx).await;

    if let Some(denial) = outcome.denial {
        tracing::info!(
            denial = denial.kind(),
            path = %ctx.path,
            location = outcome.location().unwrap_or_default(),
            "{denial}"
        );
    }

    let mut response = match &outcome.decision {
        Decision::Continue => next.run(request).await,
        Decision::Redirect(location) => Redirect::temporary(location).into_response(),
    };

    apply_cookies(response.headers_mut(), &outcome.cookies);
    response
}

/// Appends one `Set-Cookie` header per mutation. Values that cannot form a header are
/// logged and dropped rather than failing the response.
pub fn apply_cookies(headers: &mut HeaderMap, cookies: &[CookieMutation]) {
    for cookie in cookies {
        match cookie.to_header_value() {
            Ok(value) => {
                headers.append(SET_COOKIE, value);
            }
            Err(e) => tracing::error!(cookie = %cookie.name, error = %e, "invalid cookie dropped"),
        }
    }
}
