//! The request gatekeeper: locale normalization, then authentication, then authorization.
//!
//! Each gate either ends evaluation with a redirect or hands over to the next one. The
//! decision depends only on the path, the cookies and what the session provider answers,
//! so it can be exercised without HTTP at all.

use std::collections::HashMap;

use crate::{
    config::AppConfig,
    cookies::CookieMutation,
    error::GateDenial,
    locale::{Locale, has_segment},
    session::{SessionState, SessionTokens, UserLookup},
};

const ADMIN_SEGMENT: &str = "admin";
const DASHBOARD_SEGMENT: &str = "dashboard";

/// RequestContext
///
/// What the gatekeeper sees of a request: its path (no query string) and its cookies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub path: String,
    pub cookies: HashMap<String, String>,
}

impl RequestContext {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            cookies: HashMap::new(),
        }
    }

    pub fn with_cookies(mut self, cookies: HashMap<String, String>) -> Self {
        self.cookies = cookies;
        self
    }

    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Hand the request to the page or handler untouched.
    Continue,
    /// Answer with a redirect to this location.
    Redirect(String),
}

/// GateOutcome
///
/// The full result of one evaluation. `cookies` must be applied to whichever response is
/// finally sent; `denial` records why a request was turned away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateOutcome {
    pub decision: Decision,
    pub cookies: Vec<CookieMutation>,
    pub denial: Option<GateDenial>,
}

impl GateOutcome {
    fn allow() -> Self {
        Self {
            decision: Decision::Continue,
            cookies: vec![],
            denial: None,
        }
    }

    fn redirect(location: String) -> Self {
        Self {
            decision: Decision::Redirect(location),
            cookies: vec![],
            denial: None,
        }
    }

    fn deny(location: String, denial: GateDenial) -> Self {
        Self {
            decision: Decision::Redirect(location),
            cookies: vec![],
            denial: Some(denial),
        }
    }

    fn with_cookies(mut self, cookies: Vec<CookieMutation>) -> Self {
        self.cookies = cookies;
        self
    }

    pub fn is_continue(&self) -> bool {
        self.decision == Decision::Continue
    }

    pub fn location(&self) -> Option<&str> {
        match &self.decision {
            Decision::Redirect(location) => Some(location),
            Decision::Continue => None,
        }
    }
}

/// Gatekeeper
///
/// Holds the injected session provider and the cookie names it reads. Cheap to clone.
#[derive(Clone)]
pub struct Gatekeeper {
    sessions: SessionState,
    locale_cookie: String,
    session_cookie: String,
    refresh_cookie: String,
}

impl Gatekeeper {
    pub fn new(sessions: SessionState, config: &AppConfig) -> Self {
        Self {
            sessions,
            locale_cookie: config.locale_cookie.clone(),
            session_cookie: config.session_cookie.clone(),
            refresh_cookie: config.refresh_cookie.clone(),
        }
    }

    /// Runs the three gates in order. Never fails: provider errors become redirects.
    pub async fn evaluate(&self, ctx: &RequestContext) -> GateOutcome {
        // Gate 1: locale. Runs before any auth so anonymous visitors can always land.
        let Some(locale) = Locale::from_path(&ctx.path) else {
            let locale = self.preferred_locale(ctx);
            return GateOutcome::redirect(localized(locale, &ctx.path));
        };

        let is_admin = has_segment(&ctx.path, ADMIN_SEGMENT);
        if !is_admin && !has_segment(&ctx.path, DASHBOARD_SEGMENT) {
            return GateOutcome::allow();
        }

        // Gate 2: authentication is only a presence check.
        let Some(access_token) = ctx.cookie(&self.session_cookie).filter(|t| !t.is_empty())
        else {
            return GateOutcome::deny(localized(locale, "/login"), GateDenial::MissingSession);
        };

        if !is_admin {
            return GateOutcome::allow();
        }

        // Gate 3: authorization for the admin area.
        let mut tokens = SessionTokens::new(access_token);
        if let Some(refresh_token) = ctx.cookie(&self.refresh_cookie).filter(|t| !t.is_empty()) {
            tokens = tokens.with_refresh(refresh_token);
        }
        self.authorize(locale, &tokens).await
    }

    async fn authorize(&self, locale: Locale, tokens: &SessionTokens) -> GateOutcome {
        let login = localized(locale, "/login");

        let UserLookup { user, cookies } = match self.sessions.get_current_user(tokens).await {
            Ok(lookup) => lookup,
            Err(e) => {
                tracing::warn!(error = %e, "identity lookup failed, failing closed");
                return GateOutcome::deny(login, GateDenial::ProviderUnavailable);
            }
        };

        let Some(user) = user else {
            return GateOutcome::deny(login, GateDenial::IdentityNotFound).with_cookies(cookies);
        };

        match self.sessions.get_user_role(user.id).await {
            Ok(Some(role)) if role.can_moderate() => GateOutcome::allow().with_cookies(cookies),
            Ok(role) => {
                tracing::debug!(user_id = %user.id, ?role, "admin area refused");
                GateOutcome::deny(localized(locale, "/dashboard"), GateDenial::InsufficientRole)
                    .with_cookies(cookies)
            }
            Err(e) => {
                tracing::warn!(user_id = %user.id, error = %e, "role lookup failed, failing closed");
                // The session may already have been rotated; the new cookies still apply.
                GateOutcome::deny(login, GateDenial::ProviderUnavailable).with_cookies(cookies)
            }
        }
    }

    /// The `preferred-locale` cookie when it names a supported locale, else the default.
    pub fn preferred_locale(&self, ctx: &RequestContext) -> Locale {
        ctx.cookie(&self.locale_cookie)
            .and_then(Locale::parse)
            .unwrap_or_default()
    }
}

/// Prefixes `path` with the locale segment: `/news` becomes `/uk/news`, `/` becomes `/uk/`.
pub fn localized(locale: Locale, path: &str) -> String {
    if path.starts_with('/') {
        format!("/{locale}{path}")
    } else {
        format!("/{locale}/{path}")
    }
}
