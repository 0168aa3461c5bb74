use async_trait::async_trait;
use jsonwebtoken::{DecodingKey, Validation, decode, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};
use uuid::Uuid;

use crate::{
    config::{AppConfig, Env},
    cookies::{CookieMutation, CookieOptions},
    error::ProviderError,
    models::{Role, SessionUser},
};

/// Supabase keeps refresh tokens usable for 400 days; the cookie mirrors that.
const REFRESH_COOKIE_MAX_AGE: i64 = 400 * 24 * 60 * 60;

/// SessionTokens
///
/// The raw credentials found in the request cookies. The refresh token is only
/// consulted when the access token has expired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: Option<String>,
}

impl SessionTokens {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
        }
    }

    pub fn with_refresh(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }
}

/// UserLookup
///
/// Result of resolving a session: the user (if any) plus the cookies the provider
/// wants written back, e.g. after a token refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserLookup {
    pub user: Option<SessionUser>,
    pub cookies: Vec<CookieMutation>,
}

impl UserLookup {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn found(user: SessionUser) -> Self {
        Self {
            user: Some(user),
            cookies: vec![],
        }
    }
}

/// SessionProvider Trait
///
/// The contract the gatekeeper and the `/api/me` handler use to turn a session cookie
/// into an identity and a role. Implementations own token issuance and refresh; callers
/// only relay the returned cookie mutations.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Resolves the session to a user. `Ok` with no user means "not signed in".
    async fn get_current_user(&self, tokens: &SessionTokens) -> Result<UserLookup, ProviderError>;

    /// Looks up the user's role. `Ok(None)` when no profile (or no known role) exists.
    async fn get_user_role(&self, user_id: Uuid) -> Result<Option<Role>, ProviderError>;
}

/// SessionState
///
/// The shared handle injected into `AppState`.
pub type SessionState = Arc<dyn SessionProvider>;

/// Claims
///
/// The subset of a Supabase access token payload the site relies on.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the `auth.users.id`, which is also `public.profiles.id`.
    pub sub: Uuid,
    pub email: Option<String>,
    pub exp: usize,
    pub iat: usize,
}

#[derive(Deserialize)]
struct RefreshedSession {
    access_token: String,
    refresh_token: String,
    expires_in: i64,
    user: RefreshedUser,
}

#[derive(Deserialize)]
struct RefreshedUser {
    id: Uuid,
    email: Option<String>,
}

/// SupabaseSessionProvider
///
/// Verifies access tokens locally with the project JWT secret, refreshes expired
/// sessions through the Supabase auth API and reads roles from `public.profiles`.
#[derive(Clone)]
pub struct SupabaseSessionProvider {
    pool: PgPool,
    http: reqwest::Client,
    supabase_url: String,
    anon_key: String,
    decoding_key: DecodingKey,
    session_cookie: String,
    refresh_cookie: String,
    secure_cookies: bool,
}

impl SupabaseSessionProvider {
    pub fn new(pool: PgPool, http: reqwest::Client, config: &AppConfig) -> Self {
        Self {
            pool,
            http,
            supabase_url: config.supabase_url.clone(),
            anon_key: config.supabase_anon_key.clone(),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            session_cookie: config.session_cookie.clone(),
            refresh_cookie: config.refresh_cookie.clone(),
            secure_cookies: config.env == Env::Production,
        }
    }

    /// Exchanges a refresh token for a new session.
    ///
    /// A rejected refresh token (4xx) clears both cookies and yields no user; transport
    /// failures and 5xx answers are errors.
    async fn refresh(&self, refresh_token: &str) -> Result<UserLookup, ProviderError> {
        let response = self
            .http
            .post(format!(
                "{}/auth/v1/token?grant_type=refresh_token",
                self.supabase_url
            ))
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({ "refresh_token": refresh_token }))
            .send()
            .await?;

        let status = response.status();
        if status.is_server_error() {
            return Err(ProviderError::Unavailable(format!(
                "token refresh returned {status}"
            )));
        }
        if !status.is_success() {
            tracing::debug!(%status, "refresh token rejected, clearing session cookies");
            return Ok(UserLookup {
                user: None,
                cookies: vec![
                    CookieMutation::removal(&self.session_cookie, self.secure_cookies),
                    CookieMutation::removal(&self.refresh_cookie, self.secure_cookies),
                ],
            });
        }

        let session: RefreshedSession = response.json().await?;

        let cookies = vec![
            CookieMutation::new(
                &self.session_cookie,
                session.access_token,
                CookieOptions {
                    max_age: Some(session.expires_in),
                    secure: self.secure_cookies,
                    ..CookieOptions::default()
                },
            ),
            CookieMutation::new(
                &self.refresh_cookie,
                session.refresh_token,
                CookieOptions {
                    max_age: Some(REFRESH_COOKIE_MAX_AGE),
                    secure: self.secure_cookies,
                    ..CookieOptions::default()
                },
            ),
        ];

        Ok(UserLookup {
            user: Some(SessionUser {
                id: session.user.id,
                email: session.user.email,
            }),
            cookies,
        })
    }
}

#[async_trait]
impl SessionProvider for SupabaseSessionProvider {
    async fn get_current_user(&self, tokens: &SessionTokens) -> Result<UserLookup, ProviderError> {
        let mut validation = Validation::default();
        validation.validate_exp = true;
        // Supabase stamps `aud: authenticated`; the signature is what we trust.
        validation.validate_aud = false;

        let expired = match decode::<Claims>(&tokens.access_token, &self.decoding_key, &validation)
        {
            Ok(data) => {
                return Ok(UserLookup::found(SessionUser {
                    id: data.claims.sub,
                    email: data.claims.email,
                }));
            }
            Err(e) => {
                tracing::debug!(kind = ?e.kind(), "access token rejected");
                matches!(e.kind(), ErrorKind::ExpiredSignature)
            }
        };

        match tokens.refresh_token.as_deref() {
            Some(refresh_token) if expired => self.refresh(refresh_token).await,
            _ => Ok(UserLookup::anonymous()),
        }
    }

    async fn get_user_role(&self, user_id: Uuid) -> Result<Option<Role>, ProviderError> {
        // `role` may be a Postgres enum; read it as text.
        let role = sqlx::query_scalar::<_, Option<String>>(
            "SELECT role::text FROM profiles WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .flatten();

        Ok(role.as_deref().and_then(|value| {
            let parsed = Role::parse(value);
            if parsed.is_none() {
                tracing::warn!(%user_id, role = value, "profile carries an unknown role");
            }
            parsed
        }))
    }
}

/// InMemorySessionProvider
///
/// A map-backed provider for tests. It can be told to
/// fail and to hand back refreshed cookies, and it counts identity lookups.
#[derive(Default)]
pub struct InMemorySessionProvider {
    users: HashMap<String, SessionUser>,
    roles: HashMap<Uuid, Role>,
    user_failure: Option<ProviderError>,
    role_failure: Option<ProviderError>,
    refreshed_cookies: Vec<CookieMutation>,
    lookups: AtomicUsize,
}

impl InMemorySessionProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `token` as a session for `user`, optionally with a profile role.
    pub fn with_user(mut self, token: impl Into<String>, user: SessionUser, role: Option<Role>) -> Self {
        if let Some(role) = role {
            self.roles.insert(user.id, role);
        }
        self.users.insert(token.into(), user);
        self
    }

    /// Every identity lookup fails with `error`.
    pub fn failing_users(mut self, error: ProviderError) -> Self {
        self.user_failure = Some(error);
        self
    }

    /// Every role lookup fails with `error`.
    pub fn failing_roles(mut self, error: ProviderError) -> Self {
        self.role_failure = Some(error);
        self
    }

    /// Cookies returned alongside every successful identity lookup.
    pub fn with_refreshed_cookies(mut self, cookies: Vec<CookieMutation>) -> Self {
        self.refreshed_cookies = cookies;
        self
    }

    /// Number of `get_current_user` calls served so far.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionProvider for InMemorySessionProvider {
    async fn get_current_user(&self, tokens: &SessionTokens) -> Result<UserLookup, ProviderError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = &self.user_failure {
            return Err(error.clone());
        }
        Ok(UserLookup {
            user: self.users.get(&tokens.access_token).cloned(),
            cookies: self.refreshed_cookies.clone(),
        })
    }

    async fn get_user_role(&self, user_id: Uuid) -> Result<Option<Role>, ProviderError> {
        if let Some(error) = &self.role_failure {
            return Err(error.clone());
        }
        Ok(self.roles.get(&user_id).copied())
    }
}
