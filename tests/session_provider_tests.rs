use axum::{
    Json, Router,
    http::{HeaderMap, StatusCode},
    routing::post,
};
use jsonwebtoken::{EncodingKey, Header, encode};
use osvita_portal::{
    AppConfig, SupabaseSessionProvider,
    config::Env,
    error::ProviderError,
    session::{Claims, SessionProvider, SessionTokens},
};
use serde_json::{Value, json};
use sqlx::postgres::PgPoolOptions;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::net::TcpListener;
use uuid::Uuid;

// --- Helper Functions ---

const TEST_JWT_SECRET: &str = "test-secret-value-1234567890";
const TEST_USER_ID: Uuid = Uuid::from_u128(42);
const REFRESHED_USER_ID: Uuid = Uuid::from_u128(43);

fn now() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize
}

fn token_signed_with(secret: &str, iat: usize, exp: usize) -> String {
    let claims = Claims {
        sub: TEST_USER_ID,
        email: Some("reader@osvita.test".to_string()),
        iat,
        exp,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

fn valid_token() -> String {
    token_signed_with(TEST_JWT_SECRET, now(), now() + 3600)
}

fn expired_token() -> String {
    token_signed_with(TEST_JWT_SECRET, now() - 7200, now() - 3600)
}

/// Builds a provider against `supabase_url`. The pool is lazy and never used here.
fn provider(supabase_url: &str, env: Env) -> SupabaseSessionProvider {
    let config = AppConfig {
        supabase_url: supabase_url.to_string(),
        supabase_anon_key: "anon-key".to_string(),
        jwt_secret: TEST_JWT_SECRET.to_string(),
        env,
        ..AppConfig::default()
    };
    let pool = PgPoolOptions::new()
        .connect_lazy(&config.db_url)
        .expect("lazy pool");
    SupabaseSessionProvider::new(pool, reqwest::Client::new(), &config)
}

/// Serves a fake Supabase `/auth/v1/token` endpoint and returns its base URL.
async fn spawn_supabase(status: StatusCode, body: Value) -> String {
    let app = Router::new().route(
        "/auth/v1/token",
        post(move |headers: HeaderMap, Json(payload): Json<Value>| {
            let body = body.clone();
            async move {
                if headers.get("apikey").and_then(|v| v.to_str().ok()) != Some("anon-key") {
                    return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "no apikey" })));
                }
                if payload["refresh_token"] != "refresh-me" {
                    return (StatusCode::BAD_REQUEST, Json(json!({ "error": "invalid_grant" })));
                }
                (status, Json(body))
            }
        }),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    address
}

fn refreshed_body() -> Value {
    json!({
        "access_token": "new-access",
        "refresh_token": "new-refresh",
        "expires_in": 3600,
        "token_type": "bearer",
        "user": { "id": REFRESHED_USER_ID, "email": "reader@osvita.test" }
    })
}

// --- Tests ---

#[tokio::test]
async fn test_valid_token_resolves_locally() {
    // Nothing listens on the Supabase URL: a valid token must not trigger a call.
    let provider = provider("http://127.0.0.1:1", Env::Local);

    let lookup = provider
        .get_current_user(&SessionTokens::new(valid_token()))
        .await
        .unwrap();

    let user = lookup.user.expect("user");
    assert_eq!(user.id, TEST_USER_ID);
    assert_eq!(user.email.as_deref(), Some("reader@osvita.test"));
    assert!(lookup.cookies.is_empty());
}

#[tokio::test]
async fn test_foreign_signature_is_anonymous() {
    let provider = provider("http://127.0.0.1:1", Env::Local);
    let forged = token_signed_with("someone-elses-secret", now(), now() + 3600);

    let lookup = provider
        .get_current_user(&SessionTokens::new(forged).with_refresh("refresh-me"))
        .await
        .unwrap();

    assert!(lookup.user.is_none());
    assert!(lookup.cookies.is_empty());
}

#[tokio::test]
async fn test_garbage_token_is_anonymous() {
    let provider = provider("http://127.0.0.1:1", Env::Local);

    let lookup = provider
        .get_current_user(&SessionTokens::new("not-a-jwt"))
        .await
        .unwrap();

    assert!(lookup.user.is_none());
}

#[tokio::test]
async fn test_expired_token_without_refresh_is_anonymous() {
    let provider = provider("http://127.0.0.1:1", Env::Local);

    let lookup = provider
        .get_current_user(&SessionTokens::new(expired_token()))
        .await
        .unwrap();

    assert!(lookup.user.is_none());
}

#[tokio::test]
async fn test_expired_token_is_refreshed_and_cookies_returned() {
    let url = spawn_supabase(StatusCode::OK, refreshed_body()).await;
    let provider = provider(&url, Env::Production);

    let lookup = provider
        .get_current_user(&SessionTokens::new(expired_token()).with_refresh("refresh-me"))
        .await
        .unwrap();

    assert_eq!(lookup.user.expect("user").id, REFRESHED_USER_ID);

    let rendered: Vec<String> = lookup.cookies.iter().map(|c| c.to_set_cookie()).collect();
    assert_eq!(
        rendered,
        vec![
            "sb-access-token=new-access; Path=/; Max-Age=3600; HttpOnly; Secure; SameSite=Lax"
                .to_string(),
            "sb-refresh-token=new-refresh; Path=/; Max-Age=34560000; HttpOnly; Secure; SameSite=Lax"
                .to_string(),
        ]
    );
}

#[tokio::test]
async fn test_rejected_refresh_clears_cookies() {
    let url = spawn_supabase(StatusCode::OK, refreshed_body()).await;
    let provider = provider(&url, Env::Local);

    let lookup = provider
        .get_current_user(&SessionTokens::new(expired_token()).with_refresh("revoked"))
        .await
        .unwrap();

    assert!(lookup.user.is_none());
    let names: Vec<&str> = lookup.cookies.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["sb-access-token", "sb-refresh-token"]);
    assert!(lookup.cookies.iter().all(|c| c.options.max_age == Some(0)));
}

#[tokio::test]
async fn test_supabase_server_error_is_unavailable() {
    let url = spawn_supabase(StatusCode::BAD_GATEWAY, json!({ "error": "upstream" })).await;
    let provider = provider(&url, Env::Local);

    let result = provider
        .get_current_user(&SessionTokens::new(expired_token()).with_refresh("refresh-me"))
        .await;

    assert!(matches!(result, Err(ProviderError::Unavailable(_))));
}

#[tokio::test]
async fn test_unexpected_refresh_payload_is_malformed() {
    let url = spawn_supabase(StatusCode::OK, json!({ "unexpected": true })).await;
    let provider = provider(&url, Env::Local);

    let result = provider
        .get_current_user(&SessionTokens::new(expired_token()).with_refresh("refresh-me"))
        .await;

    assert!(matches!(result, Err(ProviderError::Malformed(_))));
}

#[tokio::test]
async fn test_unreachable_supabase_is_unavailable() {
    let provider = provider("http://127.0.0.1:1", Env::Local);

    let result = provider
        .get_current_user(&SessionTokens::new(expired_token()).with_refresh("refresh-me"))
        .await;

    assert!(matches!(result, Err(ProviderError::Unavailable(_))));
}
