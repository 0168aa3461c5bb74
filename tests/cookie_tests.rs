use axum::http::{HeaderMap, HeaderValue, header::COOKIE};
use chrono::{TimeZone, Utc};
use osvita_portal::{
    cookies::{CookieMutation, CookieOptions, SameSite, parse_cookie_headers},
    locale::{Locale, first_segment, has_segment},
    models::Role,
};

fn headers(values: &[&str]) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for value in values {
        headers.append(COOKIE, HeaderValue::from_str(value).unwrap());
    }
    headers
}

// --- Parsing ---

#[test]
fn test_parse_single_header_with_whitespace() {
    let cookies = parse_cookie_headers(&headers(&["preferred-locale=en;  sb-access-token = abc.def "]));

    assert_eq!(cookies.get("preferred-locale").map(String::as_str), Some("en"));
    assert_eq!(cookies.get("sb-access-token").map(String::as_str), Some("abc.def"));
}

#[test]
fn test_parse_merges_repeated_headers_first_wins() {
    let cookies = parse_cookie_headers(&headers(&[
        "sb-access-token=first",
        "sb-access-token=second; theme=dark",
    ]));

    assert_eq!(cookies.get("sb-access-token").map(String::as_str), Some("first"));
    assert_eq!(cookies.get("theme").map(String::as_str), Some("dark"));
}

#[test]
fn test_parse_skips_malformed_pairs() {
    let cookies = parse_cookie_headers(&headers(&["novalue; =orphan; ok=1; ;"]));

    assert_eq!(cookies.len(), 1);
    assert_eq!(cookies.get("ok").map(String::as_str), Some("1"));
}

#[test]
fn test_parse_keeps_equals_inside_value_and_strips_quotes() {
    let cookies = parse_cookie_headers(&headers(&[r#"token=a=b==; quoted="en""#]));

    assert_eq!(cookies.get("token").map(String::as_str), Some("a=b=="));
    assert_eq!(cookies.get("quoted").map(String::as_str), Some("en"));
}

#[test]
fn test_parse_without_cookie_header_is_empty() {
    assert!(parse_cookie_headers(&HeaderMap::new()).is_empty());
}

// --- Rendering ---

#[test]
fn test_render_default_options() {
    let cookie = CookieMutation::new("sb-access-token", "abc", CookieOptions::default());

    assert_eq!(
        cookie.to_set_cookie(),
        "sb-access-token=abc; Path=/; HttpOnly; SameSite=Lax"
    );
}

#[test]
fn test_render_all_attributes() {
    let cookie = CookieMutation::new(
        "sb-refresh-token",
        "xyz",
        CookieOptions {
            path: "/uk".to_string(),
            max_age: Some(60),
            expires: Some(Utc.with_ymd_and_hms(2030, 1, 2, 3, 4, 5).unwrap()),
            http_only: false,
            secure: true,
            same_site: SameSite::Strict,
        },
    );

    assert_eq!(
        cookie.to_set_cookie(),
        "sb-refresh-token=xyz; Path=/uk; Max-Age=60; Expires=Wed, 02 Jan 2030 03:04:05 GMT; Secure; SameSite=Strict"
    );
}

#[test]
fn test_removal_expires_immediately() {
    let cookie = CookieMutation::removal("sb-access-token", true);

    assert_eq!(
        cookie.to_set_cookie(),
        "sb-access-token=; Path=/; Max-Age=0; HttpOnly; Secure; SameSite=Lax"
    );
    assert!(cookie.to_header_value().is_ok());
}

#[test]
fn test_invalid_header_value_is_reported() {
    let cookie = CookieMutation::new("bad", "line\nbreak", CookieOptions::default());
    assert!(cookie.to_header_value().is_err());
}

// --- Locale and role vocabulary ---

#[test]
fn test_locale_parsing_is_exact() {
    assert_eq!(Locale::parse("uk"), Some(Locale::Uk));
    assert_eq!(Locale::parse("en"), Some(Locale::En));
    assert_eq!(Locale::parse("UK"), None);
    assert_eq!(Locale::parse("de"), None);
    assert_eq!(Locale::default(), Locale::Uk);
    assert!("fr".parse::<Locale>().is_err());
}

#[test]
fn test_path_segment_helpers() {
    assert_eq!(first_segment("/"), None);
    assert_eq!(first_segment("/en/news"), Some("en"));
    assert_eq!(Locale::from_path("/en"), Some(Locale::En));
    assert_eq!(Locale::from_path("/english/news"), None);
    assert!(has_segment("/uk/a/admin/b", "admin"));
    assert!(!has_segment("/uk/administrator", "admin"));
}

#[test]
fn test_role_vocabulary() {
    assert_eq!(Role::parse("teacher"), Some(Role::Teacher));
    assert_eq!(Role::parse("superuser"), None);
    assert!(Role::Admin.can_moderate());
    assert!(Role::Teacher.can_moderate());
    assert!(!Role::Student.can_moderate());
    assert_eq!(serde_json::to_string(&Role::Student).unwrap(), "\"student\"");
}
