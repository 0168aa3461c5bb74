use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use ts_rs::TS;
use utoipa::ToSchema;

/// Locale
///
/// The closed set of site languages. Every public URL carries one of these as its
/// first path segment (`/uk/news`, `/en/lessons`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Locale {
    #[default]
    Uk,
    En,
}

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::Uk => "uk",
            Locale::En => "en",
        }
    }

    /// Parses a locale code, yielding `None` for anything outside the supported set.
    ///
    /// Matching is exact: `UK` or ` en` are not locales.
    pub fn parse(code: &str) -> Option<Self> {
        match code {
            "uk" => Some(Locale::Uk),
            "en" => Some(Locale::En),
            _ => None,
        }
    }

    /// The locale carried by the path's first segment, if any.
    pub fn from_path(path: &str) -> Option<Self> {
        first_segment(path).and_then(Self::parse)
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedLocale(pub String);

impl fmt::Display for UnsupportedLocale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported locale: {}", self.0)
    }
}

impl std::error::Error for UnsupportedLocale {}

impl FromStr for Locale {
    type Err = UnsupportedLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| UnsupportedLocale(s.to_string()))
    }
}

/// First non-empty segment of a path, ignoring the leading slash.
///
/// `/` and the empty string have no first segment.
pub fn first_segment(path: &str) -> Option<&str> {
    path.split('/').find(|segment| !segment.is_empty())
}

/// Whether any segment of `path` is exactly `name`.
pub fn has_segment(path: &str, name: &str) -> bool {
    path.split('/').any(|segment| segment == name)
}
