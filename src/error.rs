use thiserror::Error;

/// ProviderError
///
/// Failures raised by a `SessionProvider`. The gatekeeper treats every variant as
/// "not authenticated"; the distinction only reaches the logs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// Supabase auth could not be reached or answered with a server error.
    #[error("session provider unavailable: {0}")]
    Unavailable(String),
    /// The profiles query failed.
    #[error("profile lookup failed: {0}")]
    Database(String),
    /// The provider answered, but the payload could not be understood.
    #[error("malformed provider response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ProviderError::Malformed(e.to_string())
        } else {
            ProviderError::Unavailable(e.to_string())
        }
    }
}

impl From<sqlx::Error> for ProviderError {
    fn from(e: sqlx::Error) -> Self {
        ProviderError::Database(e.to_string())
    }
}

/// GateDenial
///
/// Why the gatekeeper turned a request away. Every denial ends in a redirect, so this
/// is carried for observability only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GateDenial {
    #[error("no session cookie on a protected path")]
    MissingSession,
    #[error("session provider failed while resolving identity or role")]
    ProviderUnavailable,
    #[error("session token did not resolve to a user")]
    IdentityNotFound,
    #[error("user role is not permitted in the admin area")]
    InsufficientRole,
}

impl GateDenial {
    /// Short machine-readable tag used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            GateDenial::MissingSession => "missing_session",
            GateDenial::ProviderUnavailable => "provider_unavailable",
            GateDenial::IdentityNotFound => "identity_not_found",
            GateDenial::InsufficientRole => "insufficient_role",
        }
    }
}
