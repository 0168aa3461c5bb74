use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::locale::Locale;

// --- Identity ---

/// Role
///
/// The RBAC value stored in `public.profiles.role`. Only `teacher` and `admin`
/// may enter the admin area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Role {
    Student,
    Teacher,
    Admin,
}

impl Role {
    /// Parses the database representation. Unknown values are not roles.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "student" => Some(Role::Student),
            "teacher" => Some(Role::Teacher),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
            Role::Admin => "admin",
        }
    }

    /// Whether this role may manage content under `/{locale}/admin`.
    pub fn can_moderate(&self) -> bool {
        matches!(self, Role::Teacher | Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// SessionUser
///
/// The identity the session provider resolves from a session token. The role is
/// looked up separately, on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct SessionUser {
    pub id: Uuid,
    pub email: Option<String>,
}

// --- Response Schemas ---

/// SessionProfile
///
/// Output of `GET /api/me`: the resolved session user plus their role, if a profile exists.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct SessionProfile {
    pub id: Uuid,
    pub email: Option<String>,
    pub role: Option<Role>,
}

/// PageResponse
///
/// Placeholder payload for the locale-prefixed pages. Real rendering lives in the
/// frontend; the server only confirms which page and language were requested.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct PageResponse {
    pub locale: Locale,
    pub page: String,
    pub title: String,
}

/// ErrorResponse
///
/// Uniform JSON body for 4xx answers from the page and API handlers.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ErrorResponse {
    pub error: String,
}
