/// Router Module Index
///
/// Page routes are split by who may reach them. Every page route carries the locale as
/// its first segment; the gatekeeper middleware wrapped around the whole router makes
/// sure that holds and enforces the access level each module documents.

/// Pages open to everyone, signed in or not.
pub mod public;

/// Pages that need a session cookie (`dashboard` segment).
pub mod authenticated;

/// Pages restricted to teachers and admins (`admin` segment).
pub mod admin;

/// JSON endpoints under `/api/`, excluded from the gatekeeper.
pub mod api;
