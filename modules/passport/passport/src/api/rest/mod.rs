//! JSON REST surface.
//!
//! Handlers receive shared state through `Extension<Arc<RestState>>`; the
//! [`extract::Authenticated`] extractor resumes the session from the cookie
//! and hands the resolved context to each protected handler.

pub mod cookie;
pub mod dto;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod problem;
pub mod routes;


use crate::domain::service::AppServices;

use self::cookie::CookieSettings;

/// Everything a handler needs beyond the request itself.
pub struct RestState {
    pub services: AppServices,
    pub cookies: CookieSettings,
    /// Echo issued codes in issuance responses. Development only.
    pub reveal_codes: bool,
    pub trust_forwarded_for: bool,
}
