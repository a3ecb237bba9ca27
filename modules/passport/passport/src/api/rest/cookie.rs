//! Session cookie encoding.

use axum::http::{HeaderMap, header};
use cookie::{Cookie, SameSite};

/// Cookie attributes taken from the session config.
#[derive(Debug, Clone)]
pub struct CookieSettings {
    pub name: String,
    pub secure: bool,
}

impl CookieSettings {
    /// Long-lived `HttpOnly; SameSite=Lax` cookie carrying `token`.
    #[must_use]
    pub fn session(&self, token: String) -> Cookie<'static> {
        Cookie::build((self.name.clone(), token))
            .http_only(true)
            .same_site(SameSite::Lax)
            .path("/")
            .secure(self.secure)
            .permanent()
            .build()
    }

    /// Expired cookie that makes the client drop the session token.
    #[must_use]
    pub fn removal(&self) -> Cookie<'static> {
        let mut cookie = Cookie::build((self.name.clone(), ""))
            .http_only(true)
            .same_site(SameSite::Lax)
            .path("/")
            .secure(self.secure)
            .build();
        cookie.make_removal();
        cookie
    }

    /// Reads the session token from the request's `Cookie` headers.
    #[must_use]
    pub fn token(&self, headers: &HeaderMap) -> Option<String> {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(Cookie::split_parse)
            .filter_map(Result::ok)
            .find(|c| c.name() == self.name && !c.value().is_empty())
            .map(|c| c.value().to_owned())
    }
}
