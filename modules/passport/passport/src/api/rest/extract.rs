use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use axum::http::{Extensions, HeaderMap, header};
use passport_sdk::{AuthContext, ClientInfo};

use super::RestState;
use super::problem::Problem;
use crate::domain::error::DomainError;

const FORWARDED_FOR: &str = "x-forwarded-for";

fn rest_state(parts: &Parts) -> Result<Arc<RestState>, Problem> {
    parts
        .extensions
        .get::<Arc<RestState>>()
        .cloned()
        .ok_or_else(|| DomainError::Internal(anyhow::anyhow!("RestState extension missing")).into())
}

/// Key the rate limiter counts against: the peer IP, or the first
/// `X-Forwarded-For` hop when the proxy is trusted.
#[must_use]
pub fn client_key(headers: &HeaderMap, extensions: &Extensions, trust_forwarded_for: bool) -> String {
    if trust_forwarded_for
        && let Some(hop) = headers
            .get(FORWARDED_FOR)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|hop| !hop.is_empty())
    {
        return hop.to_owned();
    }

    extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map_or_else(|| "unknown".to_owned(), |ConnectInfo(addr)| addr.ip().to_string())
}

/// Resolved context of a signed-in caller. Rejects with 401 otherwise.
#[derive(Debug, Clone)]
pub struct Authenticated(pub AuthContext);

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = Problem;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let state = rest_state(parts)?;
        let token = state
            .cookies
            .token(&parts.headers)
            .ok_or(DomainError::AuthenticationRequired)?;

        match state.services.sessions.resume(&token).await? {
            Some(ctx) => Ok(Self(ctx)),
            None => Err(DomainError::AuthenticationRequired.into()),
        }
    }
}

/// Client metadata recorded on new sessions.
#[derive(Debug, Clone)]
pub struct Client(pub ClientInfo);

impl<S> FromRequestParts<S> for Client
where
    S: Send + Sync,
{
    type Rejection = Problem;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let state = rest_state(parts)?;
        let ip = client_key(&parts.headers, &parts.extensions, state.trust_forwarded_for);
        let user_agent = parts
            .headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        Ok(Self(ClientInfo {
            ip_address: (ip != "unknown").then_some(ip),
            user_agent,
        }))
    }
}
