use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use super::RestState;
use super::extract::client_key;
use super::problem::Problem;
use crate::domain::rate_limit::Endpoint;

/// State for one throttled route.
#[derive(Clone)]
pub struct Throttle {
    pub state: Arc<RestState>,
    pub endpoint: Endpoint,
}

/// Counts the request against the caller's window and short-circuits with
/// 429 once the cap is reached.
pub async fn rate_limit(
    State(Throttle { state, endpoint }): State<Throttle>,
    request: Request,
    next: Next,
) -> Response {
    let key = client_key(
        request.headers(),
        request.extensions(),
        state.trust_forwarded_for,
    );

    if let Err(e) = state.services.limiter.check(&key, endpoint) {
        return Problem::from(e)
            .with_instance(request.uri().path())
            .into_response();
    }

    next.run(request).await
}
