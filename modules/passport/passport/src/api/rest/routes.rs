use std::sync::Arc;

use axum::middleware::from_fn_with_state;
use axum::routing::{delete, get, post};
use axum::{Extension, Router};

use super::RestState;
use super::handlers;
use super::middleware::{Throttle, rate_limit};
use crate::domain::rate_limit::Endpoint;

/// Builds the passport router.
///
/// Throttled handlers are registered before their `route_layer`, so the
/// limiter only wraps the issuing and exchanging methods of a path.
#[must_use]
pub fn register_routes(router: Router, state: Arc<RestState>) -> Router {
    let throttle = |endpoint| {
        from_fn_with_state(
            Throttle {
                state: Arc::clone(&state),
                endpoint,
            },
            rate_limit,
        )
    };

    router
        .route("/health", get(handlers::health))
        .route(
            "/auth/v1/session",
            post(handlers::request_sign_in)
                .route_layer(throttle(Endpoint::SignIn))
                .get(handlers::show_session)
                .delete(handlers::sign_out),
        )
        .route(
            "/auth/v1/session/magic-link",
            post(handlers::exchange_code)
                .route_layer(throttle(Endpoint::MagicLink))
                .get(handlers::show_exchange),
        )
        .route(
            "/auth/v1/signup",
            post(handlers::request_sign_up).route_layer(throttle(Endpoint::SignUp)),
        )
        .route(
            "/auth/v1/signup/completion",
            get(handlers::show_completion).post(handlers::complete_sign_up),
        )
        .route("/auth/v1/account", get(handlers::show_account))
        .route("/auth/v1/account/members", get(handlers::list_members))
        .route(
            "/auth/v1/account/members/{id}",
            delete(handlers::deactivate_member),
        )
        .route(
            "/articles/v1/articles",
            get(handlers::list_articles).post(handlers::create_article),
        )
        .route(
            "/articles/v1/articles/{id}",
            get(handlers::show_article)
                .patch(handlers::update_article)
                .delete(handlers::delete_article),
        )
        .route(
            "/articles/v1/articles/{id}/publish",
            post(handlers::publish_article),
        )
        .route(
            "/articles/v1/articles/{id}/unpublish",
            post(handlers::unpublish_article),
        )
        .layer(Extension(state))
}
