//! Core Router
//!
//! Mounts the API routes behind the auth pipeline. Requests pass through
//! `mw_extract_token` and then `mw_resolve_identity` before any handler runs.

use crate::core::auth::handlers as auth_handlers;
use crate::core::auth::middleware::{mw_extract_token, mw_resolve_identity};
use crate::core::error::Error;
use crate::core::AppState;
use crate::handlers::{self, testing};
use axum::{
    handler::HandlerWithoutStateExt,
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::services::ServeDir;

pub fn router(state: AppState) -> Router {
    let mut api = Router::new()
        .route(
            "/api/blogs",
            get(handlers::list_blogs).post(handlers::create_blog),
        )
        .route(
            "/api/blogs/{id}",
            put(handlers::update_blog).delete(handlers::delete_blog),
        )
        .route(
            "/api/users",
            get(handlers::list_users).post(handlers::create_user),
        )
        .route("/api/login", post(auth_handlers::login));

    if state.config.mode.is_test() {
        api = api.route("/api/testing/reset", post(testing::reset));
    }

    let api = match &state.config.static_dir {
        Some(dir) => api.fallback_service(
            ServeDir::new(dir)
                .call_fallback_on_method_not_allowed(true)
                .not_found_service(unknown_endpoint.into_service()),
        ),
        None => api.fallback(unknown_endpoint),
    };

    api.method_not_allowed_fallback(unknown_endpoint)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            mw_resolve_identity,
        ))
        .layer(middleware::from_fn(mw_extract_token))
        .with_state(state)
}

async fn unknown_endpoint() -> Error {
    Error::UnknownEndpoint
}
