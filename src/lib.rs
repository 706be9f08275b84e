pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod services;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_support;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{
        HeaderValue, Method,
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    },
    routing::{get, post},
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::{
    config::Config,
    middleware::REQUEST_ID_HEADER,
    repositories::{CategoryRegistry, CommentRepository, UserRepository},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub users: Arc<dyn UserRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub threads: Arc<CategoryRegistry>,
}

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(
            state
                .config
                .allowed_origins
                .iter()
                .filter_map(|origin| origin.parse::<HeaderValue>().ok())
                .collect::<Vec<_>>(),
        )
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE]);

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/auth/signup", post(handlers::auth::signup))
        .route("/auth/signin", post(handlers::auth::signin))
        .route("/health", get(handlers::health::health))
        .route("/version", get(handlers::health::version));

    // Protected routes, every handler extracts AuthUser
    let api_routes = Router::new()
        // Thread routes
        .route(
            "/c/{category}",
            post(handlers::threads::create_thread).get(handlers::threads::list_threads),
        )
        .route(
            "/c/{category}/t/{thread_id}",
            get(handlers::threads::get_thread).delete(handlers::threads::delete_thread),
        )
        .route(
            "/c/{category}/t/{thread_id}/vote",
            post(handlers::threads::vote_thread),
        )
        // Comment routes
        .route(
            "/c/{category}/t/{thread_id}/com",
            post(handlers::comments::create_comment).get(handlers::comments::list_comments),
        )
        .route(
            "/c/{category}/t/{thread_id}/com/{comment_id}",
            get(handlers::comments::get_comment).delete(handlers::comments::delete_comment),
        )
        .route(
            "/c/{category}/t/{thread_id}/com/{comment_id}/vote",
            post(handlers::comments::vote_comment),
        )
        // User routes
        .route("/users", get(handlers::users::search_users))
        .route("/users/admin", post(handlers::users::create_admin))
        .route(
            "/users/{username}",
            get(handlers::users::get_user).delete(handlers::users::delete_user),
        )
        .route(
            "/users/{username}/comments",
            get(handlers::users::list_user_comments),
        )
        .route(
            "/users/{username}/deactivate",
            post(handlers::users::deactivate_user),
        );

    let body_limit = state.config.request_body_limit_bytes;

    Router::new()
        .merge(public_routes)
        .nest("/api/1.0", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(
                    REQUEST_ID_HEADER.clone(),
                    MakeRequestUuid,
                ))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::new(REQUEST_ID_HEADER.clone()))
                .layer(cors)
                .layer(axum::middleware::from_fn(middleware::error_envelope))
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(state)
}
