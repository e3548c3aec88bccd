// Library crate for the NoteDrop API
// Exports modules for use by the server binary and tests

pub mod config;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod middlewares;
pub mod models;
pub mod repositories;
pub mod services;
pub mod state;

use axum::{
    http::{header, HeaderValue},
    middleware,
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::Config;
use crate::handlers::{
    create_collection, delete_collection, export_statistics, get_activity, get_charts,
    get_collection, get_dashboard, get_profile, get_settings, get_statistics, list_collections,
    login, me, register, update_collection, update_me, update_settings,
};
use crate::middlewares::auth_middleware;
use crate::state::AppState;

fn cors_layer(config: &Config) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([header::CONTENT_DISPOSITION]);

    match config.cors_origin.as_deref().map(HeaderValue::from_str) {
        Some(Ok(origin)) => cors.allow_origin(origin),
        Some(Err(_)) => {
            tracing::warn!("CORS_ORIGIN is not a valid header value, cross-origin requests disabled");
            cors
        }
        None => cors.allow_origin(Any),
    }
}

/// Build the application router with the given state
pub fn build_router(state: AppState) -> Router {
    // Protected routes (require authentication)
    let protected_routes = Router::new()
        // Auth & account routes
        .route("/api/auth/me", get(me))
        .route("/api/users/me", put(update_me))
        .route("/api/users/me/profile", get(get_profile))
        .route(
            "/api/users/me/settings",
            get(get_settings).put(update_settings),
        )
        // Collection routes
        .route(
            "/api/collections",
            get(list_collections).post(create_collection),
        )
        .route(
            "/api/collections/{id}",
            get(get_collection)
                .put(update_collection)
                .delete(delete_collection),
        )
        // Dashboard routes
        .route("/api/dashboard", get(get_dashboard))
        .route("/api/activity", get(get_activity))
        // Statistics routes
        .route("/api/statistics", get(get_statistics))
        .route("/api/statistics/charts", get(get_charts))
        .route("/api/statistics/export", get(export_statistics))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let layers = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config));

    Router::new()
        .route("/", get(|| async { "NoteDrop API" }))
        // Public auth routes
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        // Protected routes
        .merge(protected_routes)
        .layer(layers)
        .with_state(state)
}
