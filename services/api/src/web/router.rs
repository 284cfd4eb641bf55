//! services/api/src/web/router.rs
//!
//! Assembles the HTTP routes, their authentication boundary and the shared layers.

use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::warn;

use crate::web::{
    auth::{login_handler, me_handler, register_handler, theme_handler},
    middleware::require_auth,
    rest::{
        approve_summary_handler, create_summary_handler, delete_summary_handler,
        email_summary_handler, export_summary_handler, generate_summary_handler,
        get_summary_handler, list_email_logs_handler, list_summaries_handler,
        update_summary_handler,
    },
    state::AppState,
    upload::{upload_handler, MAX_UPLOAD_BYTES},
};

async fn health_handler() -> &'static str {
    "OK"
}

/// Builds the application router. Swagger UI is merged in by the binary.
pub fn build_router(state: Arc<AppState>) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/healthz", get(health_handler))
        .route("/api/auth/register", post(register_handler))
        .route("/api/auth/login", post(login_handler));

    // Protected routes (bearer token required)
    let protected_routes = Router::new()
        .route("/api/auth/me", get(me_handler))
        .route("/api/auth/theme", patch(theme_handler))
        .route("/api/upload", post(upload_handler))
        .route(
            "/api/summaries",
            get(list_summaries_handler).post(create_summary_handler),
        )
        .route(
            "/api/summaries/{id}",
            get(get_summary_handler)
                .patch(update_summary_handler)
                .delete(delete_summary_handler),
        )
        .route("/api/summaries/{id}/generate", post(generate_summary_handler))
        .route("/api/summaries/{id}/approve", post(approve_summary_handler))
        .route(
            "/api/summaries/{id}/export/{format}",
            get(export_summary_handler),
        )
        .route("/api/summaries/{id}/email", post(email_summary_handler))
        .route("/api/summaries/{id}/emails", get(list_email_logs_handler))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    let cors = cors_layer(&state.config.cors_origin);

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        // Multipart framing needs headroom above the file limit itself.
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + 1024 * 1024))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(origin: &str) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);
    match origin.parse::<HeaderValue>() {
        Ok(origin) => cors.allow_origin(origin),
        Err(e) => {
            warn!(error = %e, "ignoring invalid CORS origin");
            cors
        }
    }
}
