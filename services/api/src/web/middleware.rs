//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::error::HttpError;
use crate::web::state::{AppState, CurrentUser};

/// Middleware that validates the bearer token and extracts the user id.
///
/// If valid, inserts a `CurrentUser` into request extensions for handlers to use.
/// If invalid or missing, returns 401 Unauthorized.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, HttpError> {
    // 1. Extract the token from the Authorization header
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| HttpError::Unauthorized("Missing bearer token".to_string()))?;

    // 2. Verify it and resolve the user id
    let user_id = state.accounts.authenticate(token)?;

    // 3. Insert the caller into request extensions
    req.extensions_mut().insert(CurrentUser(user_id));

    // 4. Continue to the handler
    Ok(next.run(req).await)
}
