//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting admin routes.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::warn;

use crate::error::AppError;
use crate::web::state::AppState;

/// Middleware that validates the `admin-token` cookie.
///
/// If valid, inserts the `AdminSession` into request extensions for handlers to use.
/// If invalid, expired or missing, returns 401 without saying which.
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(session) = state.sessions.current_admin(req.headers()) else {
        warn!(method = %req.method(), path = %req.uri().path(), "rejected unauthenticated admin request");
        return Err(AppError::unauthorized());
    };

    req.extensions_mut().insert(session);
    Ok(next.run(req).await)
}
