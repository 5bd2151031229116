//! services/api/src/web/auth.rs
//!
//! Administrator account endpoints: existence check, one-time registration,
//! login, logout and the current session.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use gem_lab_core::domain::{AdminAccount, Registration};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{AppError, ErrorBody, MessageResponse};
use crate::web::session::AdminSession;
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Deserialize, ToSchema, Default)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// The administrator's public fields. Never includes the password hash.
#[derive(Serialize, ToSchema)]
pub struct AdminResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl From<AdminAccount> for AdminResponse {
    fn from(account: AdminAccount) -> Self {
        Self {
            id: account.id,
            name: account.name,
            email: account.email,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct ExistsResponse {
    pub exists: bool,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// Issues a session for `account` and renders it as a `Set-Cookie` value.
fn session_cookie(state: &AppState, account: &AdminAccount) -> Result<String, AppError> {
    let token = state.sessions.issue(account.id, &account.email).map_err(|e| {
        error!("Failed to issue session token: {:?}", e);
        AppError::Internal(e.to_string())
    })?;
    Ok(state.sessions.attach_cookie(&token))
}

/// GET /admin/account/exists - Whether the administrator has registered
#[utoipa::path(
    get,
    path = "/admin/account/exists",
    responses(
        (status = 200, description = "Registration state", body = ExistsResponse)
    )
)]
pub async fn exists_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ExistsResponse>, AppError> {
    let exists = state.gate.exists().await?;
    Ok(Json(ExistsResponse { exists }))
}

/// POST /admin/account/register - Create the one administrator account
#[utoipa::path(
    post,
    path = "/admin/account/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Admin created and signed in", body = AdminResponse),
        (status = 400, description = "Invalid input or admin already exists", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload?;
    let account = state
        .gate
        .register(Registration {
            name: req.name,
            email: req.email,
            password: req.password,
            confirm_password: req.confirm_password,
        })
        .await?;

    let cookie = session_cookie(&state, &account)?;
    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie)],
        Json(AdminResponse::from(account)),
    ))
}

/// POST /admin/account/login - Sign in as the administrator
#[utoipa::path(
    post,
    path = "/admin/account/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AdminResponse),
        (status = 400, description = "Email or password missing", body = ErrorBody),
        (status = 401, description = "Invalid credentials", body = ErrorBody)
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload?;
    let account = state.gate.login(&req.email, &req.password).await?;

    let cookie = session_cookie(&state, &account)?;
    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(AdminResponse::from(account)),
    ))
}

/// POST /admin/account/logout - Clear the session cookie
#[utoipa::path(
    post,
    path = "/admin/account/logout",
    responses(
        (status = 200, description = "Logout successful", body = MessageResponse)
    )
)]
pub async fn logout_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::SET_COOKIE, state.sessions.clear_cookie())],
        Json(MessageResponse::new("Logout successful")),
    )
}

/// GET /admin/account/me - The signed-in administrator
#[utoipa::path(
    get,
    path = "/admin/account/me",
    responses(
        (status = 200, description = "Current session", body = AdminSession),
        (status = 401, description = "Not signed in", body = ErrorBody)
    )
)]
pub async fn me_handler(Extension(admin): Extension<AdminSession>) -> Json<AdminSession> {
    Json(admin)
}
