pub mod auth;
pub mod certificates;
pub mod middleware;
pub mod rest;
pub mod session;
pub mod state;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

pub use middleware::require_admin;
pub use state::AppState;

/// Builds the API router: public lookup, intake and account routes, plus the
/// admin routes behind `require_admin`.
pub fn router(state: Arc<AppState>) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/certificates", post(certificates::intake_certificate_handler))
        .route(
            "/certificates/{number}",
            get(certificates::lookup_certificate_handler),
        )
        .route("/admin/account/exists", get(auth::exists_handler))
        .route("/admin/account/register", post(auth::register_handler))
        .route("/admin/account/login", post(auth::login_handler))
        .route("/admin/account/logout", post(auth::logout_handler));

    // Protected routes (admin session required)
    let admin_routes = Router::new()
        .route(
            "/admin/certificates",
            get(certificates::list_certificates_handler)
                .post(certificates::create_certificate_handler),
        )
        .route(
            "/admin/certificates/{id}",
            get(certificates::get_certificate_handler)
                .put(certificates::update_certificate_handler)
                .delete(certificates::delete_certificate_handler),
        )
        .route("/admin/account/me", get(auth::me_handler))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_admin,
        ));

    Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .with_state(state)
}
