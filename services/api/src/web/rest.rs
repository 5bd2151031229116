//! services/api/src/web/rest.rs
//!
//! The master definition for the OpenAPI specification of the REST API.

use crate::error::{ErrorBody, MessageResponse};
use crate::web::auth::{
    self, AdminResponse, ExistsResponse, LoginRequest, RegisterRequest,
};
use crate::web::certificates::{
    self, CertificateResponse, CreateCertificateRequest, IntakeCertificateRequest,
    UpdateCertificateRequest,
};
use crate::web::session::AdminSession;
use utoipa::OpenApi;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        certificates::lookup_certificate_handler,
        certificates::intake_certificate_handler,
        certificates::list_certificates_handler,
        certificates::create_certificate_handler,
        certificates::get_certificate_handler,
        certificates::update_certificate_handler,
        certificates::delete_certificate_handler,
        auth::exists_handler,
        auth::register_handler,
        auth::login_handler,
        auth::logout_handler,
        auth::me_handler,
    ),
    components(
        schemas(
            CertificateResponse,
            CreateCertificateRequest,
            IntakeCertificateRequest,
            UpdateCertificateRequest,
            RegisterRequest,
            LoginRequest,
            AdminResponse,
            ExistsResponse,
            AdminSession,
            ErrorBody,
            MessageResponse,
        )
    ),
    tags(
        (name = "Gem Certificate API", description = "Public certificate lookup and the admin back-office.")
    )
)]
pub struct ApiDoc;
