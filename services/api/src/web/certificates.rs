//! services/api/src/web/certificates.rs
//!
//! Certificate endpoints: the public lookup and intake routes, and the
//! guarded admin CRUD routes.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use gem_lab_core::domain::{
    CertificateIntake, CertificatePatch, CertificateRecord, CertificateStatus, NewCertificate,
};
use gem_lab_core::ports::PortError;
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{AppError, ErrorBody, MessageResponse};
use crate::web::session::AdminSession;
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

/// A certificate as returned to clients.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CertificateResponse {
    pub id: Uuid,
    pub certificate_number: String,
    pub gem_name: String,
    pub gem_type: String,
    pub carat: String,
    pub color: String,
    pub clarity: Option<String>,
    pub shape: Option<String>,
    pub cut: Option<String>,
    pub origin: Option<String>,
    pub treatment: Option<String>,
    pub remarks: Option<String>,
    #[schema(example = "Certified")]
    pub status: String,
    pub issue_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl From<CertificateRecord> for CertificateResponse {
    fn from(record: CertificateRecord) -> Self {
        Self {
            id: record.id,
            certificate_number: record.certificate_number,
            gem_name: record.gem_name,
            gem_type: record.gem_type,
            carat: record.carat,
            color: record.color,
            clarity: record.clarity,
            shape: record.shape,
            cut: record.cut,
            origin: record.origin,
            treatment: record.treatment,
            remarks: record.remarks,
            status: record.status.to_string(),
            issue_date: record.issue_date,
            created_at: record.created_at,
        }
    }
}

/// Body of `POST /admin/certificates`.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateCertificateRequest {
    pub certificate_number: Option<String>,
    pub gem_name: Option<String>,
    pub gem_type: Option<String>,
    pub carat: Option<String>,
    pub color: Option<String>,
    pub clarity: Option<String>,
    pub shape: Option<String>,
    pub cut: Option<String>,
    pub origin: Option<String>,
    pub treatment: Option<String>,
    pub remarks: Option<String>,
    #[schema(example = "Certified")]
    pub status: Option<String>,
    #[schema(example = "2024-06-01")]
    pub issue_date: Option<String>,
}

/// Body of `POST /certificates`, the public intake contract.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct IntakeCertificateRequest {
    pub certificate_number: Option<String>,
    pub gem_name: Option<String>,
    pub gem_type: Option<String>,
    #[schema(example = "3.52 carats")]
    pub weight: Option<String>,
    pub color: Option<String>,
    #[schema(example = "VS2")]
    pub clarity: Option<String>,
    #[schema(example = "2024-06-01")]
    pub issue_date: Option<String>,
}

/// Body of `PUT /admin/certificates/{id}`. Absent keys are left untouched;
/// `null` or `""` clears an optional field.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateCertificateRequest {
    pub certificate_number: Option<String>,
    pub gem_name: Option<String>,
    pub gem_type: Option<String>,
    pub carat: Option<String>,
    pub color: Option<String>,
    #[serde(deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub clarity: Option<Option<String>>,
    #[serde(deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub shape: Option<Option<String>>,
    #[serde(deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub cut: Option<Option<String>>,
    #[serde(deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub origin: Option<Option<String>>,
    #[serde(deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub treatment: Option<Option<String>>,
    #[serde(deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub remarks: Option<Option<String>>,
    pub status: Option<String>,
    pub issue_date: Option<String>,
}

/// Marks a key that appeared in the body, even with a `null` value.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

//=========================================================================================
// Input Conversion
//=========================================================================================

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp (date taken in UTC).
fn parse_issue_date(raw: &str) -> Result<NaiveDate, AppError> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| {
            DateTime::parse_from_rfc3339(raw).map(|dt| dt.with_timezone(&Utc).date_naive())
        })
        .map_err(|_| AppError::Validation("Invalid issue date".to_string()))
}

fn parse_optional_date(raw: Option<String>) -> Result<Option<NaiveDate>, AppError> {
    raw.filter(|d| !d.trim().is_empty())
        .map(|d| parse_issue_date(&d))
        .transpose()
}

fn parse_status(raw: Option<String>) -> Result<Option<CertificateStatus>, AppError> {
    raw.filter(|s| !s.trim().is_empty())
        .map(|s| {
            s.trim().parse::<CertificateStatus>().map_err(|_| {
                AppError::Validation("Status must be 'Certified' or 'Not Certified'".to_string())
            })
        })
        .transpose()
}

/// Unknown and malformed ids look the same to the caller.
fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound("Certificate not found".to_string()))
}

impl CreateCertificateRequest {
    fn into_domain(self) -> Result<NewCertificate, AppError> {
        Ok(NewCertificate {
            certificate_number: self.certificate_number.unwrap_or_default(),
            gem_name: self.gem_name.unwrap_or_default(),
            gem_type: self.gem_type.unwrap_or_default(),
            carat: self.carat.unwrap_or_default(),
            color: self.color.unwrap_or_default(),
            clarity: self.clarity,
            shape: self.shape,
            cut: self.cut,
            origin: self.origin,
            treatment: self.treatment,
            remarks: self.remarks,
            status: parse_status(self.status)?,
            issue_date: parse_optional_date(self.issue_date)?,
        })
    }
}

impl IntakeCertificateRequest {
    fn into_domain(self) -> Result<CertificateIntake, AppError> {
        Ok(CertificateIntake {
            certificate_number: self.certificate_number.unwrap_or_default(),
            gem_name: self.gem_name.unwrap_or_default(),
            gem_type: self.gem_type.unwrap_or_default(),
            weight: self.weight.unwrap_or_default(),
            color: self.color.unwrap_or_default(),
            clarity: self.clarity.unwrap_or_default(),
            issue_date: parse_optional_date(self.issue_date)?,
        })
    }
}

impl UpdateCertificateRequest {
    fn into_domain(self) -> Result<CertificatePatch, AppError> {
        Ok(CertificatePatch {
            certificate_number: self.certificate_number,
            gem_name: self.gem_name,
            gem_type: self.gem_type,
            carat: self.carat,
            color: self.color,
            clarity: self.clarity,
            shape: self.shape,
            cut: self.cut,
            origin: self.origin,
            treatment: self.treatment,
            remarks: self.remarks,
            status: parse_status(self.status)?,
            issue_date: self.issue_date.map(|d| parse_issue_date(&d)).transpose()?,
        })
    }
}

//=========================================================================================
// Public Handlers
//=========================================================================================

/// GET /certificates/{number} - Look a certificate up by its number
#[utoipa::path(
    get,
    path = "/certificates/{number}",
    params(("number" = String, Path, description = "Certificate number, any case")),
    responses(
        (status = 200, description = "Certificate found", body = CertificateResponse),
        (status = 404, description = "No such certificate", body = ErrorBody)
    )
)]
pub async fn lookup_certificate_handler(
    State(state): State<Arc<AppState>>,
    Path(number): Path<String>,
) -> Result<Json<CertificateResponse>, AppError> {
    let record = state
        .certificates
        .find_by_certificate_number(&number)
        .await?
        .ok_or_else(|| AppError::NotFound("Certificate not found".to_string()))?;
    Ok(Json(record.into()))
}

/// POST /certificates - Public certificate intake
#[utoipa::path(
    post,
    path = "/certificates",
    request_body = IntakeCertificateRequest,
    responses(
        (status = 201, description = "Certificate created", body = CertificateResponse),
        (status = 400, description = "Missing required fields", body = ErrorBody),
        (status = 409, description = "Certificate number already exists", body = ErrorBody)
    )
)]
pub async fn intake_certificate_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<IntakeCertificateRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload?;
    let record = state
        .certificates
        .intake(req.into_domain()?)
        .await
        .map_err(|e| match e {
            PortError::Conflict(_) => {
                AppError::AlreadyExists("Certificate with this number already exists".to_string())
            }
            other => other.into(),
        })?;
    Ok((StatusCode::CREATED, Json(CertificateResponse::from(record))))
}

//=========================================================================================
// Admin Handlers
//=========================================================================================

/// GET /admin/certificates - List every certificate, newest first
#[utoipa::path(
    get,
    path = "/admin/certificates",
    responses(
        (status = 200, description = "All certificates", body = [CertificateResponse]),
        (status = 401, description = "Not signed in", body = ErrorBody)
    )
)]
pub async fn list_certificates_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CertificateResponse>>, AppError> {
    let records = state.certificates.list().await?;
    Ok(Json(records.into_iter().map(Into::into).collect()))
}

/// POST /admin/certificates - Create a certificate
#[utoipa::path(
    post,
    path = "/admin/certificates",
    request_body = CreateCertificateRequest,
    responses(
        (status = 201, description = "Certificate created", body = CertificateResponse),
        (status = 400, description = "Missing fields or duplicate number", body = ErrorBody),
        (status = 401, description = "Not signed in", body = ErrorBody)
    )
)]
pub async fn create_certificate_handler(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AdminSession>,
    payload: Result<Json<CreateCertificateRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload?;
    let record = state.certificates.create(req.into_domain()?).await?;
    info!(admin_id = %admin.admin_id, id = %record.id, "admin created certificate");
    Ok((StatusCode::CREATED, Json(CertificateResponse::from(record))))
}

/// GET /admin/certificates/{id} - Fetch one certificate
#[utoipa::path(
    get,
    path = "/admin/certificates/{id}",
    params(("id" = Uuid, Path, description = "Certificate id")),
    responses(
        (status = 200, description = "Certificate found", body = CertificateResponse),
        (status = 401, description = "Not signed in", body = ErrorBody),
        (status = 404, description = "No such certificate", body = ErrorBody)
    )
)]
pub async fn get_certificate_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<CertificateResponse>, AppError> {
    let record = state
        .certificates
        .find_by_id(parse_id(&id)?)
        .await?
        .ok_or_else(|| AppError::NotFound("Certificate not found".to_string()))?;
    Ok(Json(record.into()))
}

/// PUT /admin/certificates/{id} - Partially update a certificate
#[utoipa::path(
    put,
    path = "/admin/certificates/{id}",
    params(("id" = Uuid, Path, description = "Certificate id")),
    request_body = UpdateCertificateRequest,
    responses(
        (status = 200, description = "Certificate updated", body = CertificateResponse),
        (status = 400, description = "Invalid field or duplicate number", body = ErrorBody),
        (status = 401, description = "Not signed in", body = ErrorBody),
        (status = 404, description = "No such certificate", body = ErrorBody)
    )
)]
pub async fn update_certificate_handler(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AdminSession>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateCertificateRequest>, JsonRejection>,
) -> Result<Json<CertificateResponse>, AppError> {
    let id = parse_id(&id)?;
    let Json(req) = payload?;
    let record = state.certificates.update(id, req.into_domain()?).await?;
    info!(admin_id = %admin.admin_id, id = %record.id, "admin updated certificate");
    Ok(Json(record.into()))
}

/// DELETE /admin/certificates/{id} - Permanently delete a certificate
#[utoipa::path(
    delete,
    path = "/admin/certificates/{id}",
    params(("id" = Uuid, Path, description = "Certificate id")),
    responses(
        (status = 200, description = "Certificate deleted", body = MessageResponse),
        (status = 401, description = "Not signed in", body = ErrorBody),
        (status = 404, description = "No such certificate", body = ErrorBody)
    )
)]
pub async fn delete_certificate_handler(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AdminSession>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = parse_id(&id)?;
    state.certificates.delete(id).await?;
    info!(admin_id = %admin.admin_id, id = %id, "admin deleted certificate");
    Ok(Json(MessageResponse::new("Certificate deleted successfully")))
}
