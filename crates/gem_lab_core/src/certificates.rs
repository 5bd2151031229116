//! crates/gem_lab_core/src/certificates.rs
//!
//! The certificate store: validation, number normalization and uniqueness rules
//! layered over a `CertificateRepository`.

use crate::domain::{
    normalize_certificate_number, normalize_optional, CertificateIntake, CertificatePatch,
    CertificateRecord, NewCertificate,
};
use crate::ports::{CertificateRepository, PortError, PortResult};
use chrono::{SubsecRound, Utc};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

const CREATE_REQUIRED: &str =
    "Certificate number, gem name, type, carat, color, and issue date are required";
const INTAKE_REQUIRED: &str = "All required fields must be provided";
const NUMBER_TAKEN: &str = "Certificate number already exists";

#[derive(Clone)]
pub struct CertificateStore {
    repo: Arc<dyn CertificateRepository>,
}

impl CertificateStore {
    pub fn new(repo: Arc<dyn CertificateRepository>) -> Self {
        Self { repo }
    }

    /// Creates a record from the admin contract.
    pub async fn create(&self, input: NewCertificate) -> PortResult<CertificateRecord> {
        let required = [
            &input.certificate_number,
            &input.gem_name,
            &input.gem_type,
            &input.carat,
            &input.color,
        ];
        if required.iter().any(|v| v.trim().is_empty()) {
            return Err(PortError::Validation(CREATE_REQUIRED.to_string()));
        }
        let issue_date = input
            .issue_date
            .ok_or_else(|| PortError::Validation(CREATE_REQUIRED.to_string()))?;

        let record = CertificateRecord {
            id: Uuid::new_v4(),
            certificate_number: normalize_certificate_number(&input.certificate_number),
            gem_name: input.gem_name,
            gem_type: input.gem_type,
            carat: input.carat,
            color: input.color,
            clarity: normalize_optional(input.clarity),
            shape: normalize_optional(input.shape),
            cut: normalize_optional(input.cut),
            origin: normalize_optional(input.origin),
            treatment: normalize_optional(input.treatment),
            remarks: normalize_optional(input.remarks),
            status: input.status.unwrap_or_default(),
            issue_date,
            // Storage keeps microseconds; trim so a re-read compares equal.
            created_at: Utc::now().trunc_subsecs(6),
        };
        self.insert(record).await
    }

    /// Creates a record from the public intake contract.
    pub async fn intake(&self, input: CertificateIntake) -> PortResult<CertificateRecord> {
        let required = [
            &input.certificate_number,
            &input.gem_name,
            &input.gem_type,
            &input.weight,
            &input.color,
            &input.clarity,
        ];
        if required.iter().any(|v| v.trim().is_empty()) {
            return Err(PortError::Validation(INTAKE_REQUIRED.to_string()));
        }

        self.create(NewCertificate {
            certificate_number: input.certificate_number,
            gem_name: input.gem_name,
            gem_type: input.gem_type,
            carat: input.weight,
            color: input.color,
            clarity: Some(input.clarity),
            issue_date: Some(input.issue_date.unwrap_or_else(|| Utc::now().date_naive())),
            ..NewCertificate::default()
        })
        .await
    }

    async fn insert(&self, record: CertificateRecord) -> PortResult<CertificateRecord> {
        if self
            .repo
            .get_certificate_by_number(&record.certificate_number)
            .await?
            .is_some()
        {
            return Err(PortError::Conflict(NUMBER_TAKEN.to_string()));
        }
        // The repository's own constraint catches a racing insert.
        self.repo.insert_certificate(&record).await?;
        info!(id = %record.id, number = %record.certificate_number, "certificate created");
        Ok(record)
    }

    pub async fn find_by_certificate_number(
        &self,
        number: &str,
    ) -> PortResult<Option<CertificateRecord>> {
        let number = normalize_certificate_number(number);
        if number.is_empty() {
            return Ok(None);
        }
        self.repo.get_certificate_by_number(&number).await
    }

    pub async fn find_by_id(&self, id: Uuid) -> PortResult<Option<CertificateRecord>> {
        self.repo.get_certificate_by_id(id).await
    }

    pub async fn list(&self) -> PortResult<Vec<CertificateRecord>> {
        self.repo.list_certificates().await
    }

    pub async fn update(&self, id: Uuid, patch: CertificatePatch) -> PortResult<CertificateRecord> {
        let mut record = self
            .repo
            .get_certificate_by_id(id)
            .await?
            .ok_or_else(|| PortError::NotFound("Certificate not found".to_string()))?;

        if let Some(number) = patch.certificate_number {
            let number = normalize_certificate_number(&number);
            if number.is_empty() {
                return Err(PortError::Validation(
                    "Certificate number cannot be empty".to_string(),
                ));
            }
            if number != record.certificate_number {
                if let Some(other) = self.repo.get_certificate_by_number(&number).await? {
                    if other.id != record.id {
                        return Err(PortError::Conflict(NUMBER_TAKEN.to_string()));
                    }
                }
                record.certificate_number = number;
            }
        }

        set_required(&mut record.gem_name, patch.gem_name, "Gem name")?;
        set_required(&mut record.gem_type, patch.gem_type, "Gem type")?;
        set_required(&mut record.carat, patch.carat, "Carat")?;
        set_required(&mut record.color, patch.color, "Color")?;

        set_optional(&mut record.clarity, patch.clarity);
        set_optional(&mut record.shape, patch.shape);
        set_optional(&mut record.cut, patch.cut);
        set_optional(&mut record.origin, patch.origin);
        set_optional(&mut record.treatment, patch.treatment);
        set_optional(&mut record.remarks, patch.remarks);

        if let Some(status) = patch.status {
            record.status = status;
        }
        if let Some(issue_date) = patch.issue_date {
            record.issue_date = issue_date;
        }

        self.repo.update_certificate(&record).await?;
        info!(id = %record.id, number = %record.certificate_number, "certificate updated");
        Ok(record)
    }

    pub async fn delete(&self, id: Uuid) -> PortResult<()> {
        self.repo.delete_certificate(id).await?;
        info!(id = %id, "certificate deleted");
        Ok(())
    }
}

fn set_required(field: &mut String, value: Option<String>, label: &str) -> PortResult<()> {
    match value {
        Some(v) if v.trim().is_empty() => {
            Err(PortError::Validation(format!("{label} cannot be empty")))
        }
        Some(v) => {
            *field = v;
            Ok(())
        }
        None => Ok(()),
    }
}

fn set_optional(field: &mut Option<String>, value: Option<Option<String>>) {
    if let Some(v) = value {
        *field = normalize_optional(v);
    }
}
