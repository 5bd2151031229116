//! crates/gem_lab_core/src/domain.rs
//!
//! Defines the pure, core data structures for the certificate registry.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, NaiveDate, Utc};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

//=========================================================================================
// Certificates
//=========================================================================================

/// Whether the laboratory vouches for the stone described by a certificate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CertificateStatus {
    #[default]
    Certified,
    NotCertified,
}

impl CertificateStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CertificateStatus::Certified => "Certified",
            CertificateStatus::NotCertified => "Not Certified",
        }
    }
}

impl fmt::Display for CertificateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown certificate status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for CertificateStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Certified" => Ok(CertificateStatus::Certified),
            "Not Certified" => Ok(CertificateStatus::NotCertified),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// A stored certificate. `id` and `created_at` never change after insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateRecord {
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
    pub status: CertificateStatus,
    pub issue_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Fields accepted when an administrator creates a certificate.
///
/// Required text fields arrive as plain strings and are checked for blanks by
/// the store, so a missing JSON key and an empty one are rejected alike.
#[derive(Debug, Clone, Default)]
pub struct NewCertificate {
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
    pub status: Option<CertificateStatus>,
    pub issue_date: Option<NaiveDate>,
}

/// Fields accepted by the unauthenticated intake route.
///
/// This contract names the weight `weight` and requires `clarity`, unlike the
/// admin contract. `weight` lands in the record's `carat` column.
#[derive(Debug, Clone, Default)]
pub struct CertificateIntake {
    pub certificate_number: String,
    pub gem_name: String,
    pub gem_type: String,
    pub weight: String,
    pub color: String,
    pub clarity: String,
    pub issue_date: Option<NaiveDate>,
}

/// A partial update. `None` leaves a field untouched.
///
/// Optional columns use a nested `Option`: `Some(None)` clears the value.
#[derive(Debug, Clone, Default)]
pub struct CertificatePatch {
    pub certificate_number: Option<String>,
    pub gem_name: Option<String>,
    pub gem_type: Option<String>,
    pub carat: Option<String>,
    pub color: Option<String>,
    pub clarity: Option<Option<String>>,
    pub shape: Option<Option<String>>,
    pub cut: Option<Option<String>>,
    pub origin: Option<Option<String>>,
    pub treatment: Option<Option<String>>,
    pub remarks: Option<Option<String>>,
    pub status: Option<CertificateStatus>,
    pub issue_date: Option<NaiveDate>,
}

/// Canonical form of a certificate number: trimmed and uppercased.
pub fn normalize_certificate_number(number: &str) -> String {
    number.trim().to_uppercase()
}

/// Blank optional text is stored as absent.
pub fn normalize_optional(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

//=========================================================================================
// Administrator
//=========================================================================================

/// The public view of the administrator. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminAccount {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

// Only used internally for login - contains sensitive data
#[derive(Debug, Clone)]
pub struct AdminCredentials {
    pub account: AdminAccount,
    pub password_hash: String,
}

/// Input to the one-time administrator registration.
#[derive(Debug, Clone, Default)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}
