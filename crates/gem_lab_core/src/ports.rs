//! crates/gem_lab_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the registry's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific implementations like databases or hash functions.

use crate::domain::{AdminAccount, AdminCredentials, CertificateRecord};
use async_trait::async_trait;
use uuid::Uuid;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Validation(String),
    #[error("Invalid email or password")]
    Unauthorized,
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Persistence for certificate records.
///
/// Implementations must enforce certificate number uniqueness themselves and
/// report a collision as `PortError::Conflict`.
#[async_trait]
pub trait CertificateRepository: Send + Sync {
    async fn insert_certificate(&self, record: &CertificateRecord) -> PortResult<()>;

    async fn get_certificate_by_id(&self, id: Uuid) -> PortResult<Option<CertificateRecord>>;

    /// `number` is already normalized by the caller.
    async fn get_certificate_by_number(
        &self,
        number: &str,
    ) -> PortResult<Option<CertificateRecord>>;

    /// All records, newest `created_at` first.
    async fn list_certificates(&self) -> PortResult<Vec<CertificateRecord>>;

    /// Overwrites every mutable column of the row with `record.id`.
    /// Returns `PortError::NotFound` if the row is gone.
    async fn update_certificate(&self, record: &CertificateRecord) -> PortResult<()>;

    /// Returns `PortError::NotFound` if no row was removed.
    async fn delete_certificate(&self, id: Uuid) -> PortResult<()>;
}

/// Persistence for the single administrator account.
#[async_trait]
pub trait AdminRepository: Send + Sync {
    async fn admin_exists(&self) -> PortResult<bool>;

    async fn get_admin_by_email(&self, email: &str) -> PortResult<Option<AdminCredentials>>;

    /// Inserts the administrator. Must fail with `PortError::Conflict` when any
    /// administrator already exists or the email is taken, atomically with the
    /// insert.
    async fn create_admin(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> PortResult<AdminAccount>;
}

/// One-way password hashing with an embedded per-hash salt.
pub trait CredentialHasher: Send + Sync {
    fn hash(&self, plaintext: &str) -> PortResult<String>;

    /// A malformed digest verifies as `false`.
    fn verify(&self, plaintext: &str, digest: &str) -> bool;

    /// A well-formed digest that no password matches, with the same cost
    /// parameters as `hash` output. Verified against for unknown accounts.
    fn decoy_digest(&self) -> &str;
}
