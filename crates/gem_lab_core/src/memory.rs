//! crates/gem_lab_core/src/memory.rs
//!
//! An in-process implementation of the repository ports. Each operation holds
//! one lock for its whole check-and-write, which gives the same uniqueness
//! guarantees the database constraints give the PostgreSQL adapter.

use crate::domain::{AdminAccount, AdminCredentials, CertificateRecord};
use crate::ports::{AdminRepository, CertificateRepository, PortError, PortResult};
use async_trait::async_trait;
use chrono::{SubsecRound, Utc};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    // Insertion order; later entries are newer.
    certificates: Vec<CertificateRecord>,
    admin: Option<AdminCredentials>,
}

#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> PortResult<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| PortError::Unexpected("in-memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl CertificateRepository for InMemoryStore {
    async fn insert_certificate(&self, record: &CertificateRecord) -> PortResult<()> {
        let mut tables = self.lock()?;
        if tables
            .certificates
            .iter()
            .any(|c| c.certificate_number == record.certificate_number)
        {
            return Err(PortError::Conflict(
                "Certificate number already exists".to_string(),
            ));
        }
        tables.certificates.push(record.clone());
        Ok(())
    }

    async fn get_certificate_by_id(&self, id: Uuid) -> PortResult<Option<CertificateRecord>> {
        Ok(self.lock()?.certificates.iter().find(|c| c.id == id).cloned())
    }

    async fn get_certificate_by_number(
        &self,
        number: &str,
    ) -> PortResult<Option<CertificateRecord>> {
        Ok(self
            .lock()?
            .certificates
            .iter()
            .find(|c| c.certificate_number == number)
            .cloned())
    }

    async fn list_certificates(&self) -> PortResult<Vec<CertificateRecord>> {
        let mut records: Vec<CertificateRecord> =
            self.lock()?.certificates.iter().rev().cloned().collect();
        // Stable sort keeps later inserts first among equal timestamps.
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    async fn update_certificate(&self, record: &CertificateRecord) -> PortResult<()> {
        let mut tables = self.lock()?;
        if tables
            .certificates
            .iter()
            .any(|c| c.id != record.id && c.certificate_number == record.certificate_number)
        {
            return Err(PortError::Conflict(
                "Certificate number already exists".to_string(),
            ));
        }
        let slot = tables
            .certificates
            .iter_mut()
            .find(|c| c.id == record.id)
            .ok_or_else(|| PortError::NotFound("Certificate not found".to_string()))?;
        *slot = CertificateRecord {
            id: slot.id,
            created_at: slot.created_at,
            ..record.clone()
        };
        Ok(())
    }

    async fn delete_certificate(&self, id: Uuid) -> PortResult<()> {
        let mut tables = self.lock()?;
        let before = tables.certificates.len();
        tables.certificates.retain(|c| c.id != id);
        if tables.certificates.len() == before {
            return Err(PortError::NotFound("Certificate not found".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl AdminRepository for InMemoryStore {
    async fn admin_exists(&self) -> PortResult<bool> {
        Ok(self.lock()?.admin.is_some())
    }

    async fn get_admin_by_email(&self, email: &str) -> PortResult<Option<AdminCredentials>> {
        Ok(self
            .lock()?
            .admin
            .as_ref()
            .filter(|a| a.account.email == email)
            .cloned())
    }

    async fn create_admin(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> PortResult<AdminAccount> {
        let mut tables = self.lock()?;
        if tables.admin.is_some() {
            return Err(PortError::Conflict(
                "Admin already exists. Please login.".to_string(),
            ));
        }
        let account = AdminAccount {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            created_at: Utc::now().trunc_subsecs(6),
        };
        tables.admin = Some(AdminCredentials {
            account: account.clone(),
            password_hash: password_hash.to_string(),
        });
        Ok(account)
    }
}
