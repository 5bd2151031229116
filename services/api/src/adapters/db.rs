//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the repository ports from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use gem_lab_core::domain::{AdminAccount, AdminCredentials, CertificateRecord, CertificateStatus};
use gem_lab_core::ports::{AdminRepository, CertificateRepository, PortError, PortResult};
use sqlx::{FromRow, PgPool};
use tracing::warn;
use uuid::Uuid;

const UNIQUE_VIOLATION: &str = "23505";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the repository ports.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

/// Returns the violated constraint's name if `e` is a unique violation.
fn unique_violation(e: &sqlx::Error) -> Option<String> {
    let db_err = e.as_database_error()?;
    if db_err.code().as_deref() != Some(UNIQUE_VIOLATION) {
        return None;
    }
    Some(db_err.constraint().unwrap_or_default().to_string())
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

const CERTIFICATE_COLUMNS: &str = "id, certificate_number, gem_name, gem_type, carat, color, \
     clarity, shape, cut, origin, treatment, remarks, status, issue_date, created_at";

#[derive(FromRow)]
struct CertificateRow {
    id: Uuid,
    certificate_number: String,
    gem_name: String,
    gem_type: String,
    carat: String,
    color: String,
    clarity: Option<String>,
    shape: Option<String>,
    cut: Option<String>,
    origin: Option<String>,
    treatment: Option<String>,
    remarks: Option<String>,
    status: String,
    issue_date: NaiveDate,
    created_at: DateTime<Utc>,
}
impl CertificateRow {
    fn to_domain(self) -> PortResult<CertificateRecord> {
        let status = self
            .status
            .parse::<CertificateStatus>()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(CertificateRecord {
            id: self.id,
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
            status,
            issue_date: self.issue_date,
            created_at: self.created_at,
        })
    }
}

#[derive(FromRow)]
struct AdminRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}
impl AdminRow {
    fn to_domain(self) -> AdminCredentials {
        AdminCredentials {
            account: AdminAccount {
                id: self.id,
                name: self.name,
                email: self.email,
                created_at: self.created_at,
            },
            password_hash: self.password_hash,
        }
    }
}

//=========================================================================================
// `CertificateRepository` Trait Implementation
//=========================================================================================

#[async_trait]
impl CertificateRepository for DbAdapter {
    async fn insert_certificate(&self, record: &CertificateRecord) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO certificates (id, certificate_number, gem_name, gem_type, carat, color, \
             clarity, shape, cut, origin, treatment, remarks, status, issue_date, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)",
        )
        .bind(record.id)
        .bind(&record.certificate_number)
        .bind(&record.gem_name)
        .bind(&record.gem_type)
        .bind(&record.carat)
        .bind(&record.color)
        .bind(&record.clarity)
        .bind(&record.shape)
        .bind(&record.cut)
        .bind(&record.origin)
        .bind(&record.treatment)
        .bind(&record.remarks)
        .bind(record.status.as_str())
        .bind(record.issue_date)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match unique_violation(&e) {
            Some(_) => {
                warn!(number = %record.certificate_number, "certificate insert lost a uniqueness race");
                PortError::Conflict("Certificate number already exists".to_string())
            }
            None => unexpected(e),
        })?;
        Ok(())
    }

    async fn get_certificate_by_id(&self, id: Uuid) -> PortResult<Option<CertificateRecord>> {
        let sql = format!("SELECT {CERTIFICATE_COLUMNS} FROM certificates WHERE id = $1");
        sqlx::query_as::<_, CertificateRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(unexpected)?
            .map(CertificateRow::to_domain)
            .transpose()
    }

    async fn get_certificate_by_number(
        &self,
        number: &str,
    ) -> PortResult<Option<CertificateRecord>> {
        let sql =
            format!("SELECT {CERTIFICATE_COLUMNS} FROM certificates WHERE certificate_number = $1");
        sqlx::query_as::<_, CertificateRow>(&sql)
            .bind(number)
            .fetch_optional(&self.pool)
            .await
            .map_err(unexpected)?
            .map(CertificateRow::to_domain)
            .transpose()
    }

    async fn list_certificates(&self) -> PortResult<Vec<CertificateRecord>> {
        let sql = format!(
            "SELECT {CERTIFICATE_COLUMNS} FROM certificates ORDER BY created_at DESC, id DESC"
        );
        let rows = sqlx::query_as::<_, CertificateRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;

        rows.into_iter().map(CertificateRow::to_domain).collect()
    }

    async fn update_certificate(&self, record: &CertificateRecord) -> PortResult<()> {
        let result = sqlx::query(
            "UPDATE certificates SET certificate_number = $2, gem_name = $3, gem_type = $4, \
             carat = $5, color = $6, clarity = $7, shape = $8, cut = $9, origin = $10, \
             treatment = $11, remarks = $12, status = $13, issue_date = $14 WHERE id = $1",
        )
        .bind(record.id)
        .bind(&record.certificate_number)
        .bind(&record.gem_name)
        .bind(&record.gem_type)
        .bind(&record.carat)
        .bind(&record.color)
        .bind(&record.clarity)
        .bind(&record.shape)
        .bind(&record.cut)
        .bind(&record.origin)
        .bind(&record.treatment)
        .bind(&record.remarks)
        .bind(record.status.as_str())
        .bind(record.issue_date)
        .execute(&self.pool)
        .await
        .map_err(|e| match unique_violation(&e) {
            Some(_) => PortError::Conflict("Certificate number already exists".to_string()),
            None => unexpected(e),
        })?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound("Certificate not found".to_string()));
        }
        Ok(())
    }

    async fn delete_certificate(&self, id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM certificates WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound("Certificate not found".to_string()));
        }
        Ok(())
    }
}

//=========================================================================================
// `AdminRepository` Trait Implementation
//=========================================================================================

#[async_trait]
impl AdminRepository for DbAdapter {
    async fn admin_exists(&self) -> PortResult<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM admins)")
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)
    }

    async fn get_admin_by_email(&self, email: &str) -> PortResult<Option<AdminCredentials>> {
        let row = sqlx::query_as::<_, AdminRow>(
            "SELECT id, name, email, password_hash, created_at FROM admins WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(row.map(AdminRow::to_domain))
    }

    async fn create_admin(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> PortResult<AdminAccount> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM admins)")
            .fetch_one(&mut *tx)
            .await
            .map_err(unexpected)?;
        if exists {
            return Err(PortError::Conflict(
                "Admin already exists. Please login.".to_string(),
            ));
        }

        // A concurrent registration that passed the check above trips the
        // singleton constraint here instead of creating a second row.
        let row = sqlx::query_as::<_, AdminRow>(
            "INSERT INTO admins (id, name, email, password_hash) VALUES ($1, $2, $3, $4) \
             RETURNING id, name, email, password_hash, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match unique_violation(&e).as_deref() {
            Some("admins_email_key") => PortError::Conflict("Email already registered".to_string()),
            Some(_) => PortError::Conflict("Admin already exists. Please login.".to_string()),
            None => unexpected(e),
        })?;

        tx.commit().await.map_err(unexpected)?;
        Ok(row.to_domain().account)
    }
}
