//! crates/gem_lab_core/src/accounts.rs
//!
//! The admin account gate. The registry has exactly one administrator: the
//! first successful registration creates it and every later attempt conflicts.

use crate::domain::{AdminAccount, Registration};
use crate::ports::{AdminRepository, CredentialHasher, PortError, PortResult};
use std::sync::Arc;
use tracing::{info, warn};

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Clone)]
pub struct AdminGate {
    repo: Arc<dyn AdminRepository>,
    hasher: Arc<dyn CredentialHasher>,
}

impl AdminGate {
    pub fn new(repo: Arc<dyn AdminRepository>, hasher: Arc<dyn CredentialHasher>) -> Self {
        Self { repo, hasher }
    }

    /// True once the administrator has registered.
    pub async fn exists(&self) -> PortResult<bool> {
        self.repo.admin_exists().await
    }

    pub async fn register(&self, input: Registration) -> PortResult<AdminAccount> {
        let fields = [
            &input.name,
            &input.email,
            &input.password,
            &input.confirm_password,
        ];
        if fields.iter().any(|v| v.trim().is_empty()) {
            return Err(PortError::Validation("All fields are required".to_string()));
        }
        if input.password != input.confirm_password {
            return Err(PortError::Validation("Passwords do not match".to_string()));
        }
        if input.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(PortError::Validation(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        // Order matters: the singleton check answers before the email check.
        if self.repo.admin_exists().await? {
            warn!(email = %input.email, "registration rejected: admin already exists");
            return Err(PortError::Conflict(
                "Admin already exists. Please login.".to_string(),
            ));
        }
        if self.repo.get_admin_by_email(&input.email).await?.is_some() {
            return Err(PortError::Conflict("Email already registered".to_string()));
        }

        let password_hash = self.hasher.hash(&input.password)?;
        let account = self
            .repo
            .create_admin(&input.name, &input.email, &password_hash)
            .await?;
        info!(admin_id = %account.id, email = %account.email, "admin registered");
        Ok(account)
    }

    /// Unknown email and wrong password fail identically.
    pub async fn login(&self, email: &str, password: &str) -> PortResult<AdminAccount> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(PortError::Validation(
                "Email and password are required".to_string(),
            ));
        }

        let Some(credentials) = self.repo.get_admin_by_email(email).await? else {
            let _ = self.hasher.verify(password, self.hasher.decoy_digest());
            warn!(email = %email, "login failed");
            return Err(PortError::Unauthorized);
        };
        if !self.hasher.verify(password, &credentials.password_hash) {
            warn!(email = %email, "login failed");
            return Err(PortError::Unauthorized);
        }

        info!(admin_id = %credentials.account.id, "admin logged in");
        Ok(credentials.account)
    }
}
