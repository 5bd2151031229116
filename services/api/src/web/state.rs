//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::adapters::Argon2Hasher;
use crate::config::Config;
use crate::web::session::SessionIssuer;
use gem_lab_core::ports::{AdminRepository, CertificateRepository};
use gem_lab_core::{AdminGate, CertificateStore};
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub certificates: CertificateStore,
    pub gate: AdminGate,
    pub sessions: SessionIssuer,
}

impl AppState {
    /// Wires the core services over one storage backend.
    pub fn new<D>(db: Arc<D>, config: &Config) -> Self
    where
        D: CertificateRepository + AdminRepository + 'static,
    {
        let certificates = CertificateStore::new(db.clone());
        let gate = AdminGate::new(db, Arc::new(Argon2Hasher::new()));
        let sessions = SessionIssuer::new(config.jwt_secret.as_bytes(), config.secure_cookies);

        Self {
            certificates,
            gate,
            sessions,
        }
    }
}
