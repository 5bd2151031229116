pub mod accounts;
pub mod certificates;
pub mod domain;
pub mod memory;
pub mod ports;

pub use accounts::AdminGate;
pub use certificates::CertificateStore;
pub use domain::{
    AdminAccount, AdminCredentials, CertificateIntake, CertificatePatch, CertificateRecord,
    CertificateStatus, NewCertificate, Registration,
};
pub use memory::InMemoryStore;
pub use ports::{AdminRepository, CertificateRepository, CredentialHasher, PortError, PortResult};
