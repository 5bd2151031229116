//! services/api/src/bin/seed.rs
//!
//! Loads a handful of sample certificates through the public intake contract.
//! Numbers that already exist are skipped, so the seed can be re-run.

use api_lib::{adapters::DbAdapter, error::ApiError};
use chrono::NaiveDate;
use gem_lab_core::{CertificateIntake, CertificateStore};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::info;

const SAMPLES: &[(&str, &str, &str, &str, &str, &str, (i32, u32, u32))] = &[
    ("GEM-2024-001", "Royal Blue Sapphire", "Natural Sapphire", "3.52 carats", "Royal Blue", "VS2", (2024, 1, 15)),
    ("GEM-2024-002", "Pigeon's Blood Ruby", "Natural Ruby", "2.18 carats", "Pigeon's Blood Red", "VVS1", (2024, 2, 20)),
    ("GEM-2024-003", "Emerald Cut Diamond", "Natural Diamond", "1.75 carats", "G", "VVS2", (2024, 3, 10)),
    ("GEM-2024-004", "Colombian Emerald", "Natural Emerald", "4.25 carats", "Vivid Green", "SI1", (2024, 4, 5)),
    ("GEM-2024-005", "Padparadscha Sapphire", "Natural Sapphire", "2.85 carats", "Pink-Orange", "VS1", (2024, 5, 12)),
];

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().with_env_filter("info").init();

    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| ApiError::Internal("DATABASE_URL is required".to_string()))?;
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await?;
    let db = Arc::new(DbAdapter::new(pool));
    db.run_migrations().await?;
    let store = CertificateStore::new(db);

    info!("Seeding gem certifications...");
    for &(number, gem_name, gem_type, weight, color, clarity, (y, m, d)) in SAMPLES {
        if store.find_by_certificate_number(number).await?.is_some() {
            info!(number, "certificate already exists");
            continue;
        }
        store
            .intake(CertificateIntake {
                certificate_number: number.to_string(),
                gem_name: gem_name.to_string(),
                gem_type: gem_type.to_string(),
                weight: weight.to_string(),
                color: color.to_string(),
                clarity: clarity.to_string(),
                issue_date: NaiveDate::from_ymd_opt(y, m, d),
            })
            .await?;
        info!(number, "created certificate");
    }
    info!("Seeding completed");
    Ok(())
}
