use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::models::DEFAULT_CURRENCY;

/// Application-level constants
pub const APP_NAME: &str = "ClinicAnalytics";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable overriding the database location.
pub const DATABASE_PATH_ENV: &str = "CLINIC_ANALYTICS_DB";

/// Get the application data directory
/// ~/ClinicAnalytics/ on all platforms; falls back to the working directory
/// when no home directory can be determined.
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Database file: `$CLINIC_ANALYTICS_DB` when set, else `clinic.db` in the
/// data directory.
pub fn database_path() -> PathBuf {
    match std::env::var_os(DATABASE_PATH_ENV) {
        Some(path) if !path.is_empty() => PathBuf::from(path),
        _ => app_data_dir().join("clinic.db"),
    }
}

/// Default tracing filter when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "info,clinic_analytics=info"
}

/// Tunables for a seeding run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedConfig {
    /// Patient pool is topped up to this size before generating visits.
    pub min_patients: usize,
    /// Service pool is topped up to this size before generating visits.
    pub min_services: usize,
    /// Rows per multi-row INSERT.
    pub insert_chunk_size: usize,
    /// Amount charged when a visit's service has no price.
    pub fallback_price: f64,
    pub currency: String,
    /// Monthly targets for the goals created by a seeding run.
    pub visits_target: f64,
    pub revenue_target: f64,
    pub completion_rate_target: f64,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            min_patients: 50,
            min_services: 10,
            insert_chunk_size: 1000,
            fallback_price: 2000.0,
            currency: DEFAULT_CURRENCY.into(),
            visits_target: 200.0,
            revenue_target: 500_000.0,
            completion_rate_target: 85.0,
        }
    }
}
