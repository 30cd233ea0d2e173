// Scan-level error type
use std::path::PathBuf;
use thiserror::Error;

/// Failures surfaced to the caller. Anything below the volume level is
/// skipped and logged instead.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("No scannable volumes found")]
    NoVolumes,
    #[error("Failed to read config {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config file: {0}")]
    ConfigFormat(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Scan worker failed: {0}")]
    Worker(String),
}
