// Filesystem roots to scan
use crate::error::ScanError;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Source of the volume roots a scan covers
pub trait VolumeEnumerator {
    fn volumes(&self) -> Result<Vec<PathBuf>, ScanError>;
}

/// Mounted volumes of this machine: every existing drive letter on Windows,
/// the filesystem root elsewhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemVolumes;

impl VolumeEnumerator for SystemVolumes {
    fn volumes(&self) -> Result<Vec<PathBuf>, ScanError> {
        let found: Vec<PathBuf> = candidate_roots()
            .into_iter()
            .filter(|root| root.exists())
            .collect();

        if found.is_empty() {
            return Err(ScanError::NoVolumes);
        }
        debug!("Found {} volume(s)", found.len());
        Ok(found)
    }
}

#[cfg(windows)]
fn candidate_roots() -> Vec<PathBuf> {
    (b'A'..=b'Z')
        .map(|letter| PathBuf::from(format!("{}:\\", letter as char)))
        .collect()
}

#[cfg(not(windows))]
fn candidate_roots() -> Vec<PathBuf> {
    vec![PathBuf::from("/")]
}

/// Explicit list of roots, e.g. from `--root` or the config file.
/// Roots that do not exist are dropped with a warning.
#[derive(Debug, Clone, Default)]
pub struct FixedVolumes(pub Vec<PathBuf>);

impl VolumeEnumerator for FixedVolumes {
    fn volumes(&self) -> Result<Vec<PathBuf>, ScanError> {
        let mut found = Vec::new();
        for root in &self.0 {
            if root.is_dir() {
                found.push(root.clone());
            } else {
                warn!("Skipping volume {}: not a directory", root.display());
            }
        }

        if found.is_empty() {
            return Err(ScanError::NoVolumes);
        }
        Ok(found)
    }
}
