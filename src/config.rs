// Scan configuration: built-in defaults, optional JSON file, CLI overrides
use crate::error::ScanError;
use crate::exclusions::ExclusionPolicy;
use crate::models::Category;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Entries examined per directory before the listing is truncated
pub const DEFAULT_ITEM_CAP: usize = 1000;

/// Settings for one category walk, fixed for the duration of a scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    pub max_depth: usize,
    pub item_cap: usize,
    pub excluded: ExclusionPolicy,
}

impl ScanConfig {
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth,
            item_cap: DEFAULT_ITEM_CAP,
            excluded: ExclusionPolicy::new(),
        }
    }

    pub fn with_item_cap(mut self, item_cap: usize) -> Self {
        self.item_cap = item_cap;
        self
    }
}

/// Per-category depth overrides
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepthOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vpn: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote: Option<usize>,
}

impl DepthOverrides {
    pub fn get(&self, category: Category) -> Option<usize> {
        match category {
            Category::Vpn => self.vpn,
            Category::Chat => self.chat,
            Category::Remote => self.remote,
        }
    }

    pub fn set_all(&mut self, depth: usize) {
        self.vpn = Some(depth);
        self.chat = Some(depth);
        self.remote = Some(depth);
    }
}

/// User configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    pub max_depth: DepthOverrides,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_cap: Option<usize>,
    /// Profile whose AppData is treated as a priority root
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Scan these roots instead of the mounted volumes
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<PathBuf>,
}

impl AuditConfig {
    /// Load from the default location, or defaults if there is no file yet
    pub fn load() -> Result<Self, ScanError> {
        match Self::config_file_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ScanError> {
        let content = fs::read_to_string(path).map_err(|source| ScanError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&content)?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Save to the default location
    pub fn save(&self) -> Result<PathBuf, ScanError> {
        let path = Self::config_file_path().ok_or_else(|| ScanError::Config {
            path: PathBuf::from("appsweep/config.json"),
            source: std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "could not determine config directory",
            ),
        })?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ScanError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn config_file_path() -> Option<PathBuf> {
        dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
            .map(|dir| dir.join("appsweep").join("config.json"))
    }

    pub fn scan_config(&self, category: Category) -> ScanConfig {
        let depth = self
            .max_depth
            .get(category)
            .unwrap_or_else(|| category.default_max_depth());
        ScanConfig::new(depth).with_item_cap(self.item_cap.unwrap_or(DEFAULT_ITEM_CAP))
    }

    /// Configured user, else the account running the scan
    pub fn username(&self) -> String {
        self.username.clone().unwrap_or_else(current_username)
    }
}

fn current_username() -> String {
    std::env::var("USERNAME")
        .or_else(|_| std::env::var("USER"))
        .ok()
        .or_else(|| {
            dirs::home_dir()
                .and_then(|h| h.file_name().map(|n| n.to_string_lossy().into_owned()))
        })
        .unwrap_or_default()
}
