// Directory names the walker never descends into
use std::collections::HashSet;

/// System, cache, VCS, build and VM-tool folders
const DEFAULT_EXCLUDED: &[&str] = &[
    "windows",
    "system32",
    "syswow64",
    "winsxs",
    "drivers",
    "boot",
    "recovery",
    "documents and settings",
    "$recycle.bin",
    "system volume information",
    "config.msi",
    "msocache",
    "temp",
    "tmp",
    "cache",
    "logs",
    "log",
    "backup",
    "backups",
    "node_modules",
    ".git",
    ".svn",
    ".vs",
    ".vscode",
    "__pycache__",
    "virtualbox",
    "vmware",
    "docker",
    "hyper-v",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionPolicy {
    names: HashSet<String>,
}

impl Default for ExclusionPolicy {
    fn default() -> Self {
        Self::with_names(DEFAULT_EXCLUDED.iter().copied())
    }
}

impl ExclusionPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            names: names.into_iter().map(str::to_lowercase).collect(),
        }
    }

    /// Case-insensitive test of a single entry name
    pub fn is_excluded(&self, name: &str) -> bool {
        self.names.contains(&name.to_lowercase())
    }

    /// Entries hidden by convention (`.git`, `$Recycle.Bin`) are skipped too
    pub fn is_hidden(name: &str) -> bool {
        name.starts_with('.') || name.starts_with('$')
    }
}
