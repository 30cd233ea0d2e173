use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Software families the scanner looks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Vpn,
    Chat,
    Remote,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Vpn, Category::Chat, Category::Remote];

    pub fn name(&self) -> &'static str {
        match self {
            Category::Vpn => "vpn",
            Category::Chat => "chat",
            Category::Remote => "remote",
        }
    }

    /// Heading used by the text and table renderers
    pub fn title(&self) -> &'static str {
        match self {
            Category::Vpn => "VPN Applications",
            Category::Chat => "Chat Applications",
            Category::Remote => "Remote Control Applications",
        }
    }

    /// Label attached to records found by the tree walk
    pub fn record_kind(&self) -> RecordKind {
        match self {
            Category::Vpn => RecordKind::VpnApplication,
            Category::Chat => RecordKind::CommunicationApp,
            Category::Remote => RecordKind::RemoteControlSoftware,
        }
    }

    /// Default walk depth for the category's priority roots
    pub fn default_max_depth(&self) -> usize {
        match self {
            Category::Vpn => 3,
            Category::Chat => 4,
            Category::Remote => 3,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "vpn" => Some(Category::Vpn),
            "chat" | "communication" => Some(Category::Chat),
            "remote" | "remote-control" => Some(Category::Remote),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Category label carried by a final record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    #[serde(rename = "VPN Application")]
    VpnApplication,
    #[serde(rename = "Communication App")]
    CommunicationApp,
    #[serde(rename = "Remote Control Software")]
    RemoteControlSoftware,
    #[serde(rename = "VPN Network Adapter")]
    VpnNetworkAdapter,
}

impl RecordKind {
    pub fn label(&self) -> &'static str {
        match self {
            RecordKind::VpnApplication => "VPN Application",
            RecordKind::CommunicationApp => "Communication App",
            RecordKind::RemoteControlSoftware => "Remote Control Software",
            RecordKind::VpnNetworkAdapter => "VPN Network Adapter",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum InstallKind {
    Directory,
    Executable,
}

/// How the walker matched a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    DirectoryName,
    ExeName,
}

/// How a final record was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMethod {
    PatternMatch,
    DirectCheck,
    CommonPathCheck,
    DirectoryName,
    ExeName,
}

impl DetectionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectionMethod::PatternMatch => "pattern_match",
            DetectionMethod::DirectCheck => "direct_check",
            DetectionMethod::CommonPathCheck => "common_path_check",
            DetectionMethod::DirectoryName => "directory_name",
            DetectionMethod::ExeName => "exe_name",
        }
    }
}

impl From<MatchMethod> for DetectionMethod {
    fn from(method: MatchMethod) -> Self {
        match method {
            MatchMethod::DirectoryName => DetectionMethod::DirectoryName,
            MatchMethod::ExeName => DetectionMethod::ExeName,
        }
    }
}

/// Raw walker hit, before grouping and merging
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateDetection {
    pub app_name: String,
    pub path: PathBuf,
    pub install_kind: InstallKind,
    pub match_method: MatchMethod,
}

impl CandidateDetection {
    pub fn directory(app_name: &str, path: PathBuf) -> Self {
        Self {
            app_name: app_name.to_string(),
            path,
            install_kind: InstallKind::Directory,
            match_method: MatchMethod::DirectoryName,
        }
    }

    pub fn executable(app_name: &str, path: PathBuf) -> Self {
        Self {
            app_name: app_name.to_string(),
            path,
            install_kind: InstallKind::Executable,
            match_method: MatchMethod::ExeName,
        }
    }
}

/// One detected application, as handed to the output collaborators
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detection {
    pub name: String,
    pub path: PathBuf,
    pub category: RecordKind,
    pub detection_method: DetectionMethod,
}

impl Detection {
    pub fn from_candidate(candidate: CandidateDetection, kind: RecordKind) -> Self {
        Self {
            name: candidate.app_name,
            path: candidate.path,
            category: kind,
            detection_method: candidate.match_method.into(),
        }
    }
}

/// Detections for a single category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryFindings {
    pub category: Category,
    pub detections: Vec<Detection>,
}

/// Complete result of one scan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub volumes: Vec<PathBuf>,
    pub categories: Vec<CategoryFindings>,
    /// A Kaspersky Lab install directory exists on one of the volumes
    #[serde(default)]
    pub kaspersky: bool,
}

impl ScanReport {
    pub fn total(&self) -> usize {
        self.categories.iter().map(|f| f.detections.len()).sum()
    }

    pub fn duration_secs(&self) -> u64 {
        (self.finished_at - self.started_at).num_seconds().max(0) as u64
    }
}
