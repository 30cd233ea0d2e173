use crate::config::AuditConfig;
use crate::error::ScanError;
use crate::known_paths::{kaspersky_install, known_detections};
use crate::matcher::NameMatcher;
use crate::models::*;
use crate::normalize::canonicalize;
use crate::patterns::PatternTable;
use crate::ranking::better;
use crate::validator::path_key;
use crate::volumes::VolumeEnumerator;
use crate::walker::DirectoryWalker;
use chrono::Utc;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Depth of the shallow sweep over each volume root
const VOLUME_ROOT_DEPTH: usize = 2;

/// Drives the walker over every volume and merges the raw candidates into
/// one record per application and category.
pub struct DetectionAggregator<V: VolumeEnumerator> {
    volumes: V,
    config: AuditConfig,
}

impl<V: VolumeEnumerator> DetectionAggregator<V> {
    pub fn new(volumes: V, config: AuditConfig) -> Self {
        Self { volumes, config }
    }

    /// Scan each category in turn. `on_category` is called as each one
    /// finishes with the number of records it produced.
    pub fn scan_all(
        &self,
        categories: &[Category],
        mut on_category: impl FnMut(Category, usize),
    ) -> Result<ScanReport, ScanError> {
        let started_at = Utc::now();
        let volumes = self.volumes.volumes()?;
        info!("Scanning {} volume(s)", volumes.len());

        let kaspersky = volumes.iter().find_map(|volume| kaspersky_install(volume));
        match &kaspersky {
            Some(path) => info!("Kaspersky installed at {}", path.display()),
            None => debug!("No Kaspersky install directory"),
        }

        let mut findings = Vec::with_capacity(categories.len());
        for &category in categories {
            let detections = self.scan_volumes(category, &volumes);
            on_category(category, detections.len());
            findings.push(CategoryFindings {
                category,
                detections,
            });
        }

        Ok(ScanReport {
            started_at,
            finished_at: Utc::now(),
            volumes,
            categories: findings,
            kaspersky: kaspersky.is_some(),
        })
    }

    pub fn scan_volumes(&self, category: Category, volumes: &[PathBuf]) -> Vec<Detection> {
        let table = PatternTable::for_category(category);
        let matcher = NameMatcher::for_table(table);
        let config = self.config.scan_config(category);
        let username = self.config.username();

        info!("Scanning {} applications (depth {})", category, config.max_depth);

        let known: Vec<Detection> = volumes
            .iter()
            .flat_map(|volume| known_detections(category, volume, &username))
            .collect();
        debug!("{} known location(s) present", known.len());

        let mut candidates = Vec::new();
        for volume in volumes {
            let walker = DirectoryWalker::new(table, &matcher, &config).anchored_to(volume);
            for root in priority_roots(volume, &username) {
                if root.is_dir() {
                    candidates.extend(walker.walk(&root));
                }
            }

            let users = volume.join("Users");
            if users.is_dir() {
                candidates.extend(walker.walk_to_depth(&users, config.max_depth + 1));
            }

            candidates.extend(walker.walk_to_depth(volume, VOLUME_ROOT_DEPTH));
        }
        debug!("{} raw {} candidate(s)", candidates.len(), category);

        let detections = merge(known, candidates, table, category.record_kind());
        info!("Found {} {} application(s)", detections.len(), category);
        detections
    }
}

/// Install roots walked at full depth, most specific last
fn priority_roots(volume: &Path, username: &str) -> Vec<PathBuf> {
    let mut roots = vec![
        volume.join("Program Files"),
        volume.join("Program Files (x86)"),
        volume.join("ProgramData"),
    ];
    if !username.is_empty() {
        let app_data = volume.join("Users").join(username).join("AppData");
        roots.push(app_data.join("Local"));
        roots.push(app_data.join("Local").join("Programs"));
        roots.push(app_data.join("Roaming"));
    }
    roots
}

/// One candidate per app name, in table order: directories over
/// executables, then the shortest path.
fn representatives(candidates: Vec<CandidateDetection>, table: &PatternTable) -> Vec<CandidateDetection> {
    let mut groups: BTreeMap<(usize, String), Vec<CandidateDetection>> = BTreeMap::new();
    for candidate in candidates {
        let order = table.position(&candidate.app_name).unwrap_or(usize::MAX);
        groups
            .entry((order, candidate.app_name.clone()))
            .or_default()
            .push(candidate);
    }

    groups
        .into_values()
        .filter_map(|group| {
            group.into_iter().min_by(|a, b| {
                a.install_kind
                    .cmp(&b.install_kind)
                    .then_with(|| path_len(&a.path).cmp(&path_len(&b.path)))
                    .then_with(|| a.path.cmp(&b.path))
            })
        })
        .collect()
}

fn path_len(path: &Path) -> usize {
    path.to_string_lossy().chars().count()
}

/// Known-location records first, then one representative per walked app.
pub fn merge(
    known: Vec<Detection>,
    candidates: Vec<CandidateDetection>,
    table: &PatternTable,
    kind: RecordKind,
) -> Vec<Detection> {
    let mut set = DetectionSet::default();
    for detection in known {
        set.insert(detection);
    }
    for candidate in representatives(candidates, table) {
        set.insert(Detection::from_candidate(candidate, kind));
    }
    set.into_vec()
}

/// Final records of one category, unique by canonical name
#[derive(Debug, Default)]
pub struct DetectionSet {
    records: Vec<Detection>,
}

impl DetectionSet {
    /// Add a record unless it duplicates an existing path or application.
    /// A duplicate application replaces the existing record only when its
    /// path ranks better. Returns whether the set changed.
    pub fn insert(&mut self, detection: Detection) -> bool {
        let key = canonicalize(&detection.name);
        let path = path_key(&detection.path);

        for existing in self.records.iter_mut() {
            if path_key(&existing.path) == path {
                debug!("Duplicate path {}", detection.path.display());
                return false;
            }
            if canonicalize(&existing.name) == key {
                if better(&detection.path, &existing.path) {
                    debug!(
                        "Replacing {} with {}",
                        existing.path.display(),
                        detection.path.display()
                    );
                    *existing = detection;
                    return true;
                }
                return false;
            }
        }

        self.records.push(detection);
        true
    }

    pub fn into_vec(self) -> Vec<Detection> {
        self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::CHAT_PATTERNS;
    use crate::volumes::FixedVolumes;
    use std::collections::HashSet;
    use std::fs;
    use tempfile::TempDir;

    fn aggregator(root: &Path) -> DetectionAggregator<FixedVolumes> {
        let config = AuditConfig {
            username: Some("t".to_string()),
            ..Default::default()
        };
        DetectionAggregator::new(FixedVolumes(vec![root.to_path_buf()]), config)
    }

    fn scan(agg: &DetectionAggregator<FixedVolumes>, category: Category) -> Result<Vec<Detection>, ScanError> {
        let volumes = agg.volumes.volumes()?;
        Ok(agg.scan_volumes(category, &volumes))
    }

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }

    fn as_set(detections: &[Detection]) -> HashSet<(String, PathBuf)> {
        detections
            .iter()
            .map(|d| (d.name.clone(), d.path.clone()))
            .collect()
    }

    fn dir(name: &str, path: &str) -> CandidateDetection {
        CandidateDetection::directory(name, PathBuf::from(path))
    }

    #[test]
    fn test_discord_variants_collapse_and_office_skype_rejected() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "Program Files/Discord/Discord.exe");
        touch(tmp.path(), "Users/t/AppData/Local/DiscordCanary/DiscordCanary.exe");
        fs::create_dir_all(
            tmp.path()
                .join("Program Files/Microsoft Office/root/Office16/SkypeSrv"),
        )
        .unwrap();

        let found = scan(&aggregator(tmp.path()), Category::Chat).unwrap();

        let discord: Vec<_> = found
            .iter()
            .filter(|d| canonicalize(&d.name) == "discord")
            .collect();
        assert_eq!(discord.len(), 1);
        assert_eq!(discord[0].name, "Discord");
        assert_eq!(discord[0].path, tmp.path().join("Program Files").join("Discord"));
        assert_eq!(discord[0].category, RecordKind::CommunicationApp);
        assert_eq!(discord[0].detection_method, DetectionMethod::DirectoryName);

        assert!(found.iter().all(|d| !d.name.contains("Skype")));
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_scan_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "Program Files/Slack/slack.exe");
        touch(tmp.path(), "Users/t/AppData/Roaming/Zoom/Zoom.exe");
        fs::create_dir_all(tmp.path().join("Program Files (x86)/Zalo")).unwrap();
        fs::create_dir_all(tmp.path().join("Users/t/AppData/Local/ZaloPC")).unwrap();

        let agg = aggregator(tmp.path());
        let first = scan(&agg, Category::Chat).unwrap();
        let second = scan(&agg, Category::Chat).unwrap();
        assert_eq!(as_set(&first), as_set(&second));

        // ZaloPC and Zalo are one application
        let zalo: Vec<_> = first.iter().filter(|d| canonicalize(&d.name) == "zalo").collect();
        assert_eq!(zalo.len(), 1);
        assert_eq!(zalo[0].path, tmp.path().join("Program Files (x86)").join("Zalo"));
    }

    #[test]
    fn test_unique_canonical_names() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "Program Files/Discord/Discord.exe");
        fs::create_dir_all(tmp.path().join("Users/t/AppData/Local/DiscordPTB")).unwrap();
        fs::create_dir_all(tmp.path().join("Users/t/AppData/Local/Microsoft/Teams")).unwrap();
        fs::create_dir_all(tmp.path().join("Program Files/Microsoft/Teams")).unwrap();

        let found = scan(&aggregator(tmp.path()), Category::Chat).unwrap();
        let keys: Vec<String> = found.iter().map(|d| canonicalize(&d.name)).collect();
        let unique: HashSet<&String> = keys.iter().collect();
        assert_eq!(keys.len(), unique.len());
        assert!(keys.contains(&"discord".to_string()));
        assert!(keys.contains(&"teams".to_string()));
    }

    #[test]
    fn test_merge_independent_of_discovery_order() {
        let candidates = vec![
            dir("Discord", "C:\\Users\\t\\AppData\\Local\\DiscordCanary"),
            dir("Discord", "D:\\Program Files\\Discord"),
            CandidateDetection::executable("Discord", PathBuf::from("C:\\Discord.exe")),
            dir("Zalo", "C:\\Users\\t\\AppData\\Local\\ZaloPC"),
            dir("Zalo", "E:\\Programs\\Zalo"),
            dir("Zoom", "C:\\Users\\t\\AppData\\Roaming\\Zoom"),
            dir("Zoom", "D:\\Users\\t\\AppData\\Roaming\\Zoom"),
            dir("Slack", "D:\\Apps\\Slack"),
        ];
        let expected = as_set(&merge(
            Vec::new(),
            candidates.clone(),
            &CHAT_PATTERNS,
            RecordKind::CommunicationApp,
        ));
        assert_eq!(expected.len(), 4);

        let n = candidates.len();
        for shift in 0..n {
            for reverse in [false, true] {
                let mut permuted = candidates.clone();
                permuted.rotate_left(shift);
                if reverse {
                    permuted.reverse();
                }
                let merged = merge(Vec::new(), permuted, &CHAT_PATTERNS, RecordKind::CommunicationApp);
                assert_eq!(as_set(&merged), expected);
            }
        }
    }

    #[test]
    fn test_representative_prefers_directory_then_shortest() {
        let candidates = vec![
            CandidateDetection::executable("Slack", PathBuf::from("C:\\s.exe")),
            dir("Slack", "C:\\Program Files\\Slack"),
            dir("Slack", "C:\\Slack"),
        ];
        let reps = representatives(candidates, &CHAT_PATTERNS);
        assert_eq!(reps.len(), 1);
        assert_eq!(reps[0].path, PathBuf::from("C:\\Slack"));
    }

    #[test]
    fn test_detection_set_rules() {
        let record = |name: &str, path: &str| Detection {
            name: name.to_string(),
            path: PathBuf::from(path),
            category: RecordKind::CommunicationApp,
            detection_method: DetectionMethod::CommonPathCheck,
        };

        let mut set = DetectionSet::default();
        assert!(set.insert(record("Zoom", "C:\\Users\\u\\AppData\\Roaming\\Zoom")));
        // same path, different case
        assert!(!set.insert(record("Zoom", "c:\\users\\u\\appdata\\roaming\\zoom")));
        // better path replaces
        assert!(set.insert(record("Zoom", "C:\\Program Files\\Zoom")));
        // worse path is dropped
        assert!(!set.insert(record("Zoom", "D:\\Portable\\Apps\\Chat\\Zoom")));
        assert!(set.insert(record("Viber", "C:\\Viber")));

        let records = set.into_vec();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].path, PathBuf::from("C:\\Program Files\\Zoom"));
    }

    #[test]
    fn test_tap_adapter_reported_once() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("Program Files/TAP-Windows")).unwrap();

        let found = scan(&aggregator(tmp.path()), Category::Vpn).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "TAP-Windows (OpenVPN)");
        assert_eq!(found[0].category, RecordKind::VpnNetworkAdapter);
    }

    #[test]
    fn test_scan_all_reports_each_category() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("Program Files/AnyDesk")).unwrap();

        let mut seen = Vec::new();
        let report = aggregator(tmp.path())
            .scan_all(&Category::ALL, |category, count| seen.push((category, count)))
            .unwrap();

        assert_eq!(seen.len(), 3);
        let remote = &report.categories[2];
        assert_eq!(remote.category, Category::Remote);
        assert_eq!(remote.detections.len(), 1);
        assert_eq!(remote.detections[0].name, "AnyDesk");
        assert_eq!(report.total(), 1);
        assert!(!report.kaspersky);
        assert_eq!(report.volumes, vec![tmp.path().to_path_buf()]);
    }

    #[test]
    fn test_kaspersky_on_any_volume() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        fs::create_dir_all(second.path().join("Program Files (x86)/Kaspersky Lab")).unwrap();

        let agg = DetectionAggregator::new(
            FixedVolumes(vec![first.path().to_path_buf(), second.path().to_path_buf()]),
            AuditConfig::default(),
        );
        let report = agg.scan_all(&[Category::Vpn], |_, _| {}).unwrap();
        assert!(report.kaspersky);
        // the install directory is not an application record
        assert_eq!(report.total(), 0);
    }

    #[test]
    fn test_no_volumes_fails_the_scan() {
        let agg = DetectionAggregator::new(
            FixedVolumes(vec![PathBuf::from("/no/such/volume")]),
            AuditConfig::default(),
        );
        assert!(matches!(scan(&agg, Category::Chat), Err(ScanError::NoVolumes)));
    }
}
