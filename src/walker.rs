// Bounded, symlink-avoiding directory crawl that emits raw app candidates
use crate::config::ScanConfig;
use crate::exclusions::ExclusionPolicy;
use crate::matcher::NameMatcher;
use crate::models::CandidateDetection;
use crate::patterns::PatternTable;
use crate::validator::InstallationValidator;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

pub struct DirectoryWalker<'a> {
    table: &'a PatternTable,
    matcher: &'a NameMatcher,
    config: &'a ScanConfig,
    validator: InstallationValidator,
}

impl<'a> DirectoryWalker<'a> {
    pub fn new(table: &'a PatternTable, matcher: &'a NameMatcher, config: &'a ScanConfig) -> Self {
        Self {
            table,
            matcher,
            config,
            validator: InstallationValidator::new(),
        }
    }

    /// Validate paths relative to `volume`
    pub fn anchored_to(mut self, volume: &Path) -> Self {
        self.validator = InstallationValidator::anchored(volume);
        self
    }

    pub fn walk(&self, root: &Path) -> Vec<CandidateDetection> {
        self.walk_to_depth(root, self.config.max_depth)
    }

    /// Pre-order walk. Entries at most `max_depth` levels below `root` are
    /// examined; unreadable subtrees contribute nothing.
    pub fn walk_to_depth(&self, root: &Path, max_depth: usize) -> Vec<CandidateDetection> {
        let mut found = Vec::new();
        // walkdir raises max_depth to min_depth
        if max_depth == 0 {
            return found;
        }

        let budget = RefCell::new(EntryBudget::default());
        let entries = WalkDir::new(root)
            .min_depth(1)
            .max_depth(max_depth)
            .follow_links(false)
            .follow_root_links(false)
            .into_iter()
            .filter_entry(|entry| self.admit(entry, &budget));

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    // An error without a path is an unreadable entry of the
                    // directory being listed; it counts toward the cap
                    if e.path().is_none() {
                        budget.borrow_mut().charge(e.depth());
                    }
                    debug!("Skipping entry under {}: {}", root.display(), e);
                    continue;
                }
            };

            let Some(name) = entry.file_name().to_str() else {
                continue;
            };
            let file_type = entry.file_type();
            if file_type.is_dir() {
                if let Some(app) = self.matcher.find_app(name, self.table) {
                    if self.validator.is_valid(app, entry.path()) {
                        found.push(CandidateDetection::directory(app, entry.path().to_path_buf()));
                    }
                }
            } else if file_type.is_file() {
                if let Some(stem) = exe_stem(name) {
                    self.check_executable(stem, entry.path().to_path_buf(), &mut found);
                }
            }
        }
        found
    }

    /// Pruning rules. The item cap is charged before any other rule, so
    /// skipped entries use slots too.
    fn admit(&self, entry: &DirEntry, budget: &RefCell<EntryBudget>) -> bool {
        if entry.depth() == 0 {
            return true;
        }

        let position = budget.borrow_mut().charge(entry.depth());
        let cap = self.config.item_cap;
        if position > cap {
            if position == cap + 1 {
                if let Some(parent) = entry.path().parent() {
                    debug!("{} has more than {} entries, truncated", parent.display(), cap);
                }
            }
            return false;
        }

        let Some(name) = entry.file_name().to_str() else {
            debug!("Skipping non-UTF-8 entry {}", entry.path().display());
            return false;
        };
        if self.config.excluded.is_excluded(name) || ExclusionPolicy::is_hidden(name) {
            return false;
        }
        if entry.path_is_symlink() {
            debug!("Not following symlink {}", entry.path().display());
            return false;
        }
        true
    }

    fn check_executable(&self, stem: &str, path: PathBuf, found: &mut Vec<CandidateDetection>) {
        if let Some(app) = self.matcher.find_app(stem, self.table) {
            if self.validator.is_valid(app, &path) {
                found.push(CandidateDetection::executable(app, path));
            }
        }
    }
}

/// Entries seen so far in each directory on the current walk path,
/// indexed by the depth of the entries.
#[derive(Debug, Default)]
struct EntryBudget {
    seen: Vec<usize>,
}

impl EntryBudget {
    /// Count one entry at `depth` (1 for children of the root) and return
    /// its position in its directory's listing, starting at 1.
    fn charge(&mut self, depth: usize) -> usize {
        let level = depth.saturating_sub(1);
        // Deeper counters belong to directories already left behind
        self.seen.truncate(level + 1);
        self.seen.resize(level + 1, 0);
        let count = &mut self.seen[level];
        *count += 1;
        *count
    }
}

/// File name without a case-insensitive `.exe` extension
fn exe_stem(name: &str) -> Option<&str> {
    let split = name.len().checked_sub(4)?;
    let ext = name.get(split..)?;
    if ext.eq_ignore_ascii_case(".exe") {
        name.get(..split)
    } else {
        None
    }
}
