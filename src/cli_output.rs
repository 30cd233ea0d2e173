// Terminal output for scan results
use crate::models::{Category, Detection, ScanReport};
use colored::Colorize;
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use std::io::{self, IsTerminal};

/// Output mode for CLI commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Colors, tables and a progress spinner
    Human,
    /// The report as JSON on stdout, nothing else
    Json,
    /// Plain text without colors (for pipes/logs)
    Plain,
}

impl OutputMode {
    /// Auto-detect output mode based on environment
    pub fn auto() -> Self {
        if std::env::var("APPSWEEP_JSON").is_ok() {
            Self::Json
        } else if !io::stdout().is_terminal() {
            Self::Plain
        } else {
            Self::Human
        }
    }
}

/// CLI output writer with mode awareness
pub struct OutputWriter {
    mode: OutputMode,
}

impl OutputWriter {
    pub fn new(mode: OutputMode) -> Self {
        Self { mode }
    }

    pub fn auto() -> Self {
        Self::new(OutputMode::auto())
    }

    /// Print a section header
    pub fn section(&self, title: &str) {
        match self.mode {
            OutputMode::Human => {
                println!();
                println!("{}", title.cyan().bold());
                println!("{}", "═".repeat(title.chars().count()).cyan());
            }
            OutputMode::Plain => {
                println!();
                println!("{}", title);
                println!("{}", "=".repeat(title.chars().count()));
            }
            OutputMode::Json => {}
        }
    }

    pub fn success(&self, message: &str) {
        match self.mode {
            OutputMode::Human => println!("  {} {}", "✓".green(), message),
            OutputMode::Plain => println!("  [OK] {}", message),
            OutputMode::Json => {}
        }
    }

    /// Errors go to stderr in every mode
    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Human => eprintln!("  {} {}", "✗".red(), message),
            _ => eprintln!("  [ERROR] {}", message),
        }
    }

    /// Print a key-value table
    pub fn table(&self, rows: &[(&str, String)]) {
        let max_key_len = rows.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
        match self.mode {
            OutputMode::Human => {
                for (key, value) in rows {
                    println!("  {:width$} │ {}", key.yellow(), value, width = max_key_len);
                }
            }
            OutputMode::Plain => {
                for (key, value) in rows {
                    println!("  {:width$} : {}", key, value, width = max_key_len);
                }
            }
            OutputMode::Json => {}
        }
    }

    /// Detections of one category
    pub fn detections(&self, category: Category, detections: &[Detection]) {
        self.section(&format!("{} ({})", category.title(), detections.len()));
        match self.mode {
            OutputMode::Human => {
                if detections.is_empty() {
                    println!("  {}", "Nothing found".dimmed());
                    return;
                }
                println!("{}", detection_table(detections));
            }
            OutputMode::Plain => {
                for d in detections {
                    println!(
                        "  [FOUND] {} | {} | {} | {}",
                        d.name,
                        d.path.display(),
                        d.category,
                        d.detection_method.as_str()
                    );
                }
            }
            OutputMode::Json => {}
        }
    }

    /// Whole report: JSON in JSON mode, a table per category otherwise
    pub fn report(&self, report: &ScanReport) {
        if matches!(self.mode, OutputMode::Json) {
            match serde_json::to_string_pretty(report) {
                Ok(json) => println!("{}", json),
                Err(e) => self.error(&format!("Failed to serialize report: {}", e)),
            }
            return;
        }

        for findings in &report.categories {
            self.detections(findings.category, &findings.detections);
        }

        self.section("Summary");
        let mut rows: Vec<(&str, String)> = report
            .categories
            .iter()
            .map(|f| (f.category.title(), f.detections.len().to_string()))
            .collect();
        let kaspersky = if report.kaspersky { "Installed" } else { "Not installed" };
        rows.push(("Kaspersky", kaspersky.to_string()));
        rows.push(("Volumes", report.volumes.len().to_string()));
        rows.push(("Duration", format_duration(report.duration_secs())));
        self.table(&rows);
    }

    pub fn is_human(&self) -> bool {
        matches!(self.mode, OutputMode::Human)
    }
}

fn detection_table(detections: &[Detection]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Application", "Path", "Type", "Method"]);
    for d in detections {
        table.add_row(vec![
            d.name.clone(),
            d.path.display().to_string(),
            d.category.to_string(),
            d.detection_method.as_str().to_string(),
        ]);
    }
    table
}

/// Format duration in human-readable form
pub fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        format!("{}m {}s", seconds / 60, seconds % 60)
    } else {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    }
}
