// Plain-text export of a scan report
use crate::error::ScanError;
use crate::models::{Category, ScanReport};
use chrono::{DateTime, Local, Utc};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// `scan_results_<timestamp>.txt`
pub fn default_file_name(now: DateTime<Local>) -> String {
    format!("scan_results_{}.txt", now.format("%Y%m%d_%H%M%S"))
}

fn heading(out: &mut String, title: &str) {
    let _ = writeln!(out, "{}", title);
    let _ = writeln!(out, "{}", "-".repeat(40));
}

pub fn render_text(report: &ScanReport) -> String {
    let mut out = String::new();
    let rule = "=".repeat(60);
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "APPLICATION AUDIT REPORT");
    let _ = writeln!(out, "{}\n", rule);

    heading(&mut out, "SCAN");
    let _ = writeln!(out, "Started: {}", local_time(report.started_at));
    let _ = writeln!(out, "Finished: {}", local_time(report.finished_at));
    let volumes: Vec<String> = report.volumes.iter().map(|v| v.display().to_string()).collect();
    let _ = writeln!(out, "Volumes: {}\n", volumes.join(", "));

    heading(&mut out, "SUMMARY");
    for findings in &report.categories {
        let _ = writeln!(out, "{}: {}", findings.category.title(), findings.detections.len());
    }
    let _ = writeln!(out, "Kaspersky: {}\n", kaspersky_status(report.kaspersky));

    for findings in &report.categories {
        heading(&mut out, &findings.category.title().to_uppercase());
        if findings.detections.is_empty() {
            let _ = writeln!(out, "No {} applications found\n", noun(findings.category));
            continue;
        }
        for d in &findings.detections {
            let _ = writeln!(out, "[FOUND] {}", d.name);
            let _ = writeln!(out, "  Path: {}", d.path.display());
            let _ = writeln!(out, "  Type: {}", d.category);
            let _ = writeln!(out, "  Method: {}\n", d.detection_method.as_str());
        }
    }

    out
}

fn kaspersky_status(installed: bool) -> &'static str {
    if installed {
        "INSTALLED"
    } else {
        "NOT INSTALLED"
    }
}

fn noun(category: Category) -> &'static str {
    match category {
        Category::Vpn => "VPN",
        Category::Chat => "chat",
        Category::Remote => "remote control",
    }
}

fn local_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
}

pub fn write_text(report: &ScanReport, path: &Path) -> Result<(), ScanError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, render_text(report))?;
    Ok(())
}
