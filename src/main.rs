use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod cli_output;
mod config;
mod discovery;
mod error;
mod exclusions;
mod known_paths;
mod matcher;
mod models;
mod normalize;
mod patterns;
mod ranking;
mod report;
mod task;
mod validator;
mod volumes;
mod walker;

use cli_output::{OutputMode, OutputWriter};
use config::AuditConfig;
use discovery::DetectionAggregator;
use models::{Category, ScanReport};
use patterns::PatternTable;
use task::{ScanEvent, ScanTask};
use volumes::{FixedVolumes, SystemVolumes, VolumeEnumerator};

#[derive(Parser)]
#[command(name = "appsweep")]
#[command(about = "Find installed VPN, chat and remote-control applications", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan volumes for installed applications
    Scan {
        /// Categories to scan: vpn, chat, remote (default: all)
        #[arg(value_parser = parse_category)]
        categories: Vec<Category>,

        /// Scan this root instead of the mounted volumes (repeatable)
        #[arg(short, long)]
        root: Vec<PathBuf>,

        /// Walk depth for every category
        #[arg(long)]
        max_depth: Option<usize>,

        /// Entries examined per directory
        #[arg(long)]
        item_cap: Option<usize>,

        /// User profile whose AppData is scanned first
        #[arg(short, long)]
        user: Option<String>,

        /// Print the report as JSON
        #[arg(long, conflicts_with = "plain")]
        json: bool,

        /// Plain output without colors
        #[arg(long)]
        plain: bool,

        /// Also write a plain-text report (file or directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Config file (default: <config dir>/appsweep/config.json)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Show or create the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// List the built-in application patterns
    Patterns {
        /// Only this category
        #[arg(value_parser = parse_category)]
        category: Option<Category>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Write a config file with the default settings
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn parse_category(s: &str) -> Result<Category, String> {
    Category::parse(s).ok_or_else(|| format!("unknown category '{}' (expected vpn, chat or remote)", s))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so JSON on stdout stays clean
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let builder = FmtSubscriber::builder()
        .with_target(false)
        .with_writer(std::io::stderr);
    if std::env::var_os("RUST_LOG").is_some() {
        tracing::subscriber::set_global_default(builder.with_env_filter(EnvFilter::from_default_env()).finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.with_max_level(level).finish())?;
    }

    match cli.command {
        Commands::Scan {
            categories,
            root,
            max_depth,
            item_cap,
            user,
            json,
            plain,
            output,
            config,
        } => {
            let mut audit = load_config(config)?;
            if let Some(depth) = max_depth {
                audit.max_depth.set_all(depth);
            }
            if item_cap.is_some() {
                audit.item_cap = item_cap;
            }
            if user.is_some() {
                audit.username = user;
            }
            if !root.is_empty() {
                audit.volumes = root;
            }

            let mut selected: Vec<Category> = Vec::new();
            for category in categories {
                if !selected.contains(&category) {
                    selected.push(category);
                }
            }
            if selected.is_empty() {
                selected = Category::ALL.to_vec();
            }

            let mode = if json {
                OutputMode::Json
            } else if plain {
                OutputMode::Plain
            } else {
                OutputMode::auto()
            };
            let writer = OutputWriter::new(mode);

            let report = if audit.volumes.is_empty() {
                run_scan(DetectionAggregator::new(SystemVolumes, audit), selected, &writer).await?
            } else {
                let volumes = FixedVolumes(audit.volumes.clone());
                run_scan(DetectionAggregator::new(volumes, audit), selected, &writer).await?
            };

            writer.report(&report);

            if let Some(path) = output {
                let path = if path.is_dir() {
                    path.join(report::default_file_name(Local::now()))
                } else {
                    path
                };
                report::write_text(&report, &path)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                writer.success(&format!("Report written to {}", path.display()));
            }
        }

        Commands::Config { action } => match action {
            ConfigAction::Show { config } => {
                let audit = load_config(config)?;
                let writer = OutputWriter::auto();
                writer.section("Configuration");
                let location = AuditConfig::config_file_path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "unavailable".to_string());
                writer.table(&[("File", location), ("User", audit.username())]);
                println!("{}", serde_json::to_string_pretty(&audit)?);
            }
            ConfigAction::Init { force } => {
                let path = AuditConfig::config_file_path().context("Could not determine config directory")?;
                if path.exists() && !force {
                    bail!("{} already exists (use --force to overwrite)", path.display());
                }
                let mut audit = AuditConfig::default();
                audit.max_depth.vpn = Some(Category::Vpn.default_max_depth());
                audit.max_depth.chat = Some(Category::Chat.default_max_depth());
                audit.max_depth.remote = Some(Category::Remote.default_max_depth());
                audit.item_cap = Some(config::DEFAULT_ITEM_CAP);
                let saved = audit.save()?;
                info!("Wrote {}", saved.display());
                OutputWriter::auto().success(&format!("Config written to {}", saved.display()));
            }
        },

        Commands::Patterns { category } => {
            let writer = OutputWriter::auto();
            let categories = match category {
                Some(c) => vec![c],
                None => Category::ALL.to_vec(),
            };
            for category in categories {
                let table = PatternTable::for_category(category);
                writer.section(&format!("{} ({})", category.title(), table.len()));
                let rows: Vec<(&str, String)> = table
                    .iter()
                    .map(|app| (app.name.as_str(), app.patterns.join(", ")))
                    .collect();
                writer.table(&rows);
            }
        }
    }

    Ok(())
}

fn load_config(path: Option<PathBuf>) -> Result<AuditConfig> {
    let audit = match path {
        Some(path) => AuditConfig::load_from(&path)?,
        None => AuditConfig::load()?,
    };
    Ok(audit)
}

/// Run the scan on a worker, with a progress bar in human mode
async fn run_scan<V>(
    aggregator: DetectionAggregator<V>,
    categories: Vec<Category>,
    writer: &OutputWriter,
) -> Result<ScanReport>
where
    V: VolumeEnumerator + Send + 'static,
{
    let pb = if writer.is_human() {
        let pb = ProgressBar::new(categories.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.cyan} [{elapsed}] {bar:30.cyan/blue} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        pb.enable_steady_tick(Duration::from_millis(120));
        Some(pb)
    } else {
        None
    };

    let result = ScanTask::spawn(aggregator, categories)
        .finish(|event| {
            let Some(pb) = &pb else { return };
            match event {
                ScanEvent::Started { categories } => {
                    if let Some(first) = categories.first() {
                        pb.set_message(format!("scanning {}", first));
                    }
                }
                ScanEvent::CategoryDone { category, found } => {
                    pb.inc(1);
                    pb.set_message(format!("{}: {} found", category, found));
                }
                ScanEvent::Completed(_) | ScanEvent::Failed(_) => {}
            }
        })
        .await;

    if let Some(pb) = &pb {
        pb.finish_and_clear();
    }

    let report = result.context("Scan failed")?;
    info!(
        "Scan finished: {} application(s) in {}",
        report.total(),
        cli_output::format_duration(report.duration_secs())
    );
    Ok(report)
}
