//! shaker-monitor - Shaker Health Dashboard CLI
//!
//! Runs the dashboard pipeline on a CSV upload and prints the result.
//!
//! # Usage
//!
//! ```bash
//! # Text summary of an upload
//! shaker-monitor report --csv shaker_data.csv
//!
//! # Full JSON report for the presentation layer
//! shaker-monitor report --csv shaker_data.csv --json report.json
//!
//! # Page through the raw data table
//! shaker-monitor table --csv shaker_data.csv --page 2 --page-size 200
//!
//! # Show the effective configuration
//! shaker-monitor --mesh "API 170" --threshold 75 config
//! ```
//!
//! # Environment Variables
//!
//! - `SHAKER_CONFIG`: Path to a TOML config file (default: ./shaker_config.toml)
//! - `RUST_LOG`: Logging level (default: info)

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use shaker_monitor::dashboard::{DashboardReport, FeatureResult, TablePage};
use shaker_monitor::{DashboardConfig, DashboardSession, DashboardState, MeshType, PageSize, Upload};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "shaker-monitor")]
#[command(about = "Shaker and mud-screen telemetry dashboard")]
#[command(version)]
struct CliArgs {
    /// Path to a TOML config file (default: ./shaker_config.toml, then built-in defaults)
    #[arg(long, global = true, env = "SHAKER_CONFIG")]
    config: Option<PathBuf>,

    /// Screen mesh type ("API 100", "API 140", "API 170", "API 200")
    #[arg(long, global = true, value_parser = parse_mesh)]
    mesh: Option<MeshType>,

    /// Utilization threshold (%), 50-100
    #[arg(long, global = true)]
    threshold: Option<u8>,

    #[command(subcommand)]
    command: SubCommand,
}

#[derive(clap::Subcommand, Debug)]
enum SubCommand {
    /// Build the dashboard report for a CSV upload
    Report {
        /// Path to the shaker CSV file
        #[arg(long)]
        csv: PathBuf,
        /// Write the full report as JSON to this path
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Print one page of the raw data table
    Table {
        /// Path to the shaker CSV file
        #[arg(long)]
        csv: PathBuf,
        /// 1-indexed page number
        #[arg(long, default_value = "1")]
        page: usize,
        /// Rows per page (50, 100 or 200); defaults to the configured size
        #[arg(long)]
        page_size: Option<usize>,
    },

    /// Print the effective configuration as TOML
    Config,
}

fn parse_mesh(s: &str) -> std::result::Result<MeshType, String> {
    MeshType::from_label(s).ok_or_else(|| {
        let options: Vec<&str> = MeshType::ALL.iter().map(|m| m.label()).collect();
        format!("unknown mesh type '{s}' (expected one of: {})", options.join(", "))
    })
}

// ============================================================================
// Configuration
// ============================================================================

fn load_config(args: &CliArgs) -> Result<DashboardConfig> {
    let mut config = match &args.config {
        Some(path) => DashboardConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => DashboardConfig::load(),
    };

    if let Some(mesh) = args.mesh {
        config.mesh.mesh_type = mesh;
    }
    if let Some(threshold) = args.threshold {
        config.thresholds.utilization_threshold = threshold;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

// ============================================================================
// Output
// ============================================================================

fn print_report(report: &DashboardReport) {
    println!("Upload: {} ({} rows, {} columns)", report.upload.name, report.upload.rows, report.upload.columns);
    if report.upload.error_rows > 0 {
        println!("  {} malformed rows skipped", report.upload.error_rows);
    }
    println!("  {}", report.upload.columns_found);
    println!("Mesh: {} | Utilization threshold: {:.0}%", report.mesh, report.thresholds.utilization_threshold);
    println!();

    match &report.summary {
        FeatureResult::Available(kpis) => {
            println!("Summary");
            println!("  Depth drilled:      {:.0} ft", kpis.depth_drilled_ft);
            println!(
                "  Shaker load:        {:.1}% avg ({:.1}-{:.1}%)",
                kpis.shaker.mean, kpis.shaker.min, kpis.shaker.max
            );
            println!(
                "  Screen utilization: {:.1}% avg ({:.1}-{:.1}%)",
                kpis.screen_utilization.mean, kpis.screen_utilization.min, kpis.screen_utilization.max
            );
            println!("  Avg flow rate:      {:.1} gal/min", kpis.avg_flow_rate_gpm);
        }
        FeatureResult::Unavailable { reason } => println!("Summary unavailable: {reason}"),
    }
    println!();

    if let FeatureResult::Available(alerts) = &report.alerts {
        println!("Screen advisor");
        if alerts.is_empty() {
            println!("  No advisories");
        }
        for alert in alerts {
            println!("  [{:?}] {}", alert.severity, alert);
        }
        println!();
    }

    if let FeatureResult::Available(pie) = &report.efficiency {
        println!(
            "Solids removal efficiency: {:.1}% removed / {:.1}% losses ({} rows)",
            pie.removed_pct, pie.losses_pct, pie.estimate.rows_used
        );
    }
    if let FeatureResult::Available(series) = &report.realtime {
        println!("Real-time series: {} points of {}", series.points.len(), series.name);
    }
    if let FeatureResult::Available(heat) = &report.heatmap {
        println!("Heatmap: {} days x 24 hours", heat.day_count());
    }
    if let FeatureResult::Available(diag) = &report.diagnostics {
        println!(
            "Row flags: {} normal, {} warning, {} overloaded",
            diag.counts.normal, diag.counts.warning, diag.counts.overloaded
        );
    }

    if !report.warnings.is_empty() {
        println!();
        println!("Warnings");
        for w in &report.warnings {
            println!("  {w}");
        }
    }
}

fn print_table(page: &TablePage) {
    println!("{}", page.columns.join(" | "));
    for row in &page.rows {
        println!("{}", row.join(" | "));
    }
    println!(
        "Page {} of {} ({} rows, {} per page)",
        page.window.page,
        page.window.total_pages,
        page.window.total_rows,
        page.window.page_size
    );
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = CliArgs::parse();
    let config = load_config(&args)?;

    match &args.command {
        SubCommand::Config => {
            print!("{}", config.to_toml().context("Failed to serialize config")?);
        }

        SubCommand::Report { csv, json } => {
            let upload = Upload::from_path(csv)
                .with_context(|| format!("Failed to read {}", csv.display()))?;
            info!(file = %csv.display(), bytes = upload.bytes.len(), "Loaded upload");

            let mut session = DashboardSession::new(config);
            let state = session.run(Some(&upload));

            match &state {
                DashboardState::Idle => println!("No data to display. Upload a shaker CSV to begin."),
                DashboardState::Ready(report) => print_report(report),
            }

            if let Some(out) = json {
                let body = serde_json::to_string_pretty(&state).context("Failed to serialize report")?;
                std::fs::write(out, body)
                    .with_context(|| format!("Failed to write {}", out.display()))?;
                info!(path = %out.display(), "Report written");
            }
        }

        SubCommand::Table { csv, page, page_size } => {
            let size = match page_size {
                Some(rows) => PageSize::try_from(*rows).map_err(anyhow::Error::msg)?,
                None => PageSize::try_from(config.table.page_size).map_err(anyhow::Error::msg)?,
            };
            let upload = Upload::from_path(csv)
                .with_context(|| format!("Failed to read {}", csv.display()))?;

            let mut session = DashboardSession::new(config);
            match session.table(&upload, size, *page)? {
                Some(table) => print_table(&table),
                None => println!("No data to display. Upload a shaker CSV to begin."),
            }
        }
    }

    Ok(())
}
