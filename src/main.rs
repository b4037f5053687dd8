use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use kpi_engine::{AlertEngine, MetricsConfig, MetricsEngine, Snapshot, SortKey, SortState};

#[derive(Parser, Debug)]
#[command(
    name = "kpi-engine",
    version,
    about = "Sales, marketing and retention KPIs from data snapshots"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compute every KPI for a snapshot directory
    Report {
        /// Directory holding customers/transactions/leads/marketing_spend/revenue (.csv or .json)
        #[arg(short, long)]
        data: PathBuf,

        /// Metrics policy config (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Customers acquired in the CAC period (derived from join dates if omitted)
        #[arg(long)]
        acquired: Option<u32>,

        /// Alert rules (JSON) to evaluate against the report
        #[arg(long)]
        alerts: Option<PathBuf>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the transaction table after a sequence of column activations
    Sort {
        #[arg(short, long)]
        data: PathBuf,

        /// Column to activate; repeat to toggle (e.g. --by amount --by amount)
        #[arg(long = "by")]
        by: Vec<SortKey>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Report {
            data,
            config,
            acquired,
            alerts,
            json,
        } => run_report(data, config, acquired, alerts, json),
        Commands::Sort { data, by } => run_sort(data, by),
    }
}

fn load_snapshot(data: &PathBuf) -> Result<Snapshot> {
    Snapshot::load_dir(data).with_context(|| format!("Failed to load snapshot from {:?}", data))
}

fn run_report(
    data: PathBuf,
    config: Option<PathBuf>,
    acquired: Option<u32>,
    alerts: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let config = match config {
        Some(path) => MetricsConfig::from_file(path)?,
        None => MetricsConfig::default(),
    };
    let snapshot = load_snapshot(&data)?;

    let engine = MetricsEngine::with_config(config);
    let report = engine.report(&snapshot, acquired, Utc::now());

    let fired = match alerts {
        Some(path) => {
            let alert_engine = AlertEngine::from_file(path)?;
            info!(rules = alert_engine.rule_count(), "evaluating alert rules");
            alert_engine.evaluate(&report)
        }
        None => Vec::new(),
    };

    if json {
        let output = serde_json::json!({ "report": report, "alerts": fired });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("📊 KPI Report");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("{}", report.summary());

    if !fired.is_empty() {
        println!("\n🔔 Alerts ({})", fired.len());
        for alert in &fired {
            println!("  [{}] {}", alert.severity, alert.message);
        }
    }

    Ok(())
}

fn run_sort(data: PathBuf, by: Vec<SortKey>) -> Result<()> {
    let snapshot = load_snapshot(&data)?;

    let mut state = SortState::new();
    for key in by {
        state.request_sort(key);
    }

    if let (Some(key), Some(direction)) = (state.key(), state.direction()) {
        info!(%key, ?direction, "sorting transactions");
    }

    println!(
        "{:<10} {:<20} {:<12} {:>12} {:<10} {:<10}",
        "ID", "Customer", "Product", "Amount", "Status", "Date"
    );
    for tx in state.apply_refs(&snapshot.transactions) {
        println!(
            "{:<10} {:<20} {:<12} {:>12.2} {:<10} {:<10}",
            tx.id, tx.customer_name, tx.product, tx.amount, tx.status, tx.date
        );
    }

    Ok(())
}
