//! CLI entry point for the weather exploratory analysis.
//!
//! Loads a weather observation CSV, prints descriptive statistics and a
//! summary report, and renders the exploratory charts.

use anyhow::Result;
use clap::Parser;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};
use weather_eda::analyzers::aggregate::{DEFAULT_HISTOGRAM_BINS, explore, key_findings};
use weather_eda::analyzers::analyzer::load_dataset;
use weather_eda::analyzers::types::Analysis;
use weather_eda::analyzers::writejson::write_json;
use weather_eda::charts::render_all;
use weather_eda::output::{format_exploration, format_summary_report};
use weather_eda::parser::DEFAULT_TIMESTAMP_COLUMN;

#[derive(Parser)]
#[command(name = "weather_eda")]
#[command(about = "Exploratory analysis of a weather observation dataset", long_about = None)]
struct Cli {
    /// CSV file with weather observations
    #[arg(value_name = "INPUT", default_value = "weather.csv")]
    input: PathBuf,

    /// Name of the timestamp column
    #[arg(long, default_value = DEFAULT_TIMESTAMP_COLUMN)]
    timestamp_column: String,

    /// Directory the SVG charts are written to
    #[arg(short, long, default_value = "charts")]
    charts_dir: PathBuf,

    /// Skip chart rendering
    #[arg(long, default_value_t = false)]
    no_charts: bool,

    /// Number of temperature histogram bins
    #[arg(short, long, default_value_t = DEFAULT_HISTOGRAM_BINS)]
    bins: usize,

    /// Optional: write the full analysis as JSON to this path
    #[arg(long)]
    json: Option<PathBuf>,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/weather_eda.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("weather_eda.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    info!(input = %cli.input.display(), "Starting analysis");

    let dataset = load_dataset(&cli.input, &cli.timestamp_column)?;

    // stages run one at a time so the exploration and charts are out before
    // key_findings, which fails on an empty dataset
    let exploration = explore(&dataset, cli.bins);
    println!("\n{}", format_exploration(&exploration));

    if cli.no_charts {
        info!("Chart rendering disabled");
    } else {
        let charts = render_all(&dataset, &exploration, &cli.charts_dir)?;
        for chart in &charts {
            info!(path = %chart.display(), "Chart written");
        }
    }

    let findings = key_findings(&dataset)?;
    println!("\n{}", format_summary_report(&findings));

    if let Some(path) = cli.json {
        write_json(&path, &Analysis::new(exploration, findings))?;
    }

    Ok(())
}
