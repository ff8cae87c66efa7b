//! Brainboard layout command-line entry point.
//!
//! # Responsibility
//! - Run one reconciliation pass over JSON record files and print the plan.
//! - Apply the drag/resize constraint to a single rect from the command line.
//! - Keep stdout pure JSON; logs go to stderr or a log directory.

use brainboard_core::{
    constrain, decode_records_lenient, default_log_level, init_logging, init_stderr_logging,
    EngineConfig, GridBounds, GridRect, LayoutService, ReconcileInput, SizeBounds, ViewportSize,
    WidgetRecord,
};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use log::info;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

const DEFAULT_COLUMNS: i32 = 12;

#[derive(Parser)]
#[command(name = "brainboard")]
#[command(about = "Brainboard dashboard layout engine", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify and place widget records, printing the layout plan
    Layout(LayoutArgs),
    /// Clamp one dragged or resized rect into the grid
    Constrain(ConstrainArgs),
}

#[derive(Args)]
struct LayoutArgs {
    /// JSON array of daily widget records
    #[arg(long)]
    records: PathBuf,
    /// JSON array of "all widgets" records for view-widget visibility
    #[arg(long)]
    all_widgets: Option<PathBuf>,
    #[arg(long, default_value_t = DEFAULT_COLUMNS)]
    columns: i32,
    /// Reference date (YYYY-MM-DD); defaults to the local date
    #[arg(long, value_parser = parse_date)]
    today: Option<NaiveDate>,
    /// Engine configuration JSON file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Absolute directory for rolling log files; stderr when omitted
    #[arg(long)]
    log_dir: Option<String>,
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Args)]
struct ConstrainArgs {
    #[arg(long, allow_hyphen_values = true)]
    x: i32,
    #[arg(long, allow_hyphen_values = true)]
    y: i32,
    #[arg(long, allow_hyphen_values = true)]
    w: i32,
    #[arg(long, allow_hyphen_values = true)]
    h: i32,
    #[arg(long, default_value_t = 1)]
    min_w: i32,
    #[arg(long, default_value_t = 1)]
    min_h: i32,
    #[arg(long)]
    max_w: Option<i32>,
    #[arg(long)]
    max_h: Option<i32>,
    #[arg(long, default_value_t = DEFAULT_COLUMNS)]
    columns: i32,
    /// Row bound; derived from `--viewport-height` when omitted
    #[arg(long)]
    rows: Option<i32>,
    /// Window height in pixels, converted to rows with the configured metrics
    #[arg(long)]
    viewport_height: Option<f64>,
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let outcome = match cli.command {
        Commands::Layout(args) => run_layout(args),
        Commands::Constrain(args) => run_constrain(args),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("brainboard: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run_layout(args: LayoutArgs) -> Result<(), Box<dyn Error>> {
    let level = args.log_level.as_deref().unwrap_or(default_log_level());
    match args.log_dir.as_deref() {
        Some(dir) => init_logging(level, dir)?,
        None => init_stderr_logging(level)?,
    }

    let config = load_config(args.config.as_deref())?;
    let service = LayoutService::new(config)?;
    let records = read_records(&args.records)?;
    let all_widgets = match args.all_widgets.as_deref() {
        Some(path) => read_records(path)?,
        None => Vec::new(),
    };
    let today = args
        .today
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    info!(
        "event=cli_layout module=cli status=ok records={} all_widgets={} columns={} today={}",
        records.len(),
        all_widgets.len(),
        args.columns,
        today
    );

    let plan = service.reconcile(ReconcileInput {
        records: &records,
        all_widgets: &all_widgets,
        columns: args.columns,
        today,
    });
    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}

fn run_constrain(args: ConstrainArgs) -> Result<(), Box<dyn Error>> {
    let config = load_config(args.config.as_deref())?;
    let bounds = match (args.rows, args.viewport_height) {
        (Some(rows), _) => GridBounds::new(args.columns, rows),
        (None, Some(height)) => GridBounds::from_viewport(
            ViewportSize { width: 0.0, height },
            &config.viewport,
            args.columns,
        ),
        (None, None) => return Err("either --rows or --viewport-height is required".into()),
    };
    let size = SizeBounds {
        min_w: args.min_w,
        min_h: args.min_h,
        max_w: args.max_w,
        max_h: args.max_h,
    };

    let rect = constrain(GridRect::new(args.x, args.y, args.w, args.h), bounds, size);
    println!("{}", serde_json::to_string(&rect)?);
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig, Box<dyn Error>> {
    match path {
        Some(path) => Ok(EngineConfig::load(path)?),
        None => Ok(EngineConfig::default()),
    }
}

fn read_records(path: &Path) -> Result<Vec<WidgetRecord>, Box<dyn Error>> {
    let raw = std::fs::read_to_string(path)
        .map_err(|err| format!("failed to read `{}`: {err}", path.display()))?;
    Ok(decode_records_lenient(&raw)?)
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("expected YYYY-MM-DD, got `{raw}`: {err}"))
}
