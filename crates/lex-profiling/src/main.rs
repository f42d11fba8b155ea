//! CLI entry point for the dataset profiler.

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use dotenv::dotenv;
use lex_profiling::{
    ParquetSnapshotWriter, ProfilingConfig, ProfilingJob, ProfilingResult, RecommendationType,
    write_result_json,
};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "lex-profiling")]
#[command(about = "Profile a CSV or Excel dataset and recommend data-quality fixes")]
#[command(version)]
struct Args {
    /// Path to the CSV, XLSX or XLS file to profile
    #[arg(short, long)]
    input: PathBuf,

    /// Output directory for reports and snapshots
    #[arg(short, long, default_value = "./outputs")]
    output: PathBuf,

    /// JSON file with profiling settings
    ///
    /// Any field may be omitted; missing fields take their defaults.
    /// Flags below override values from this file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Maximum upload size in megabytes
    #[arg(long, env = "LEX_PROFILING_MAX_UPLOAD_MB")]
    max_upload_mb: Option<u64>,

    /// Maximum number of data rows
    #[arg(long, env = "LEX_PROFILING_MAX_ROWS")]
    max_rows: Option<usize>,

    /// CSV field delimiter (single ASCII character)
    #[arg(short, long)]
    delimiter: Option<char>,

    /// Treat the first CSV row as data and generate column names
    #[arg(long)]
    no_header: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show errors and final result)
    #[arg(short, long)]
    quiet: bool,

    /// Output JSON to stdout instead of human-readable summary
    ///
    /// Disables all progress logs; only outputs the result JSON.
    /// Useful for piping to other tools: `... --json | jq .insights`
    #[arg(long)]
    json: bool,

    /// Write the result JSON to the output directory
    ///
    /// The report will be saved as <report_id>.json
    #[arg(short = 'r', long)]
    emit_report: bool,

    /// Write a parquet snapshot of the typed table to the output directory
    ///
    /// The snapshot will be saved as <report_id>.parquet
    #[arg(short, long)]
    snapshot: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    // Load environment variables before clap reads `env` fallbacks
    dotenv().ok();

    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    if !args.input.exists() {
        return Err(anyhow!("Input file not found: {}", args.input.display()));
    }

    let config = build_config(&args)?;
    debug!(?config, "Resolved configuration");

    let mut builder = ProfilingJob::builder().config(config.clone());
    if args.snapshot {
        let writer =
            ParquetSnapshotWriter::new(&args.output).with_vocabulary(config.boolean_vocabulary);
        builder = builder.renderer(Arc::new(writer));
    }
    if !args.json && !args.quiet {
        builder = builder.on_progress(|update| {
            debug!(
                stage = ?update.stage,
                progress = update.progress,
                "{}",
                update.message
            );
        });
    }
    let job = builder.build()?;

    let filename = args
        .input
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| anyhow!("Input path has no file name: {}", args.input.display()))?
        .to_string();

    info!("Profiling dataset from: {}", args.input.display());
    let file = File::open(&args.input)
        .with_context(|| format!("opening {}", args.input.display()))?;
    let declared_len = file.metadata().ok().map(|meta| meta.len());
    let result = job.run_reader(&filename, file, declared_len)?;

    if args.emit_report {
        let path = write_result_json(&args.output, &result)?;
        info!("Report written to {}", path.display());
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if !args.quiet {
        print_human_readable_summary(&result, &args.output, &args);
    }

    Ok(())
}

/// Load the optional config file, then apply flag and environment overrides.
fn build_config(args: &Args) -> Result<ProfilingConfig> {
    let base = match &args.config {
        Some(path) => load_config_file(path)?,
        None => ProfilingConfig::default(),
    };

    let mut builder = ProfilingConfig::builder().base(base);

    if let Some(mb) = args.max_upload_mb {
        builder = builder.max_upload_bytes(mb.saturating_mul(1024 * 1024));
    }
    if let Some(rows) = args.max_rows {
        builder = builder.max_rows(rows);
    }
    if let Some(delimiter) = args.delimiter {
        if !delimiter.is_ascii() {
            return Err(anyhow!("Delimiter must be a single ASCII character, got {delimiter:?}"));
        }
        builder = builder.delimiter(delimiter as u8);
    }
    if args.no_header {
        builder = builder.has_header(false);
    }

    Ok(builder.build()?)
}

fn load_config_file(path: &Path) -> Result<ProfilingConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config file {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing config file {}", path.display()))
}

/// Print a human-readable summary of the profiling result.
///
/// Note: This function uses `println!` intentionally for user-facing CLI output.
fn print_human_readable_summary(result: &ProfilingResult, output_dir: &Path, args: &Args) {
    let insights = &result.insights;

    println!();
    println!("{}", "=".repeat(80));
    println!("PROFILING COMPLETE");
    println!("{}", "=".repeat(80));
    println!();

    println!(
        "File:   {} ({} rows x {} columns)",
        result.filename, insights.row_count, insights.column_count
    );
    println!("Report: {}", result.report_id);
    println!();

    println!("Dataset Summary:");
    println!("  Completeness: {:.1}%", insights.completeness);
    println!("  Duplicate rows: {}", insights.duplicates);
    println!("  Estimated memory: {:.2} MB", insights.memory_usage);
    println!();

    println!("{:<30} {:<12} {:<10}", "Column", "Type", "Missing %");
    println!("{}", "-".repeat(54));
    for (name, semantic_type) in insights.data_types.iter() {
        let missing = insights
            .missing_data
            .get(name)
            .map(|info| info.percentage)
            .unwrap_or(0.0);
        println!(
            "{:<30} {:<12} {:<10.1}",
            truncate_str(name, 29),
            semantic_type.label(),
            missing
        );
    }
    println!();

    if result.recommendations.is_empty() {
        println!("No recommendations.");
    } else {
        println!("Recommendations:");
        for rec in &result.recommendations {
            let marker = match rec.kind {
                RecommendationType::Critical => "!!",
                RecommendationType::Warning => " !",
                RecommendationType::Info => " -",
                RecommendationType::Success => " +",
            };
            println!(
                "  {} [{}] {}: {}",
                marker,
                rec.category.display_name(),
                rec.title,
                rec.description
            );
            println!("       -> {}", rec.action);
        }
    }
    println!();

    if args.emit_report {
        println!("Report JSON: {}", output_dir.join(format!("{}.json", result.report_id)).display());
    }
    if args.snapshot {
        println!(
            "Snapshot:    {}",
            output_dir.join(format!("{}.parquet", result.report_id)).display()
        );
    }

    println!("Use --json for machine-readable output");
    println!("Use --emit-report to save the result JSON");
    println!("{}", "=".repeat(80));
}

/// Truncate a string to a maximum length, adding ellipsis if needed.
fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}
