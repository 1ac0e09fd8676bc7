//! Batch processing command for multiple invoice files.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, warn};

use fapiao_core::invoice::RuleBasedParser;
use fapiao_core::models::config::FapiaoConfig;
use fapiao_core::models::invoice::InvoiceRecord;
use fapiao_core::source::{extract_file, DocumentKind};

use super::config::load_config;
use super::output::{format_record, summary_file_name, write_summary, OutputFormat, SummaryRow};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| DocumentKind::detect(p).is_some())
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    eprintln!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files {msg}")?
            .progress_chars("=>-"),
    );

    let parser = RuleBasedParser::with_config(config.extraction.clone());
    let mut rows = Vec::with_capacity(files.len());

    // One document at a time
    for path in &files {
        let file_name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_string();
        overall_pb.set_message(file_name.clone());

        let file_type = DocumentKind::detect(path)
            .map(|k| k.label())
            .unwrap_or("")
            .to_string();

        match process_single_file(path, &parser, &config) {
            Ok(record) => {
                if let Some(output_dir) = &args.output_dir {
                    write_output(output_dir, path, &record, args.format)?;
                }
                rows.push(SummaryRow {
                    file_name,
                    file_type,
                    record: Some(record),
                    error: None,
                });
            }
            Err(e) => {
                warn!("Failed to process {}: {}", path.display(), e);
                rows.push(SummaryRow {
                    file_name,
                    file_type,
                    record: None,
                    error: Some(e.to_string()),
                });
            }
        }

        overall_pb.inc(1);
    }

    overall_pb.finish_and_clear();

    if args.summary {
        let name = summary_file_name(chrono::Local::now().date_naive());
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join(&name))
            .unwrap_or_else(|| PathBuf::from(&name));

        write_summary(&summary_path, &rows)?;
        eprintln!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let failed: Vec<&SummaryRow> = rows.iter().filter(|r| r.record.is_none()).collect();

    eprintln!();
    eprintln!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        rows.len(),
        start.elapsed()
    );
    eprintln!(
        "   {} successful, {} failed",
        style(rows.len() - failed.len()).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        eprintln!();
        eprintln!("{}", style("Failed files:").red());
        for row in &failed {
            eprintln!(
                "  - {}: {}",
                row.file_name,
                row.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn process_single_file(
    path: &Path,
    parser: &RuleBasedParser,
    config: &FapiaoConfig,
) -> anyhow::Result<InvoiceRecord> {
    let result = extract_file(path, config, parser, &mut |_| {})?;
    if !result.fallbacks.is_empty() {
        debug!(
            "{}: {} fields from fallback heuristics",
            path.display(),
            result.fallbacks.len()
        );
    }

    Ok(result.record)
}

fn write_output(
    output_dir: &Path,
    path: &Path,
    record: &InvoiceRecord,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let output_name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("invoice");

    let output_path = output_dir.join(format!("{}.{}", output_name, format.extension()));
    fs::write(&output_path, format_record(record, format)?)?;
    debug!("Wrote output to {}", output_path.display());

    Ok(())
}
