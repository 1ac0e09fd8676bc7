//! Process command - extract data from a single invoice file.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use fapiao_core::invoice::RuleBasedParser;
use fapiao_core::source::extract_file;

use super::config::load_config;
use super::output::{format_record, OutputFormat};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (PDF, image, or recognized text)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Report fields recovered by fallback heuristics
    #[arg(long)]
    show_fallbacks: bool,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {msg}")?
            .progress_chars("##-"),
    );

    pb.set_message("Reading text...");
    let parser = RuleBasedParser::with_config(config.extraction.clone());
    let result = extract_file(&args.input, &config, &parser, &mut |fraction| {
        if fraction >= 1.0 {
            pb.set_message("Extracting invoice data...");
        }
        pb.set_position((fraction * 80.0) as u64)
    })?;

    pb.finish_and_clear();

    let output = format_record(&result.record, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        eprintln!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if args.show_fallbacks {
        eprintln!();
        if result.fallbacks.is_empty() {
            eprintln!("{} No fallback heuristics used", style("ℹ").blue());
        }
        for fallback in &result.fallbacks {
            eprintln!(
                "{} {} recovered by {}",
                style("⚠").yellow(),
                fallback.field,
                fallback.source
            );
        }
        eprintln!(
            "{} Extraction time: {}ms",
            style("ℹ").blue(),
            result.processing_time_ms
        );
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}
