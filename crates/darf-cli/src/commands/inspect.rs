//! Inspect command - show reconstructed lines and review hints for one file.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;

use darf_core::{DarfPipeline, RecordIdGenerator};

use crate::output::code_label;

use super::config::load_config;
use super::process::display_name;

/// Arguments for the inspect command.
#[derive(Args)]
pub struct InspectArgs {
    /// Input PDF file
    #[arg(required = true)]
    input: PathBuf,
}

pub async fn run(args: InspectArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let data = fs::read(&args.input)?;
    let filename = display_name(&args.input);
    let pipeline = DarfPipeline::new(&config)?;

    let lines = pipeline.reconstruct(&data)?;

    println!("{} {} ({} lines)", style("File:").bold(), filename, lines.len());
    let searched: Vec<String> = config
        .extraction
        .target_codes
        .iter()
        .map(|code| code_label(code))
        .collect();
    println!("{} {}", style("Codes:").bold(), searched.join(", "));
    println!();
    for (i, line) in lines.iter().enumerate() {
        println!("{:>4}  {}", style(i + 1).dim(), line);
    }

    let ids = RecordIdGenerator::new();
    let records = pipeline.parser().parse(&filename, &lines, &ids);
    let flagged: Vec<_> = records.iter().filter(|r| !r.is_success()).collect();

    println!();
    if flagged.is_empty() {
        println!(
            "{} {} records, none need review",
            style("✓").green(),
            records.len()
        );
        return Ok(());
    }

    println!("{}", style("Needs review:").yellow());
    for record in flagged {
        println!(
            "  - [{}] {}: {}",
            record.status,
            code_label(&record.code),
            record.message.as_deref().unwrap_or("")
        );
        if !record.raw_line.is_empty() {
            println!("      line: {}", record.raw_line);
        }
    }

    Ok(())
}
