//! Batch processing command for multiple DARF files.

use std::any::Any;
use std::collections::HashMap;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use darf_core::report::report_file_name;
use darf_core::{is_pdf, sort_by_filename, DarfPipeline, RecordIdGenerator, ResultRecord, RunSummary};

use crate::output;

use super::config::load_config;
use super::process::display_name;

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob patterns
    #[arg(required = true)]
    input: Vec<String>,

    /// Directory for the report file (default: current directory)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Report format
    #[arg(short, long, value_enum, default_value = "csv")]
    format: ReportFormat,

    /// Documents processed concurrently per batch (overrides config)
    #[arg(short = 'j', long)]
    jobs: Option<usize>,

    /// Only print the table, do not write a report file
    #[arg(long)]
    no_export: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum ReportFormat {
    /// Spreadsheet-compatible CSV
    Csv,
    /// JSON array of report rows
    Json,
}

impl ReportFormat {
    fn extension(self) -> &'static str {
        match self {
            ReportFormat::Csv => "csv",
            ReportFormat::Json => "json",
        }
    }
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let batch_size = args.jobs.unwrap_or(config.batch.batch_size);
    if batch_size == 0 {
        anyhow::bail!("Batch size must be at least 1");
    }

    let files = collect_pdfs(&args.input)?;
    if files.is_empty() {
        anyhow::bail!("No PDF files found for: {}", args.input.join(" "));
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    let pipeline = Arc::new(DarfPipeline::new(&config)?);
    let ids = Arc::new(RecordIdGenerator::new());

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let work = {
        let pipeline = Arc::clone(&pipeline);
        let ids = Arc::clone(&ids);
        Arc::new(move |path: &Path| process_file(&pipeline, &ids, path))
    };

    let mut records = Vec::new();
    for (index, chunk) in files.chunks(batch_size).enumerate() {
        debug!("Starting batch {} with {} files", index + 1, chunk.len());
        records.extend(run_chunk(chunk, &ids, Arc::clone(&work)).await);
        pb.inc(chunk.len() as u64);
    }
    pb.finish_and_clear();
    debug!("Issued {} record ids for {} files", ids.issued(), files.len());

    sort_by_filename(&mut records);

    output::print_table(&records, &config.report.column_widths);
    output::print_summary(&RunSummary::from_records(&records), start.elapsed());

    if !args.no_export {
        let dir = args.output_dir.unwrap_or_else(|| PathBuf::from("."));
        let name = report_file_name(
            &config.report.file_prefix,
            chrono::Local::now().date_naive(),
            args.format.extension(),
        );
        let report_path = dir.join(name);

        let content = match args.format {
            ReportFormat::Csv => output::records_to_csv(&records)?,
            ReportFormat::Json => output::records_to_json_rows(&records)?,
        };
        output::write_file(&report_path, &content)?;

        println!(
            "{} Report written to {}",
            style("✓").green(),
            report_path.display()
        );
    }

    Ok(())
}

/// Expand patterns and keep only PDF files.
fn collect_pdfs(patterns: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for pattern in patterns {
        for path in glob(pattern)?.filter_map(|r| r.ok()) {
            if !path.is_file() {
                continue;
            }
            if !is_pdf(&path) {
                debug!("Skipping non-PDF file {}", path.display());
                continue;
            }
            if !files.contains(&path) {
                files.push(path);
            }
        }
    }

    Ok(files)
}

/// Run one batch to completion. Records arrive in completion order; a task
/// that dies without returning yields a fatal record for its file.
async fn run_chunk<F>(chunk: &[PathBuf], ids: &RecordIdGenerator, work: Arc<F>) -> Vec<ResultRecord>
where
    F: Fn(&Path) -> Vec<ResultRecord> + Send + Sync + 'static,
{
    let mut set = JoinSet::new();
    let mut names = HashMap::new();
    for path in chunk {
        let work = Arc::clone(&work);
        let task_path = path.clone();
        let handle = set.spawn_blocking(move || work(&task_path));
        names.insert(handle.id(), display_name(path));
    }

    let mut records = Vec::new();
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok(file_records) => records.extend(file_records),
            Err(e) => {
                let filename = names.get(&e.id()).cloned().unwrap_or_default();
                error!("Task for {} failed: {}", filename, e);
                records.push(ResultRecord::fatal(ids, &filename, &e.to_string()));
            }
        }
    }
    records
}

/// Read and process one file. Read failures and panics become a fatal record.
fn process_file(pipeline: &DarfPipeline, ids: &RecordIdGenerator, path: &Path) -> Vec<ResultRecord> {
    let filename = display_name(path);

    let data = match fs::read(path) {
        Ok(data) => data,
        Err(e) => {
            error!("Failed to read {}: {}", path.display(), e);
            return vec![ResultRecord::fatal(ids, &filename, &e.to_string())];
        }
    };

    info!("Processing {}", path.display());
    match panic::catch_unwind(AssertUnwindSafe(|| {
        pipeline.process_document(&filename, &data, ids)
    })) {
        Ok(records) => records,
        Err(payload) => {
            let cause = panic_message(payload.as_ref());
            error!("Processing {} panicked: {}", filename, cause);
            vec![ResultRecord::fatal(ids, &filename, &cause)]
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use darf_core::DarfConfig;

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");

        let payload: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "bang");

        let payload: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(payload.as_ref()), "");
    }

    #[test]
    fn test_unreadable_file_becomes_fatal_record() {
        let pipeline = DarfPipeline::new(&DarfConfig::default()).unwrap();
        let ids = RecordIdGenerator::new();

        let records = process_file(&pipeline, &ids, Path::new("/nonexistent/darf.pdf"));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].filename, "darf.pdf");
        assert_eq!(records[0].code, "ERROR");
    }

    #[tokio::test]
    async fn test_failed_task_becomes_fatal_record() {
        let ids = RecordIdGenerator::new();
        let chunk = vec![PathBuf::from("in/a.pdf"), PathBuf::from("in/b.pdf")];
        let work = Arc::new(|path: &Path| {
            if path.ends_with("b.pdf") {
                panic!("worker lost");
            }
            vec![ResultRecord::codes_not_found(&RecordIdGenerator::new(), "a.pdf", &[])]
        });

        let mut records = run_chunk(&chunk, &ids, work).await;
        records.sort_by(|a, b| a.filename.cmp(&b.filename));

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].filename, "a.pdf");
        assert_eq!(records[1].filename, "b.pdf");
        assert_eq!(records[1].code, "ERROR");
        assert!(records[1].message.as_deref().unwrap().starts_with("Erro fatal: "));
    }

    #[test]
    fn test_collect_pdfs_skips_other_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.pdf"), b"x").unwrap();
        fs::write(dir.path().join("b.PDF"), b"x").unwrap();
        fs::write(dir.path().join("notes.txt"), b"x").unwrap();

        let pattern = format!("{}/*", dir.path().display());
        let mut files = collect_pdfs(&[pattern.clone(), pattern]).unwrap();
        files.sort();

        let names: Vec<String> = files.iter().map(|p| display_name(p)).collect();
        assert_eq!(names, vec!["a.pdf", "b.PDF"]);
    }
}
