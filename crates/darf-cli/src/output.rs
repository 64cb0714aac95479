//! Rendering of records for the terminal and report files.

use std::fs;
use std::path::Path;
use std::time::Duration;

use console::style;

use darf_core::darf::rules::format_brl_currency;
use darf_core::report::{report_rows, REPORT_HEADERS};
use darf_core::{RecordStatus, ReportRow, ResultRecord, RunSummary, TaxCode};

/// Report rows as CSV, header line included even without rows.
pub fn records_to_csv(records: &[ResultRecord]) -> anyhow::Result<String> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(vec![]);

    wtr.write_record(REPORT_HEADERS)?;
    for row in report_rows(records) {
        wtr.serialize(row)?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

/// Report rows as a pretty JSON array.
pub fn records_to_json_rows(records: &[ResultRecord]) -> anyhow::Result<String> {
    let rows: Vec<ReportRow> = report_rows(records);
    Ok(serde_json::to_string_pretty(&rows)?)
}

/// Write `content` to `path`, creating the parent directory.
pub fn write_file(path: &Path, content: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}

/// One record per line, for reading in a terminal.
pub fn records_to_text(records: &[ResultRecord]) -> String {
    let mut output = String::new();

    for record in records {
        output.push_str(&format!(
            "{} | {} | {} | {}\n",
            record.filename,
            code_label(&record.code),
            format_brl_currency(record.value),
            status_label(record)
        ));
        if record.status != RecordStatus::Success && !record.raw_line.is_empty() {
            output.push_str(&format!("    line: {}\n", record.raw_line));
        }
    }

    output
}

/// Known codes carry their description, e.g. "1162 (IRRF PJ)".
pub fn code_label(code: &str) -> String {
    TaxCode::from_code(code)
        .map(|c| c.to_string())
        .unwrap_or_else(|| code.to_string())
}

fn status_label(record: &ResultRecord) -> String {
    ReportRow::from(record).status
}

/// Fit `text` into exactly `width` characters.
fn fit(text: &str, width: usize) -> String {
    let count = text.chars().count();
    if count <= width {
        format!("{}{}", text, " ".repeat(width - count))
    } else if width <= 1 {
        text.chars().take(width).collect()
    } else {
        let mut cut: String = text.chars().take(width - 1).collect();
        cut.push('…');
        cut
    }
}

/// Print the four report columns with fixed widths, in natural filename order.
pub fn print_table(records: &[ResultRecord], widths: &[usize; 4]) {
    let header: Vec<String> = REPORT_HEADERS
        .iter()
        .zip(widths)
        .map(|(h, w)| fit(h, *w))
        .collect();
    println!("{}", style(header.join(" ")).bold());

    let total_width = widths.iter().sum::<usize>() + widths.len() - 1;
    println!("{}", "-".repeat(total_width));

    for row in report_rows(records) {
        let value = fit(&format_brl_currency(row.value), widths[2]);
        let status = fit(&row.status, widths[3]);
        let status = if row.status == "OK" {
            style(status).green()
        } else {
            style(status).yellow()
        };

        println!(
            "{} {} {} {}",
            fit(&row.file_name, widths[0]),
            fit(&row.code, widths[1]),
            value,
            status
        );
    }
}

/// Print run totals.
pub fn print_summary(summary: &RunSummary, elapsed: Duration) {
    println!();
    println!(
        "{} Processed {} records in {:?}",
        style("✓").green(),
        summary.processed,
        elapsed
    );
    println!(
        "   {} successful, {} need attention",
        style(summary.success).green(),
        style(summary.attention).yellow()
    );
    println!(
        "   Total withheld: {}",
        style(format_brl_currency(summary.total_value)).bold()
    );
}
