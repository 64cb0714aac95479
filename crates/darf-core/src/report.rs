//! Presentation helpers: filename ordering, flat report rows and run totals.

use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::record::{RecordStatus, ResultRecord};

/// Report column titles.
pub const REPORT_HEADERS: [&str; 4] = [
    "Nome do Arquivo",
    "Código da Retenção",
    "Valor da Retenção",
    "Status",
];

/// Display widths of the report columns, in characters.
pub const DEFAULT_COLUMN_WIDTHS: [usize; 4] = [40, 20, 20, 50];

/// Compare strings the way people sort file names: digit runs by numeric
/// value, letters ignoring case and accents ("doc2" < "doc10", "Ação" = "acao").
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();

    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => break,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) if l.is_ascii_digit() && r.is_ascii_digit() => {
                let l_run = take_digits(&mut left);
                let r_run = take_digits(&mut right);
                let ord = cmp_digit_runs(&l_run, &r_run);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(l), Some(r)) => {
                let ord = base_letter(l).cmp(&base_letter(r));
                if ord != Ordering::Equal {
                    return ord;
                }
                left.next();
                right.next();
            }
        }
    }

    // Equal under natural rules; fall back to a total order
    a.cmp(b)
}

/// Lowercase letter with Latin diacritics removed.
fn base_letter(c: char) -> char {
    let lower = c.to_lowercase().next().unwrap_or(c);
    match lower {
        'á' | 'à' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        'ý' | 'ÿ' => 'y',
        other => other,
    }
}

fn take_digits(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut run = String::new();
    while let Some(c) = chars.next_if(|c| c.is_ascii_digit()) {
        run.push(c);
    }
    run
}

fn cmp_digit_runs(a: &str, b: &str) -> Ordering {
    let a_trimmed = a.trim_start_matches('0');
    let b_trimmed = b.trim_start_matches('0');
    a_trimmed
        .len()
        .cmp(&b_trimmed.len())
        .then_with(|| a_trimmed.cmp(b_trimmed))
}

/// Stable sort of records by natural filename order.
pub fn sort_by_filename(records: &mut [ResultRecord]) {
    records.sort_by(|a, b| natural_cmp(&a.filename, &b.filename));
}

/// One flat row of the exported report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    #[serde(rename = "Nome do Arquivo")]
    pub file_name: String,
    #[serde(rename = "Código da Retenção")]
    pub code: String,
    #[serde(rename = "Valor da Retenção")]
    pub value: f64,
    /// "OK" for success, otherwise the record message.
    #[serde(rename = "Status")]
    pub status: String,
}

impl From<&ResultRecord> for ReportRow {
    fn from(record: &ResultRecord) -> Self {
        let status = match record.status {
            RecordStatus::Success => "OK".to_string(),
            _ => record.message.clone().unwrap_or_else(|| "Erro".to_string()),
        };
        Self {
            file_name: record.filename.clone(),
            code: record.code.clone(),
            value: record.value,
            status,
        }
    }
}

/// Report rows in natural filename order.
pub fn report_rows(records: &[ResultRecord]) -> Vec<ReportRow> {
    let mut sorted = records.to_vec();
    sort_by_filename(&mut sorted);
    sorted.iter().map(ReportRow::from).collect()
}

/// Report file name for a run, e.g. `Relatorio_DARFs_2024-05-31.csv`.
pub fn report_file_name(prefix: &str, date: NaiveDate, extension: &str) -> String {
    format!("{}_{}.{}", prefix, date.format("%Y-%m-%d"), extension)
}

/// Totals over a set of records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Number of records.
    pub processed: usize,
    /// Records with status success.
    pub success: usize,
    /// Records that need attention (warnings and errors).
    pub attention: usize,
    /// Sum of successful amounts.
    pub total_value: f64,
}

impl RunSummary {
    pub fn from_records(records: &[ResultRecord]) -> Self {
        records.iter().fold(Self::default(), |mut summary, record| {
            summary.processed += 1;
            if record.is_success() {
                summary.success += 1;
                summary.total_value += record.value;
            } else {
                summary.attention += 1;
            }
            summary
        })
    }
}
