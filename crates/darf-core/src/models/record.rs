//! Result records produced for every processed document.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Code reported when a document contains none of the target codes.
pub const CODE_NOT_APPLICABLE: &str = "N/A";

/// Code reported when a document could not be loaded or read.
pub const CODE_FATAL: &str = "ERROR";

/// Message attached to a code found without a monetary amount.
pub const MSG_AMOUNT_NOT_FOUND: &str = "Valor não identificado na linha.";

/// Message attached to a document without any target code.
pub const MSG_CODES_NOT_FOUND: &str = "Códigos não encontrados.";

/// Prefix of the message attached to a fatal document error.
pub const MSG_FATAL_PREFIX: &str = "Erro fatal";

/// Outcome classification of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    /// Code and amount were both extracted.
    Success,
    /// Code found but the amount needs manual review.
    Warning,
    /// The document yielded nothing usable.
    Error,
}

impl RecordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Success => "success",
            RecordStatus::Warning => "warning",
            RecordStatus::Error => "error",
        }
    }
}

impl std::fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One extracted code/amount pair, or one document-level failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRecord {
    /// Unique within a processing run.
    pub id: String,
    /// Source document name.
    pub filename: String,
    /// Matched target code, or a sentinel for document failures.
    pub code: String,
    /// Parsed amount, 0 when none could be determined.
    pub value: f64,
    /// Normalized line that triggered the match.
    pub raw_line: String,
    /// Outcome classification.
    pub status: RecordStatus,
    /// Explanation for warnings and errors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Every reconstructed line of the document, kept for review of non-success records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_text: Option<Vec<String>>,
}

impl ResultRecord {
    /// A code matched with its amount.
    pub fn success(
        ids: &RecordIdGenerator,
        filename: &str,
        code: &str,
        value: f64,
        raw_line: &str,
    ) -> Self {
        Self {
            id: ids.next_id(filename, &[code]),
            filename: filename.to_string(),
            code: code.to_string(),
            value,
            raw_line: raw_line.to_string(),
            status: RecordStatus::Success,
            message: None,
            debug_text: None,
        }
    }

    /// A code matched but no amount was found on its line.
    pub fn amount_missing(
        ids: &RecordIdGenerator,
        filename: &str,
        code: &str,
        raw_line: &str,
        debug_lines: &[String],
    ) -> Self {
        Self {
            id: ids.next_id(filename, &[code, "warning"]),
            filename: filename.to_string(),
            code: code.to_string(),
            value: 0.0,
            raw_line: raw_line.to_string(),
            status: RecordStatus::Warning,
            message: Some(MSG_AMOUNT_NOT_FOUND.to_string()),
            debug_text: Some(debug_lines.to_vec()),
        }
    }

    /// No target code matched anywhere in the document.
    pub fn codes_not_found(ids: &RecordIdGenerator, filename: &str, debug_lines: &[String]) -> Self {
        Self {
            id: ids.next_id(filename, &["error"]),
            filename: filename.to_string(),
            code: CODE_NOT_APPLICABLE.to_string(),
            value: 0.0,
            raw_line: String::new(),
            status: RecordStatus::Error,
            message: Some(MSG_CODES_NOT_FOUND.to_string()),
            debug_text: Some(debug_lines.to_vec()),
        }
    }

    /// The document could not be loaded or its text could not be read.
    pub fn fatal(ids: &RecordIdGenerator, filename: &str, cause: &str) -> Self {
        let cause = if cause.is_empty() { "Desconhecido" } else { cause };
        Self {
            id: ids.next_id(filename, &["fatal"]),
            filename: filename.to_string(),
            code: CODE_FATAL.to_string(),
            value: 0.0,
            raw_line: String::new(),
            status: RecordStatus::Error,
            message: Some(format!("{MSG_FATAL_PREFIX}: {cause}")),
            debug_text: Some(Vec::new()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == RecordStatus::Success
    }
}

/// Issues run-unique record ids.
///
/// Share one generator across every document of a run, including documents
/// processed concurrently; the sequence number alone never repeats.
#[derive(Debug, Default)]
pub struct RecordIdGenerator {
    next: AtomicU64,
}

impl RecordIdGenerator {
    pub const fn new() -> Self {
        Self {
            next: AtomicU64::new(0),
        }
    }

    /// Build `{filename}-{parts...}-{seq}`.
    pub fn next_id(&self, filename: &str, parts: &[&str]) -> String {
        let seq = self.next.fetch_add(1, Ordering::Relaxed);
        let mut id = filename.to_string();
        for part in parts {
            id.push('-');
            id.push_str(part);
        }
        id.push('-');
        id.push_str(&seq.to_string());
        id
    }

    /// Number of ids issued so far.
    pub fn issued(&self) -> u64 {
        self.next.load(Ordering::Relaxed)
    }
}
