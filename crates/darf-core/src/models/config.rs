//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};

use crate::darf::TaxCode;
use crate::error::{DarfError, ExtractionError};

/// Main configuration for the darf pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DarfConfig {
    /// Line reconstruction configuration.
    pub layout: LayoutConfig,

    /// Code and amount extraction configuration.
    pub extraction: ExtractionConfig,

    /// Batch processing configuration.
    pub batch: BatchConfig,

    /// Report export configuration.
    pub report: ReportConfig,
}

/// Geometric thresholds for turning positioned fragments into lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Maximum baseline difference (page units) for two fragments to share a line.
    pub line_tolerance: f32,

    /// Horizontal gap (page units) above which a space is inserted between fragments.
    pub gap_threshold: f32,

    /// Glyph advance in em used when a font carries no width table.
    pub fallback_glyph_width: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            line_tolerance: 4.0,
            gap_threshold: 4.0,
            fallback_glyph_width: 0.5,
        }
    }
}

/// Code and amount extraction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Codes searched at the start of each line, tested in this order.
    pub target_codes: Vec<String>,

    /// Stop at the first matching code on a line instead of testing every code.
    pub one_code_per_line: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            target_codes: TaxCode::ALL.iter().map(|c| c.code().to_string()).collect(),
            one_code_per_line: false,
        }
    }
}

/// Batch processing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Number of documents processed concurrently before waiting for the batch.
    pub batch_size: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { batch_size: 10 }
    }
}

/// Report export configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Report file name prefix; the current date and extension are appended.
    pub file_prefix: String,

    /// Display widths of the four report columns.
    pub column_widths: [usize; 4],
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            file_prefix: "Relatorio_DARFs".to_string(),
            column_widths: crate::report::DEFAULT_COLUMN_WIDTHS,
        }
    }
}

impl DarfConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }

    /// Check that the configuration can drive an extraction run.
    pub fn validate(&self) -> Result<(), DarfError> {
        if self.extraction.target_codes.is_empty() {
            return Err(ExtractionError::NoCodes.into());
        }
        for code in &self.extraction.target_codes {
            if code.is_empty() || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(ExtractionError::InvalidCode(code.clone()).into());
            }
        }

        let thresholds = [
            ("layout.line_tolerance", self.layout.line_tolerance),
            ("layout.gap_threshold", self.layout.gap_threshold),
            ("layout.fallback_glyph_width", self.layout.fallback_glyph_width),
        ];
        for (name, value) in thresholds {
            if !value.is_finite() || value < 0.0 {
                return Err(DarfError::Config(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }

        if self.batch.batch_size == 0 {
            return Err(DarfError::Config("batch.batch_size must be at least 1".to_string()));
        }

        Ok(())
    }
}
