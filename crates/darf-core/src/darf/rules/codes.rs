//! Withholding code matching at the start of a line.

use serde::{Deserialize, Serialize};

use super::patterns::WHITESPACE_RUN;

/// Withholding codes searched for by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaxCode {
    /// 5952 - CSLL/PIS/COFINS withheld on services.
    CsllPisCofins,
    /// 1162 - IRRF withheld from legal entities.
    IrrfPj,
    /// 1708 - IRRF on professional services.
    Irrf1708,
}

impl TaxCode {
    /// Default search order.
    pub const ALL: [TaxCode; 3] = [TaxCode::CsllPisCofins, TaxCode::IrrfPj, TaxCode::Irrf1708];

    pub fn code(&self) -> &'static str {
        match self {
            TaxCode::CsllPisCofins => "5952",
            TaxCode::IrrfPj => "1162",
            TaxCode::Irrf1708 => "1708",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            TaxCode::CsllPisCofins => "CSLL/PIS/COFINS",
            TaxCode::IrrfPj => "IRRF PJ",
            TaxCode::Irrf1708 => "IRRF 1708",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.code() == code)
    }
}

impl std::fmt::Display for TaxCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.code(), self.description())
    }
}

/// Collapse whitespace runs to one space and trim.
pub fn normalize_line(line: &str) -> String {
    WHITESPACE_RUN.replace_all(line, " ").trim().to_string()
}

/// Whether `line` starts with `code` as a whole token.
///
/// The code must be followed by the end of the line or a character outside
/// `[A-Za-z0-9_]`, so "1162" never matches inside "11621".
pub fn starts_with_code(line: &str, code: &str) -> bool {
    if code.is_empty() {
        return false;
    }
    match line.trim_start().strip_prefix(code) {
        Some(rest) => rest
            .chars()
            .next()
            .is_none_or(|c| !(c.is_ascii_alphanumeric() || c == '_')),
        None => false,
    }
}
