//! DARF parser pairing withholding codes with the amount on their line.

use std::time::Instant;

use tracing::{debug, warn};

use crate::error::{ExtractionError, Result};
use crate::models::config::ExtractionConfig;
use crate::models::record::ResultRecord;
use crate::models::record::RecordIdGenerator;

use super::rules::{normalize_line, starts_with_code, AmountExtractor, FieldExtractor};

/// Scans reconstructed lines for target codes and their amounts.
pub struct DarfParser {
    /// Codes tested against every line, in this order.
    target_codes: Vec<String>,
    /// Stop at the first code that matches a line.
    one_code_per_line: bool,
    amounts: AmountExtractor,
}

impl DarfParser {
    /// Create a parser for the given codes.
    pub fn new<I, S>(target_codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            target_codes: target_codes.into_iter().map(Into::into).collect(),
            one_code_per_line: false,
            amounts: AmountExtractor::new(),
        }
    }

    /// Create a parser from configuration, rejecting unusable codes.
    pub fn from_config(config: &ExtractionConfig) -> Result<Self> {
        if config.target_codes.is_empty() {
            return Err(ExtractionError::NoCodes.into());
        }
        if let Some(bad) = config
            .target_codes
            .iter()
            .find(|c| c.is_empty() || !c.chars().all(|ch| ch.is_ascii_alphanumeric()))
        {
            return Err(ExtractionError::InvalidCode(bad.clone()).into());
        }

        Ok(Self::new(config.target_codes.iter().cloned())
            .with_one_code_per_line(config.one_code_per_line))
    }

    /// Assign each line to at most one code.
    pub fn with_one_code_per_line(mut self, enabled: bool) -> Self {
        self.one_code_per_line = enabled;
        self
    }

    pub fn target_codes(&self) -> &[String] {
        &self.target_codes
    }

    /// Produce the records of one document from its reconstructed lines.
    ///
    /// Always returns at least one record: a document without any code match
    /// yields a single `N/A` error carrying every line for review.
    pub fn parse(&self, filename: &str, lines: &[String], ids: &RecordIdGenerator) -> Vec<ResultRecord> {
        let start = Instant::now();
        let mut records = Vec::new();

        for line in lines {
            let clean_line = normalize_line(line);

            for code in &self.target_codes {
                if !starts_with_code(&clean_line, code) {
                    continue;
                }

                match self.amounts.extract(&clean_line) {
                    Some(total) => {
                        debug!("{}: code {} -> {} ({:?})", filename, code, total.value, total.source);
                        records.push(ResultRecord::success(
                            ids,
                            filename,
                            code,
                            total.value,
                            &clean_line,
                        ));
                    }
                    None => {
                        warn!("{}: code {} without amount on line {:?}", filename, code, clean_line);
                        records.push(ResultRecord::amount_missing(
                            ids,
                            filename,
                            code,
                            &clean_line,
                            lines,
                        ));
                    }
                }

                if self.one_code_per_line {
                    break;
                }
            }
        }

        if records.is_empty() {
            warn!("{}: none of {:?} found in {} lines", filename, self.target_codes, lines.len());
            records.push(ResultRecord::codes_not_found(ids, filename, lines));
        }

        debug!(
            "{}: {} records in {}ms",
            filename,
            records.len(),
            start.elapsed().as_millis()
        );
        records
    }
}

impl Default for DarfParser {
    fn default() -> Self {
        Self::new(ExtractionConfig::default().target_codes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::{RecordStatus, CODE_NOT_APPLICABLE, MSG_AMOUNT_NOT_FOUND, MSG_CODES_NOT_FOUND};
    use pretty_assertions::assert_eq;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_darf_lines() {
        let doc = lines(&[
            "MINISTÉRIO DA FAZENDA",
            "Documento de Arrecadação de Receitas Federais",
            "5952   Retenção CSLL/PIS/COFINS 1.234,56",
            "1162 Retenção 9.952,00",
            "1708 IRRF 12/2024",
            "Total a pagar 11.186,56",
        ]);

        let ids = RecordIdGenerator::new();
        let records = DarfParser::default().parse("darf.pdf", &doc, &ids);

        assert_eq!(records.len(), 3);

        assert_eq!(records[0].code, "5952");
        assert_eq!(records[0].status, RecordStatus::Success);
        assert_eq!(records[0].value, 1234.56);
        assert_eq!(records[0].raw_line, "5952 Retenção CSLL/PIS/COFINS 1.234,56");
        assert_eq!(records[0].debug_text, None);

        assert_eq!(records[1].code, "1162");
        assert_eq!(records[1].value, 9952.0);

        assert_eq!(records[2].code, "1708");
        assert_eq!(records[2].status, RecordStatus::Warning);
        assert_eq!(records[2].value, 0.0);
        assert_eq!(records[2].message.as_deref(), Some(MSG_AMOUNT_NOT_FOUND));
        assert_eq!(records[2].debug_text.as_ref(), Some(&doc));

        assert!(records.iter().all(|r| r.filename == "darf.pdf"));
    }

    #[test]
    fn test_last_amount_is_the_total() {
        let ids = RecordIdGenerator::new();
        let records = DarfParser::default().parse(
            "a.pdf",
            &lines(&["1162 ref 10,00 total 2.500,00"]),
            &ids,
        );
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].value, 2500.0);
    }

    #[test]
    fn test_code_inside_longer_number_does_not_match() {
        let ids = RecordIdGenerator::new();
        let records = DarfParser::default().parse("a.pdf", &lines(&["11621 9952,00"]), &ids);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, RecordStatus::Error);
        assert_eq!(records[0].code, CODE_NOT_APPLICABLE);
        assert_eq!(records[0].message.as_deref(), Some(MSG_CODES_NOT_FOUND));
        assert_eq!(records[0].debug_text, Some(lines(&["11621 9952,00"])));
    }

    #[test]
    fn test_no_match_yields_single_error() {
        let ids = RecordIdGenerator::new();
        let parser = DarfParser::new(["5952", "1162", "1708", "0561"]);
        let records = parser.parse("a.pdf", &lines(&["nothing", "here"]), &ids);
        assert_eq!(records.len(), 1);

        let empty = parser.parse("b.pdf", &[], &ids);
        assert_eq!(empty.len(), 1);
        assert_eq!(empty[0].filename, "b.pdf");
        assert_eq!(empty[0].debug_text, Some(Vec::new()));
    }

    #[test]
    fn test_record_count_matches_code_line_pairs() {
        let doc = lines(&[
            "1162 a 1,00",
            "1162 b",
            "5952 c 3,00",
            "x 1708 4,00",
            "1708 d 5,00",
            "1162 e 6,00",
        ]);
        let ids = RecordIdGenerator::new();
        let records = DarfParser::default().parse("a.pdf", &doc, &ids);

        assert_eq!(records.len(), 5);
        let warnings = records.iter().filter(|r| r.status == RecordStatus::Warning).count();
        assert_eq!(warnings, 1);
        // Codes come out in line order
        let codes: Vec<&str> = records.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, vec!["1162", "1162", "5952", "1708", "1162"]);
    }

    #[test]
    fn test_line_matching_several_codes() {
        let doc = lines(&["12 total 7,00"]);
        let ids = RecordIdGenerator::new();

        let all = DarfParser::new(["12", "12"]).parse("a.pdf", &doc, &ids);
        assert_eq!(all.len(), 2);

        let strict = DarfParser::new(["12", "12"])
            .with_one_code_per_line(true)
            .parse("a.pdf", &doc, &ids);
        assert_eq!(strict.len(), 1);
    }

    #[test]
    fn test_from_config_validates_codes() {
        let mut config = ExtractionConfig::default();
        assert_eq!(DarfParser::from_config(&config).unwrap().target_codes().len(), 3);

        config.target_codes = vec!["1162".into(), "".into()];
        assert!(DarfParser::from_config(&config).is_err());

        config.target_codes.clear();
        assert!(DarfParser::from_config(&config).is_err());
    }
}
