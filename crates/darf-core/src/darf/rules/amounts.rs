//! Amount extraction for DARF lines.

use super::patterns::AMOUNT_PATTERN;
use super::{ExtractionMatch, FieldExtractor};

/// Amount field extractor.
///
/// DARF lines print reference numbers before the total, so [`extract`]
/// returns the rightmost amount on the line.
///
/// [`extract`]: FieldExtractor::extract
pub struct AmountExtractor;

impl AmountExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AmountExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for AmountExtractor {
    type Output = ExtractionMatch<f64>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).pop()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        AMOUNT_PATTERN
            .find_iter(text)
            .map(|m| {
                ExtractionMatch::new(parse_brl_amount(m.as_str()), m.as_str())
                    .with_position(m.start(), m.end())
            })
            .collect()
    }
}

/// Parse a Brazilian-formatted amount (e.g. "1.234,56").
///
/// Everything but digits and commas is dropped and the first comma becomes
/// the decimal point. Empty or unparseable input yields 0.
pub fn parse_brl_amount(s: &str) -> f64 {
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',')
        .collect();

    cleaned.replacen(',', ".", 1).parse().unwrap_or(0.0)
}

/// Format an amount in Brazilian style (1.234,56).
pub fn format_brl_amount(amount: f64) -> String {
    let s = format!("{:.2}", amount.abs());
    let (integer_part, decimal_part) = s.split_once('.').unwrap_or((s.as_str(), "00"));

    // Add thousand separators
    let digits: Vec<char> = integer_part.chars().collect();
    let mut formatted = String::new();
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            formatted.push('.');
        }
        formatted.push(*c);
    }

    let sign = if amount < 0.0 && formatted.chars().any(|c| c != '0' && c != '.') {
        "-"
    } else {
        ""
    };
    format!("{sign}{formatted},{decimal_part}")
}

/// Format an amount as Brazilian currency (R$ 1.234,56).
pub fn format_brl_currency(amount: f64) -> String {
    format!("R$ {}", format_brl_amount(amount))
}
