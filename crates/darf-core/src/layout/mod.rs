//! Line reconstruction from positioned text fragments.
//!
//! PDF pages store text as unordered glyph runs with a baseline origin and a
//! width. [`LineReconstructor`] rebuilds reading-order lines: fragments whose
//! baselines lie within `line_tolerance` of the first fragment of a row share
//! that row, rows go top to bottom, fragments within a row go left to right,
//! and a space is inserted wherever the horizontal gap exceeds
//! `gap_threshold`.

use tracing::{debug, trace};

use crate::models::config::LayoutConfig;
use crate::pdf::{PageFragments, PositionedFragment};

/// Rebuilds ordered text lines from per-page fragments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineReconstructor {
    line_tolerance: f32,
    gap_threshold: f32,
}

/// One visual row of a page.
struct Row<'a> {
    /// Baseline of the first (topmost) fragment assigned to the row.
    anchor_y: f32,
    fragments: Vec<&'a PositionedFragment>,
}

impl LineReconstructor {
    /// Create a reconstructor with the default 4-unit thresholds.
    pub fn new() -> Self {
        Self::from_config(&LayoutConfig::default())
    }

    pub fn from_config(config: &LayoutConfig) -> Self {
        Self {
            line_tolerance: config.line_tolerance,
            gap_threshold: config.gap_threshold,
        }
    }

    /// Set the maximum baseline difference for fragments on one line.
    pub fn with_line_tolerance(mut self, tolerance: f32) -> Self {
        self.line_tolerance = tolerance;
        self
    }

    /// Set the horizontal gap above which a space is inserted.
    pub fn with_gap_threshold(mut self, threshold: f32) -> Self {
        self.gap_threshold = threshold;
        self
    }

    /// Lines of every page, page 1 first. Lines never span pages.
    pub fn reconstruct(&self, pages: &[PageFragments]) -> Vec<String> {
        let mut ordered: Vec<&PageFragments> = pages.iter().collect();
        ordered.sort_by_key(|p| p.number);

        let lines: Vec<String> = ordered
            .into_iter()
            .flat_map(|page| {
                let lines = self.page_lines(&page.fragments);
                trace!("Page {}: {} lines", page.number, lines.len());
                lines
            })
            .collect();

        debug!("Reconstructed {} lines from {} pages", lines.len(), pages.len());
        lines
    }

    /// Non-blank trimmed lines of one page in reading order.
    pub fn page_lines(&self, fragments: &[PositionedFragment]) -> Vec<String> {
        let mut sorted: Vec<&PositionedFragment> = fragments.iter().collect();
        sorted.sort_by(|a, b| b.y.total_cmp(&a.y).then(a.x.total_cmp(&b.x)));

        let rows = sorted.into_iter().fold(Vec::<Row>::new(), |mut rows, fragment| {
            match rows.last_mut() {
                Some(row) if (row.anchor_y - fragment.y).abs() <= self.line_tolerance => {
                    row.fragments.push(fragment);
                }
                _ => rows.push(Row {
                    anchor_y: fragment.y,
                    fragments: vec![fragment],
                }),
            }
            rows
        });

        rows.into_iter()
            .filter_map(|mut row| {
                row.fragments.sort_by(|a, b| a.x.total_cmp(&b.x));
                let text = self.join_row(&row.fragments);
                let trimmed = text.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            })
            .collect()
    }

    /// Concatenate a row left to right, spacing fragments that are apart.
    fn join_row(&self, fragments: &[&PositionedFragment]) -> String {
        let mut text = String::new();
        let mut previous_end: Option<f32> = None;

        for fragment in fragments {
            if let Some(end) = previous_end {
                if fragment.x - end > self.gap_threshold {
                    text.push(' ');
                }
            }
            text.push_str(&fragment.text);
            previous_end = Some(fragment.end_x());
        }

        text
    }
}

impl Default for LineReconstructor {
    fn default() -> Self {
        Self::new()
    }
}
