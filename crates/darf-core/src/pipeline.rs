//! End-to-end processing of one document: fragments, lines, records.

use std::path::Path;

use tracing::{debug, error, info};

use crate::darf::DarfParser;
use crate::error::Result;
use crate::layout::LineReconstructor;
use crate::models::config::DarfConfig;
use crate::models::record::{RecordIdGenerator, ResultRecord};
use crate::pdf::{FragmentSource, LopdfSource};

/// Whether a path names a PDF document. Other inputs are skipped.
pub fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

/// Document pipeline. Holds no per-document state and can be shared
/// between threads.
pub struct DarfPipeline<S = LopdfSource> {
    source: S,
    reconstructor: LineReconstructor,
    parser: DarfParser,
}

impl DarfPipeline<LopdfSource> {
    /// Build a lopdf-backed pipeline from configuration.
    pub fn new(config: &DarfConfig) -> Result<Self> {
        Self::with_source(
            config,
            LopdfSource::new(config.layout.fallback_glyph_width),
        )
    }
}

impl<S: FragmentSource> DarfPipeline<S> {
    /// Build a pipeline reading documents through `source`.
    pub fn with_source(config: &DarfConfig, source: S) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            source,
            reconstructor: LineReconstructor::from_config(&config.layout),
            parser: DarfParser::from_config(&config.extraction)?,
        })
    }

    pub fn parser(&self) -> &DarfParser {
        &self.parser
    }

    /// Read a document and rebuild its text lines.
    pub fn reconstruct(&self, data: &[u8]) -> Result<Vec<String>> {
        let pages = self.source.read_pages(data)?;
        let fragment_count: usize = pages.iter().map(|p| p.fragments.len()).sum();
        debug!("Read {} fragments from {} pages", fragment_count, pages.len());
        if fragment_count == 0 {
            debug!("No embedded text; scanned documents are not supported");
        }
        Ok(self.reconstructor.reconstruct(&pages))
    }

    /// Process one document. Never fails: load errors become one `ERROR` record.
    pub fn process_document(
        &self,
        filename: &str,
        data: &[u8],
        ids: &RecordIdGenerator,
    ) -> Vec<ResultRecord> {
        let lines = match self.reconstruct(data) {
            Ok(lines) => lines,
            Err(e) => {
                error!("Error parsing {}: {}", filename, e);
                return vec![ResultRecord::fatal(ids, filename, &e.to_string())];
            }
        };

        let records = self.parser.parse(filename, &lines, ids);
        info!(
            "{}: {} lines, {} records ({} ok)",
            filename,
            lines.len(),
            records.len(),
            records.iter().filter(|r| r.is_success()).count()
        );
        records
    }
}
