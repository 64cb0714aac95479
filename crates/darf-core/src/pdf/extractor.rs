//! PDF loading and per-page fragment extraction using lopdf.

use lopdf::Document;
use tracing::debug;

use super::content::ContentWalker;
use super::{FragmentSource, PageFragments, PdfProcessor, PositionedFragment, Result};
use crate::error::PdfError;

/// PDF fragment extractor using lopdf.
pub struct PdfExtractor {
    document: Option<Document>,
    fallback_glyph_width: f32,
}

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self {
            document: None,
            fallback_glyph_width: 0.5,
        }
    }

    /// Set the glyph advance (in em) used for fonts without a width table.
    pub fn with_fallback_glyph_width(mut self, width: f32) -> Self {
        self.fallback_glyph_width = width;
        self
    }

    fn document(&self) -> Result<&Document> {
        self.document
            .as_ref()
            .ok_or_else(|| PdfError::Parse("No document loaded".to_string()))
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfProcessor for PdfExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Handle PDFs with empty password encryption
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        self.document = Some(doc);
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    fn page_fragments(&self, page: u32) -> Result<Vec<PositionedFragment>> {
        let doc = self.document()?;
        let pages = doc.get_pages();
        let page_id = *pages.get(&page).ok_or(PdfError::InvalidPage(page))?;

        let content = doc.get_page_content(page_id).map_err(|e| PdfError::Content {
            page,
            reason: e.to_string(),
        })?;
        let content = lopdf::content::Content::decode(&content).map_err(|e| PdfError::Content {
            page,
            reason: e.to_string(),
        })?;

        let fragments = ContentWalker::new(doc, page_id, self.fallback_glyph_width)
            .walk(&content.operations);

        debug!("Page {}: {} text fragments", page, fragments.len());
        Ok(fragments)
    }
}

/// [`FragmentSource`] that reads documents with [`PdfExtractor`].
#[derive(Debug, Clone)]
pub struct LopdfSource {
    fallback_glyph_width: f32,
}

impl LopdfSource {
    pub fn new(fallback_glyph_width: f32) -> Self {
        Self { fallback_glyph_width }
    }
}

impl Default for LopdfSource {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl FragmentSource for LopdfSource {
    fn read_pages(&self, data: &[u8]) -> Result<Vec<PageFragments>> {
        let mut extractor = PdfExtractor::new().with_fallback_glyph_width(self.fallback_glyph_width);
        extractor.load(data)?;
        extractor.extract_pages()
    }
}
