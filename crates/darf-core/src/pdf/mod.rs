//! PDF processing module.
//!
//! Produces the raw positioned text fragments of every page. Fragments carry
//! no line or word structure; see [`crate::layout`] for that.

mod content;
mod extractor;

pub use extractor::{LopdfSource, PdfExtractor};

use serde::{Deserialize, Serialize};

use crate::error::PdfError;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// A run of glyphs placed on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedFragment {
    /// Text content, possibly part of a word.
    pub text: String,
    /// Baseline origin X in page space.
    pub x: f32,
    /// Baseline origin Y in page space (grows upwards).
    pub y: f32,
    /// Horizontal extent in page space.
    pub width: f32,
}

impl PositionedFragment {
    pub fn new(text: impl Into<String>, x: f32, y: f32, width: f32) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            width,
        }
    }

    /// X coordinate where the fragment ends.
    pub fn end_x(&self) -> f32 {
        self.x + self.width
    }
}

/// Fragments of one page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageFragments {
    /// Page number (1-indexed).
    pub number: u32,
    /// Fragments in content stream order.
    pub fragments: Vec<PositionedFragment>,
}

/// Trait for PDF processing implementations.
pub trait PdfProcessor {
    /// Load a PDF from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages in the PDF.
    fn page_count(&self) -> u32;

    /// Extract the positioned fragments of one page.
    fn page_fragments(&self, page: u32) -> Result<Vec<PositionedFragment>>;

    /// Extract every page in page order.
    fn extract_pages(&self) -> Result<Vec<PageFragments>> {
        (1..=self.page_count())
            .map(|number| {
                Ok(PageFragments {
                    number,
                    fragments: self.page_fragments(number)?,
                })
            })
            .collect()
    }
}

/// Turns raw document bytes into per-page fragments.
///
/// The pipeline owns one source and calls it once per document, possibly from
/// several threads.
pub trait FragmentSource: Send + Sync {
    fn read_pages(&self, data: &[u8]) -> Result<Vec<PageFragments>>;
}
