//! Error types for the darf-core library.

use thiserror::Error;

/// Main error type for the darf library.
#[derive(Error, Debug)]
pub enum DarfError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Field extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF loading and content decoding.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// A page content stream could not be read or decoded.
    #[error("failed to read content of page {page}: {reason}")]
    Content { page: u32, reason: String },

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

/// Errors related to code and amount extraction setup.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// A configured target code is unusable.
    #[error("invalid target code: {0:?}")]
    InvalidCode(String),

    /// No target codes were configured.
    #[error("no target codes configured")]
    NoCodes,
}

/// Result type for the darf library.
pub type Result<T> = std::result::Result<T, DarfError>;
