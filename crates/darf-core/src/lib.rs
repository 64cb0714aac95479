//! Core library for DARF withholding extraction.
//!
//! This crate provides:
//! - PDF text fragment extraction with page positions (lopdf)
//! - Line reconstruction from unordered positioned fragments
//! - Tax code matching and Brazilian amount extraction
//! - Result records, report rows and natural filename ordering

pub mod darf;
pub mod error;
pub mod layout;
pub mod models;
pub mod pdf;
pub mod pipeline;
pub mod report;

pub use darf::{DarfParser, TaxCode};
pub use error::{DarfError, Result};
pub use layout::LineReconstructor;
pub use models::config::DarfConfig;
pub use models::record::{RecordIdGenerator, RecordStatus, ResultRecord};
pub use pdf::{FragmentSource, LopdfSource, PageFragments, PdfExtractor, PdfProcessor, PositionedFragment};
pub use pipeline::{is_pdf, DarfPipeline};
pub use report::{natural_cmp, sort_by_filename, ReportRow, RunSummary};
