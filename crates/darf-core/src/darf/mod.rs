//! DARF field extraction module.

mod parser;
pub mod rules;

pub use parser::DarfParser;
pub use rules::codes::TaxCode;
