//! WASM bindings for DARF withholding extraction.
//!
//! This crate provides WebAssembly bindings for use in browsers and Node.js.

use std::cmp::Ordering;

use wasm_bindgen::prelude::*;

use darf_core::models::config::DarfConfig;
use darf_core::report::report_rows;
use darf_core::{natural_cmp, DarfPipeline, RecordIdGenerator, ResultRecord};

/// Ids for records produced outside an analyzer instance.
static SHARED_IDS: RecordIdGenerator = RecordIdGenerator::new();

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn to_js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Extract withholding records from PDF bytes with the default codes.
///
/// Never fails on bad documents: those come back as a single `ERROR` record.
#[wasm_bindgen]
pub fn process_pdf(filename: &str, bytes: &[u8]) -> Result<JsValue, JsValue> {
    let pipeline = DarfPipeline::new(&DarfConfig::default()).map_err(to_js_error)?;
    let records = pipeline.process_document(filename, bytes, &SHARED_IDS);
    serde_wasm_bindgen::to_value(&records).map_err(to_js_error)
}

/// Parse a Brazilian-formatted amount (e.g., "1.234,56"). Returns 0 when unparseable.
#[wasm_bindgen]
pub fn parse_brl_amount(amount: &str) -> f64 {
    darf_core::darf::rules::parse_brl_amount(amount)
}

/// Format an amount as Brazilian currency (e.g., "R$ 1.234,56").
#[wasm_bindgen]
pub fn format_brl_currency(amount: f64) -> String {
    darf_core::darf::rules::format_brl_currency(amount)
}

/// Natural filename comparison usable as an `Array.prototype.sort` callback.
#[wasm_bindgen]
pub fn natural_compare(a: &str, b: &str) -> i32 {
    match natural_cmp(a, b) {
        Ordering::Less => -1,
        Ordering::Equal => 0,
        Ordering::Greater => 1,
    }
}

/// DARF analyzer class for browser use.
///
/// Record ids stay unique across every `process` call of one instance.
#[wasm_bindgen]
pub struct DarfAnalyzer {
    config: DarfConfig,
    pipeline: DarfPipeline,
    ids: RecordIdGenerator,
}

#[wasm_bindgen]
impl DarfAnalyzer {
    /// Create an analyzer searching the default codes.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<DarfAnalyzer, JsValue> {
        let config = DarfConfig::default();
        let pipeline = DarfPipeline::new(&config).map_err(to_js_error)?;
        Ok(Self {
            config,
            pipeline,
            ids: RecordIdGenerator::new(),
        })
    }

    /// Replace the searched codes, keeping their order.
    #[wasm_bindgen]
    pub fn set_target_codes(&mut self, codes: Vec<String>) -> Result<(), JsValue> {
        let mut config = self.config.clone();
        config.extraction.target_codes = codes;
        self.pipeline = DarfPipeline::new(&config).map_err(to_js_error)?;
        self.config = config;
        Ok(())
    }

    /// Allow at most one code per line.
    #[wasm_bindgen]
    pub fn set_one_code_per_line(&mut self, enabled: bool) -> Result<(), JsValue> {
        let mut config = self.config.clone();
        config.extraction.one_code_per_line = enabled;
        self.pipeline = DarfPipeline::new(&config).map_err(to_js_error)?;
        self.config = config;
        Ok(())
    }

    /// Codes currently searched.
    #[wasm_bindgen]
    pub fn target_codes(&self) -> Vec<String> {
        self.config.extraction.target_codes.clone()
    }

    /// Extract records from one PDF.
    #[wasm_bindgen]
    pub fn process(&self, filename: &str, bytes: &[u8]) -> Result<JsValue, JsValue> {
        let records = self.pipeline.process_document(filename, bytes, &self.ids);
        let flagged = records.iter().filter(|r| !r.is_success()).count();
        if flagged > 0 {
            web_sys::console::warn_1(&JsValue::from_str(&format!(
                "{}: {} of {} records need review",
                filename,
                flagged,
                records.len()
            )));
        }
        serde_wasm_bindgen::to_value(&records).map_err(to_js_error)
    }

    /// Reconstructed text lines of one PDF.
    #[wasm_bindgen]
    pub fn lines(&self, bytes: &[u8]) -> Result<js_sys::Array, JsValue> {
        let lines = self.pipeline.reconstruct(bytes).map_err(to_js_error)?;
        Ok(lines.iter().map(|l| JsValue::from_str(l)).collect())
    }

    /// Flatten records into report rows in natural filename order.
    #[wasm_bindgen]
    pub fn report_rows(&self, records: JsValue) -> Result<JsValue, JsValue> {
        let records: Vec<ResultRecord> =
            serde_wasm_bindgen::from_value(records).map_err(to_js_error)?;
        serde_wasm_bindgen::to_value(&report_rows(&records)).map_err(to_js_error)
    }
}
