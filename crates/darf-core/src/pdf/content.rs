//! Content stream interpreter that places text show operations on the page.

use std::collections::{BTreeMap, HashMap};

use lopdf::content::Operation;
use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::trace;

use super::PositionedFragment;

/// Affine matrix `[a b c d e f]` in PDF row-vector convention.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix([f32; 6]);

impl Matrix {
    const IDENTITY: Matrix = Matrix([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

    fn translation(tx: f32, ty: f32) -> Self {
        Matrix([1.0, 0.0, 0.0, 1.0, tx, ty])
    }

    /// `self × other`: apply `self` first, then `other`.
    fn then(&self, other: &Matrix) -> Matrix {
        let [a1, b1, c1, d1, e1, f1] = self.0;
        let [a2, b2, c2, d2, e2, f2] = other.0;
        Matrix([
            a1 * a2 + b1 * c2,
            a1 * b2 + b1 * d2,
            c1 * a2 + d1 * c2,
            c1 * b2 + d1 * d2,
            e1 * a2 + f1 * c2 + e2,
            e1 * b2 + f1 * d2 + f2,
        ])
    }

    fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        let [a, b, c, d, e, f] = self.0;
        (x * a + y * c + e, x * b + y * d + f)
    }

    /// Length of a unit step along the baseline after transformation.
    fn horizontal_scale(&self) -> f32 {
        self.0[0].hypot(self.0[1])
    }

    fn from_operands(operands: &[Object]) -> Option<Matrix> {
        if operands.len() < 6 {
            return None;
        }
        let mut m = [0.0f32; 6];
        for (slot, operand) in m.iter_mut().zip(operands) {
            *slot = get_number(operand)?;
        }
        Some(Matrix(m))
    }
}

/// Glyph widths of a simple font, in thousandths of an em.
#[derive(Debug, Clone, Default)]
struct FontMetrics {
    first_char: i64,
    widths: Vec<f32>,
    missing_width: Option<f32>,
    /// Multi-byte fonts are measured per decoded character.
    composite: bool,
}

impl FontMetrics {
    fn from_dict(doc: &Document, font: &Dictionary) -> Self {
        let composite = font
            .get(b"Subtype")
            .and_then(Object::as_name)
            .map(|s| s == b"Type0")
            .unwrap_or(false);

        let first_char = font
            .get(b"FirstChar")
            .ok()
            .and_then(|o| resolve(doc, o))
            .and_then(|o| o.as_i64().ok())
            .unwrap_or(0);

        let widths = font
            .get(b"Widths")
            .ok()
            .and_then(|o| resolve(doc, o))
            .and_then(|o| o.as_array().ok())
            .map(|arr| arr.iter().map(|w| get_number(w).unwrap_or(0.0)).collect())
            .unwrap_or_default();

        let missing_width = font
            .get(b"FontDescriptor")
            .ok()
            .and_then(|o| resolve(doc, o))
            .and_then(|o| o.as_dict().ok())
            .and_then(|d| d.get(b"MissingWidth").ok())
            .and_then(get_number);

        Self {
            first_char,
            widths,
            missing_width,
            composite,
        }
    }

    /// Width of one character code, if the font knows it.
    fn glyph_width(&self, code: u8) -> Option<f32> {
        i64::from(code)
            .checked_sub(self.first_char)
            .and_then(|idx| usize::try_from(idx).ok())
            .and_then(|i| self.widths.get(i).copied())
            .or(self.missing_width)
    }
}

/// Text state parameters (PDF 32000-1, 9.3).
#[derive(Debug, Clone)]
struct TextState {
    font: Vec<u8>,
    size: f32,
    char_spacing: f32,
    word_spacing: f32,
    horizontal_scaling: f32,
    leading: f32,
    rise: f32,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            font: Vec::new(),
            size: 12.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            horizontal_scaling: 1.0,
            leading: 0.0,
            rise: 0.0,
        }
    }
}

/// Walks the operations of one page and records every shown string.
pub(super) struct ContentWalker<'a> {
    doc: &'a Document,
    fonts: BTreeMap<Vec<u8>, &'a Dictionary>,
    metrics: HashMap<Vec<u8>, FontMetrics>,
    fallback_glyph_width: f32,
    ctm: Matrix,
    ctm_stack: Vec<Matrix>,
    text_matrix: Matrix,
    line_matrix: Matrix,
    state: TextState,
    in_text_block: bool,
    fragments: Vec<PositionedFragment>,
}

impl<'a> ContentWalker<'a> {
    pub(super) fn new(doc: &'a Document, page_id: ObjectId, fallback_glyph_width: f32) -> Self {
        let fonts = doc.get_page_fonts(page_id).unwrap_or_default();
        let metrics = fonts
            .iter()
            .map(|(name, dict)| (name.clone(), FontMetrics::from_dict(doc, dict)))
            .collect();

        Self {
            doc,
            fonts,
            metrics,
            fallback_glyph_width,
            ctm: Matrix::IDENTITY,
            ctm_stack: Vec::new(),
            text_matrix: Matrix::IDENTITY,
            line_matrix: Matrix::IDENTITY,
            state: TextState::default(),
            in_text_block: false,
            fragments: Vec::new(),
        }
    }

    pub(super) fn walk(mut self, operations: &[Operation]) -> Vec<PositionedFragment> {
        for op in operations {
            self.apply(op);
        }
        self.fragments
    }

    fn apply(&mut self, op: &Operation) {
        let operands = op.operands.as_slice();
        match op.operator.as_str() {
            "q" => self.ctm_stack.push(self.ctm),
            "Q" => {
                if let Some(ctm) = self.ctm_stack.pop() {
                    self.ctm = ctm;
                }
            }
            "cm" => {
                if let Some(m) = Matrix::from_operands(operands) {
                    self.ctm = m.then(&self.ctm);
                }
            }
            "BT" => {
                self.in_text_block = true;
                self.text_matrix = Matrix::IDENTITY;
                self.line_matrix = Matrix::IDENTITY;
            }
            "ET" => self.in_text_block = false,
            "Tf" => {
                if let [name, size, ..] = operands {
                    if let Ok(name) = name.as_name() {
                        self.state.font = name.to_vec();
                    }
                    if let Some(size) = get_number(size) {
                        self.state.size = size;
                    }
                }
            }
            "Tc" => self.set_param(operands, |s, v| s.char_spacing = v),
            "Tw" => self.set_param(operands, |s, v| s.word_spacing = v),
            "Tz" => self.set_param(operands, |s, v| s.horizontal_scaling = v / 100.0),
            "TL" => self.set_param(operands, |s, v| s.leading = v),
            "Ts" => self.set_param(operands, |s, v| s.rise = v),
            "Td" => {
                if let [tx, ty, ..] = operands {
                    self.move_line(get_number(tx).unwrap_or(0.0), get_number(ty).unwrap_or(0.0));
                }
            }
            "TD" => {
                if let [tx, ty, ..] = operands {
                    let ty = get_number(ty).unwrap_or(0.0);
                    self.state.leading = -ty;
                    self.move_line(get_number(tx).unwrap_or(0.0), ty);
                }
            }
            "Tm" => {
                if let Some(m) = Matrix::from_operands(operands) {
                    self.text_matrix = m;
                    self.line_matrix = m;
                }
            }
            "T*" => self.next_line(),
            "Tj" => {
                if let Some(operand) = operands.first() {
                    self.show(operand);
                }
            }
            "'" => {
                self.next_line();
                if let Some(operand) = operands.first() {
                    self.show(operand);
                }
            }
            "\"" => {
                if let [aw, ac, string, ..] = operands {
                    self.state.word_spacing = get_number(aw).unwrap_or(0.0);
                    self.state.char_spacing = get_number(ac).unwrap_or(0.0);
                    self.next_line();
                    self.show(string);
                }
            }
            "TJ" => {
                if let Some(Ok(items)) = operands.first().map(Object::as_array) {
                    for item in items {
                        match get_number(item) {
                            Some(adjust) => {
                                let tx = -adjust / 1000.0
                                    * self.state.size
                                    * self.state.horizontal_scaling;
                                self.advance(tx);
                            }
                            None => self.show(item),
                        }
                    }
                }
            }
            _ => {}
        }
    }

    fn set_param(&mut self, operands: &[Object], set: impl FnOnce(&mut TextState, f32)) {
        if let Some(value) = operands.first().and_then(get_number) {
            set(&mut self.state, value);
        }
    }

    fn move_line(&mut self, tx: f32, ty: f32) {
        self.line_matrix = Matrix::translation(tx, ty).then(&self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        let leading = if self.state.leading != 0.0 {
            self.state.leading
        } else {
            // Approximate line height
            self.state.size * 1.2
        };
        self.move_line(0.0, -leading);
    }

    fn advance(&mut self, tx: f32) {
        self.text_matrix = Matrix::translation(tx, 0.0).then(&self.text_matrix);
    }

    /// Record one string operand and move the text matrix past it.
    fn show(&mut self, operand: &Object) {
        let Object::String(bytes, _) = operand else {
            return;
        };
        let text = self.decode(bytes);
        let tx = self.string_advance(bytes, &text);

        if self.in_text_block && !text.is_empty() {
            let rendering = self.text_matrix.then(&self.ctm);
            let (x, y) = rendering.apply(0.0, self.state.rise);
            let width = tx * rendering.horizontal_scale();
            trace!("Fragment {:?} at ({:.2}, {:.2}) width {:.2}", text, x, y, width);
            self.fragments.push(PositionedFragment::new(text, x, y, width));
        }

        self.advance(tx);
    }

    /// Horizontal displacement of a shown string in text space.
    fn string_advance(&self, bytes: &[u8], text: &str) -> f32 {
        let state = &self.state;
        let fallback = self.fallback_glyph_width * 1000.0;
        let metrics = self.metrics.get(&state.font);

        let mut total = 0.0;
        match metrics {
            Some(m) if !m.composite && !m.widths.is_empty() => {
                for &code in bytes {
                    let w0 = m.glyph_width(code).unwrap_or(fallback);
                    total += w0 / 1000.0 * state.size + state.char_spacing;
                    if code == b' ' {
                        total += state.word_spacing;
                    }
                }
            }
            _ => {
                for c in text.chars() {
                    total += fallback / 1000.0 * state.size + state.char_spacing;
                    if c == ' ' {
                        total += state.word_spacing;
                    }
                }
            }
        }
        total * state.horizontal_scaling
    }

    /// Decode string bytes with the current font encoding.
    fn decode(&self, bytes: &[u8]) -> String {
        if let Some(font_dict) = self.fonts.get(&self.state.font) {
            if let Ok(encoding) = font_dict.get_font_encoding(self.doc) {
                if let Ok(text) = Document::decode_text(&encoding, bytes) {
                    return text;
                }
            }
        }

        // Fallback: try UTF-16BE then Latin-1
        if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
            let utf16: Vec<u16> = bytes[2..]
                .chunks_exact(2)
                .map(|chunk| u16::from_be_bytes([chunk[0], chunk[1]]))
                .collect();
            return String::from_utf16_lossy(&utf16);
        }

        bytes.iter().map(|&b| b as char).collect()
    }
}

/// Follow a reference to its target object.
fn resolve<'d>(doc: &'d Document, obj: &'d Object) -> Option<&'d Object> {
    doc.dereference(obj).ok().map(|(_, o)| o)
}

fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}
