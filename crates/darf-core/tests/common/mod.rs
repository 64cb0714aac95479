//! In-memory PDF fixtures built with lopdf.

#![allow(dead_code)]

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

/// A string shown at a page position with the fixed-width test font.
pub struct Placed {
    pub text: &'static str,
    pub x: i64,
    pub y: i64,
}

pub fn at(text: &'static str, x: i64, y: i64) -> Placed {
    Placed { text, x, y }
}

/// Build a PDF with one page per entry. The font is 10pt with every glyph
/// 600/1000 em wide, so each character advances 6 units.
pub fn build_pdf(pages: &[Vec<Placed>]) -> Vec<u8> {
    build_pdf_with_first_char(32, pages)
}

/// Same as [`build_pdf`] with an arbitrary `FirstChar` in the font
/// dictionary, for documents with broken width tables.
pub fn build_pdf_with_first_char(first_char: i64, pages: &[Vec<Placed>]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "FirstChar" => first_char,
        "LastChar" => 126,
        "Widths" => (32..=126).map(|_| Object::Integer(600)).collect::<Vec<_>>(),
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for placed in pages {
        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 10.into()]),
        ];
        for item in placed {
            operations.push(Operation::new(
                "Tm",
                vec![1.into(), 0.into(), 0.into(), 1.into(), item.x.into(), item.y.into()],
            ));
            operations.push(Operation::new("Tj", vec![Object::string_literal(item.text)]));
        }
        operations.push(Operation::new("ET", vec![]));

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// A two-line DARF body: a split "1162" code, its description and total.
pub fn sample_darf() -> Vec<u8> {
    build_pdf(&[vec![
        at("DARF", 50, 780),
        at("2.500,00", 400, 600),
        at("11", 50, 601),
        at("62", 62, 600),
        at("IRRF", 90, 599),
        at("ref", 200, 600),
        at("10,00", 230, 600),
        at("5952", 50, 560),
        at("CSLL", 90, 560),
    ]])
}
