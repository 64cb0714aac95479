//! Fixture files for driving the `darf` binary.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

/// Text runs of the sample DARF: a split "1162" code with its total and
/// a "5952" line without an amount.
pub const SAMPLE_DARF: &[(&str, i64, i64)] = &[
    ("DARF", 50, 780),
    ("2.500,00", 400, 600),
    ("11", 50, 601),
    ("62", 62, 600),
    ("IRRF", 90, 599),
    ("ref", 200, 600),
    ("10,00", 230, 600),
    ("5952", 50, 560),
    ("CSLL", 90, 560),
];

/// Single-page PDF showing each `(text, x, y)` run in 10pt Courier.
fn single_page_pdf(runs: &[(&str, i64, i64)]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "FirstChar" => 32,
        "LastChar" => 126,
        "Widths" => (32..=126).map(|_| Object::Integer(600)).collect::<Vec<_>>(),
    });

    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), 10.into()]),
    ];
    for &(text, x, y) in runs {
        operations.push(Operation::new(
            "Tm",
            vec![1.into(), 0.into(), 0.into(), 1.into(), x.into(), y.into()],
        ));
        operations.push(Operation::new("Tj", vec![Object::string_literal(text)]));
    }
    operations.push(Operation::new("ET", vec![]));

    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => 1,
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

/// Write a one-page PDF into `dir` and return its path.
pub fn write_pdf(dir: &Path, name: &str, runs: &[(&str, i64, i64)]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, single_page_pdf(runs)).unwrap();
    path
}

pub fn write_sample_darf(dir: &Path, name: &str) -> PathBuf {
    write_pdf(dir, name, SAMPLE_DARF)
}

/// Write a config file holding `json` and return its path.
pub fn write_config(dir: &Path, json: &str) -> PathBuf {
    let path = dir.join("darf.json");
    fs::write(&path, json).unwrap();
    path
}
