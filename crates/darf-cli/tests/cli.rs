//! End-to-end tests of the `darf` binary.

mod common;

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

use common::{write_config, write_pdf, write_sample_darf};

/// Command isolated from the user's configuration directory.
fn darf(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("darf").unwrap();
    cmd.env("HOME", home).env("XDG_CONFIG_HOME", home.join(".config"));
    cmd
}

#[test]
fn batch_writes_csv_report_with_headers() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in");
    let out = dir.path().join("out");
    fs::create_dir_all(&input).unwrap();

    write_sample_darf(&input, "doc10.pdf");
    write_pdf(&input, "doc2.pdf", &[("nada aqui", 50, 700)]);
    fs::write(input.join("readme.txt"), "not a pdf").unwrap();

    darf(dir.path())
        .args(["batch", &format!("{}/*", input.display()), "-o"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 2 files"))
        .stdout(predicate::str::contains("R$ 2.500,00"));

    let reports: Vec<_> = fs::read_dir(&out)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(reports.len(), 1);
    assert!(reports[0].starts_with("Relatorio_DARFs_"));
    assert!(reports[0].ends_with(".csv"));

    let csv = fs::read_to_string(out.join(&reports[0])).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(
        lines[0],
        "Nome do Arquivo,Código da Retenção,Valor da Retenção,Status"
    );
    // Natural order puts doc2 before doc10
    assert_eq!(lines[1], "doc2.pdf,N/A,0.0,Códigos não encontrados.");
    assert_eq!(lines[2], "doc10.pdf,1162,2500.0,OK");
    assert_eq!(lines[3], "doc10.pdf,5952,0.0,Valor não identificado na linha.");
}

#[test]
fn batch_without_pdfs_fails() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.txt"), "x").unwrap();

    darf(dir.path())
        .args(["batch", &format!("{}/*", dir.path().display()), "--no-export"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No PDF files found"));
}

#[test]
fn batch_reports_corrupt_file_as_error() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("broken.pdf"), b"%PDF-1.5 garbage").unwrap();

    darf(dir.path())
        .args(["batch", &format!("{}/*.pdf", dir.path().display()), "--no-export"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ERROR"))
        .stdout(predicate::str::contains("Erro fatal"));
}

#[test]
fn process_prints_json_records() {
    let dir = TempDir::new().unwrap();
    let file = write_sample_darf(dir.path(), "darf.pdf");

    darf(dir.path())
        .arg("process")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"code\": \"1162\""))
        .stdout(predicate::str::contains("\"value\": 2500.0"))
        .stdout(predicate::str::contains("\"status\": \"warning\""));
}

#[test]
fn process_rejects_non_pdf() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("darf.png");
    fs::write(&file, b"x").unwrap();

    darf(dir.path())
        .arg("process")
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported file format"));
}

#[test]
fn inspect_numbers_lines() {
    let dir = TempDir::new().unwrap();
    let file = write_sample_darf(dir.path(), "darf.pdf");

    darf(dir.path())
        .arg("inspect")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("1162 IRRF ref 10,00 2.500,00"))
        .stdout(predicate::str::contains("Codes: 5952 (CSLL/PIS/COFINS), 1162 (IRRF PJ), 1708 (IRRF 1708)"))
        .stdout(predicate::str::contains("Needs review"))
        .stdout(predicate::str::contains("5952 (CSLL/PIS/COFINS): Valor não identificado"))
        .stdout(predicate::str::contains("line: 5952 CSLL"));
}

#[test]
fn config_init_then_get_and_set_through_explicit_path() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("custom.json");

    darf(dir.path())
        .arg("-c")
        .arg(&config)
        .args(["config", "init"])
        .assert()
        .success();
    assert!(config.exists());

    darf(dir.path())
        .arg("-c")
        .arg(&config)
        .args(["config", "set", "batch.batch_size", "5"])
        .assert()
        .success();

    darf(dir.path())
        .arg("-c")
        .arg(&config)
        .args(["config", "get", "batch.batch_size"])
        .assert()
        .success()
        .stdout(predicate::str::diff("5\n"));

    let saved: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&config).unwrap()).unwrap();
    assert_eq!(saved["batch"]["batch_size"], 5);
    assert!(!dir.path().join(".config/darf/config.json").exists());
}

#[test]
fn config_get_reads_explicit_file() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), r#"{"batch": {"batch_size": 3}}"#);

    darf(dir.path())
        .arg("-c")
        .arg(&config)
        .args(["config", "get", "batch.batch_size"])
        .assert()
        .success()
        .stdout(predicate::str::diff("3\n"));
}

#[test]
fn config_set_on_missing_explicit_file_creates_it() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("nested").join("darf.json");

    darf(dir.path())
        .arg("-c")
        .arg(&config)
        .args(["config", "set", "layout.gap_threshold", "6"])
        .assert()
        .success();

    let saved: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&config).unwrap()).unwrap();
    assert_eq!(saved["layout"]["gap_threshold"], 6.0);
    assert!(!dir.path().join(".config/darf/config.json").exists());
}

#[test]
fn explicit_config_changes_target_codes() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), r#"{"extraction": {"target_codes": ["5952"]}}"#);
    let file = write_sample_darf(dir.path(), "darf.pdf");

    darf(dir.path())
        .arg("-c")
        .arg(&config)
        .args(["process", "-f", "csv"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("5952"))
        .stdout(predicate::str::contains("1162").not());
}
