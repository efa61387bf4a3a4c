use std::fs;
use std::path::{Path, PathBuf};

use buslens_core::{DecodeReport, DecoderConfig, decode_capture_file};

fn repo_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("..")
}

fn load_expected_report(dir: &str) -> DecodeReport {
    let expected_path = repo_root().join(dir).join("expected_report.json");
    let expected_json = fs::read_to_string(&expected_path).expect("read expected_report.json");
    serde_json::from_str(&expected_json).expect("parse expected report")
}

fn run_golden(dir: &str) {
    let input = repo_root().join(dir).join("input.json");
    let expected = load_expected_report(dir);

    let mut actual = decode_capture_file(&input, &DecoderConfig::default()).expect("decode capture");
    actual.input.path = expected.input.path.clone();

    let actual_value = serde_json::to_value(actual).expect("serialize actual");
    let expected_value = serde_json::to_value(expected).expect("serialize expected");

    assert_eq!(actual_value, expected_value, "golden mismatch in {dir}");
}

#[test]
fn golden_kwp2000() {
    run_golden("tests/golden/kwp2000");
}

#[test]
fn golden_iso7816_atr() {
    run_golden("tests/golden/iso7816_atr");
}

#[test]
fn golden_pn532_spi() {
    run_golden("tests/golden/pn532_spi");
}

#[test]
fn golden_pn532_i2c() {
    run_golden("tests/golden/pn532_i2c");
}

#[test]
fn golden_iso7816_reports_single_baud_change() {
    let report = load_expected_report("tests/golden/iso7816_atr");
    assert_eq!(report.summary.baud_changes.len(), 1);
    assert_eq!(report.summary.baud_changes[0].to, 223_200);
}

#[test]
fn override_replaces_capture_selection() {
    let input = repo_root().join("tests/golden/kwp2000/input.json");
    let overrides = DecoderConfig {
        uart: Some(buslens_core::Chip::Iso7816),
        ..Default::default()
    };
    let report = decode_capture_file(&input, &overrides).expect("decode capture");
    assert_eq!(report.decoders.uart, Some(buslens_core::Chip::Iso7816));
    // The K-line capture has none of the smartcard channels.
    assert_eq!(report.lines.len(), 1);
    assert!(report.lines[0].text.contains("'RST'"));
}

#[test]
fn decoding_is_repeatable() {
    let input = repo_root().join("tests/golden/pn532_spi/input.json");
    let first = decode_capture_file(&input, &DecoderConfig::default()).expect("first run");
    let second = decode_capture_file(&input, &DecoderConfig::default()).expect("second run");
    assert_eq!(
        serde_json::to_value(first).unwrap(),
        serde_json::to_value(second).unwrap()
    );
}
