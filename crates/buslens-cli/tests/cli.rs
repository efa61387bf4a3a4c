use assert_cmd::Command;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use serde_json::Value;
use tempfile::TempDir;

fn cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("buslens"))
}

fn repo_root() -> std::path::PathBuf {
    let manifest = std::path::Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest
        .parent()
        .and_then(|p| p.parent())
        .expect("repo root")
        .to_path_buf()
}

fn golden_input(case: &str) -> std::path::PathBuf {
    repo_root()
        .join("tests")
        .join("golden")
        .join(case)
        .join("input.json")
}

#[test]
fn help_lists_subcommands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("decode").and(contains("device")));
    cmd()
        .arg("device")
        .arg("query")
        .arg("--help")
        .assert()
        .success();
}

#[test]
fn missing_input_shows_error_and_hint() {
    let temp = TempDir::new().expect("tempdir");
    let missing = temp.path().join("missing.json");
    let report = temp.path().join("report.json");

    cmd()
        .arg("decode")
        .arg(missing)
        .arg("-o")
        .arg(report)
        .assert()
        .failure()
        .stderr(contains("error:").and(contains("hint:")));
}

#[test]
fn non_json_input_is_rejected() {
    let temp = TempDir::new().expect("tempdir");
    let input = temp.path().join("capture.sr");
    std::fs::write(&input, b"not a capture").expect("write input");

    cmd()
        .arg("decode")
        .arg(input)
        .arg("--stdout")
        .assert()
        .failure()
        .stderr(contains("unsupported input format").and(contains("hint:")));
}

#[test]
fn report_file_matches_stdout_report() {
    let temp = TempDir::new().expect("tempdir");
    let report = temp.path().join("out").join("report.json");

    cmd()
        .arg("decode")
        .arg(golden_input("kwp2000"))
        .arg("-o")
        .arg(&report)
        .assert()
        .success()
        .stderr(contains("OK:"));

    let written: Value =
        serde_json::from_slice(&std::fs::read(&report).expect("report")).expect("report json");
    let assert = cmd()
        .arg("decode")
        .arg(golden_input("kwp2000"))
        .arg("--stdout")
        .assert()
        .success();
    let printed: Value =
        serde_json::from_slice(&assert.get_output().stdout).expect("stdout json");
    assert_eq!(written, printed);
    assert_eq!(printed["decoders"]["uart"], "iso14230");
}

#[test]
fn lines_prints_colored_text() {
    cmd()
        .arg("decode")
        .arg(golden_input("kwp2000"))
        .arg("--lines")
        .assert()
        .success()
        .stdout(contains("[command] F1 -> 33 command: StartCommunication"));
}

#[test]
fn quiet_keeps_decoded_lines() {
    cmd()
        .arg("decode")
        .arg(golden_input("kwp2000"))
        .arg("--lines")
        .arg("--quiet")
        .assert()
        .success()
        .stdout(contains("F1 -> 33 command: StartCommunication"));
}

#[test]
fn bad_packet_error_names_its_index() {
    let temp = TempDir::new().expect("tempdir");
    let input = temp.path().join("capture.json");
    std::fs::write(
        &input,
        r#"{ "sample_count": 10, "packets": [
            { "bus": "i2c", "address": 36, "write": true, "data": "00" },
            { "bus": "uart", "channel": "K", "baud_rate": 10400, "start_sample": 0, "data": "zz" } ] }"#,
    )
    .expect("write input");

    cmd()
        .arg("decode")
        .arg(input)
        .arg("--stdout")
        .assert()
        .code(2)
        .stderr(contains("error:").and(contains("packet 1")));
}

#[test]
fn none_override_disables_file_selection() {
    let assert = cmd()
        .arg("decode")
        .arg(golden_input("kwp2000"))
        .arg("--uart")
        .arg("none")
        .arg("--stdout")
        .assert()
        .success();
    let report: Value = serde_json::from_slice(&assert.get_output().stdout).expect("json");
    assert_eq!(report["decoders"]["uart"], Value::Null);
    assert_eq!(report["lines"].as_array().map(Vec::len), Some(0));
}

#[test]
fn chip_on_wrong_bus_is_rejected() {
    cmd()
        .arg("decode")
        .arg(golden_input("kwp2000"))
        .arg("--spi")
        .arg("iso7816")
        .arg("--stdout")
        .assert()
        .failure()
        .stderr(contains("cannot decode SPI traffic").and(contains("hint:")));
}

#[test]
fn stdout_and_report_conflict() {
    let temp = TempDir::new().expect("tempdir");
    let report = temp.path().join("report.json");

    cmd()
        .arg("decode")
        .arg(golden_input("kwp2000"))
        .arg("--stdout")
        .arg("-o")
        .arg(report)
        .assert()
        .failure()
        .stderr(contains("error:"));
}

#[test]
fn report_must_differ_from_input() {
    let temp = TempDir::new().expect("tempdir");
    let input = temp.path().join("capture.json");
    std::fs::copy(golden_input("kwp2000"), &input).expect("copy input");

    cmd()
        .arg("decode")
        .arg(&input)
        .arg("-o")
        .arg(&input)
        .assert()
        .failure()
        .stderr(contains("report path must differ from input"));
}

#[test]
fn quiet_suppresses_ok_message() {
    let temp = TempDir::new().expect("tempdir");
    let report = temp.path().join("report.json");

    cmd()
        .arg("decode")
        .arg(golden_input("pn532_spi"))
        .arg("-o")
        .arg(report)
        .arg("--quiet")
        .assert()
        .success()
        .stderr(contains("OK:").not());
}

#[test]
fn glob_with_multiple_matches_is_rejected() {
    let pattern = repo_root()
        .join("tests")
        .join("golden")
        .join("*")
        .join("input.json");

    cmd()
        .arg("decode")
        .arg(pattern)
        .arg("--stdout")
        .assert()
        .failure()
        .stderr(contains("multiple files match pattern"));
}

#[test]
fn query_on_missing_port_fails_cleanly() {
    let temp = TempDir::new().expect("tempdir");
    let port = temp.path().join("no-such-tty");

    cmd()
        .arg("device")
        .arg("query")
        .arg(port)
        .arg("*IDN?")
        .arg("--timeout-ms")
        .arg("100")
        .assert()
        .code(2)
        .stderr(contains("error:"));
}
