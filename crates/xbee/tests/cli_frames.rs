#![cfg(all(unix, feature = "cli"))]

use std::path::PathBuf;
use std::process::{Command, Output};

fn xbee(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_xbee"))
        .env_remove("XBEE_DEVICE")
        .env_remove("XBEE_BAUD")
        .args(["--log-level", "off"])
        .args(args)
        .output()
        .expect("xbee should run")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn unique_temp_file(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "xbee-cli-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ))
}

#[test]
fn encode_local_node_discover() {
    let output = xbee(&["--format", "pretty", "encode", "local", "ND"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "7e000408014e4464");
}

#[test]
fn encode_remote_json() {
    let output = xbee(&[
        "--format", "json", "encode", "remote", "5678", "D0", "--value", "04",
    ]);
    assert!(output.status.success());
    let json: serde_json::Value =
        serde_json::from_str(stdout(&output).trim()).expect("stdout should be json");
    assert_eq!(json["api_name"], "REMOTE_AT");
    assert_eq!(json["length"], 16);
    assert_eq!(json["command"], "D0");
    assert!(json["hex"]
        .as_str()
        .unwrap()
        .starts_with("7e0010170100000000000000005678024430"));
}

#[test]
fn encode_raw_writes_wire_bytes() {
    let output = xbee(&["--format", "raw", "encode", "local", "ND"]);
    assert!(output.status.success());
    assert_eq!(output.stdout, [0x7E, 0x00, 0x04, 0x08, 0x01, 0x4E, 0x44, 0x64]);
}

#[test]
fn encode_bad_command_name_is_usage_error() {
    let output = xbee(&["encode", "local", "NDX"]);
    assert_eq!(output.status.code(), Some(64));
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid AT command name"));
}

#[test]
fn encode_bad_address_width_is_usage_error() {
    let output = xbee(&["encode", "remote", "56", "D0"]);
    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn decode_local_response_hex() {
    // 7E 00 07 88 01 49 44 00 33 32 <sum>: ID query answered with 0x3332.
    let output = xbee(&["--format", "json", "decode", "7e00078801494400333284"]);
    assert!(output.status.success(), "stderr: {:?}", output.stderr);
    let json: serde_json::Value =
        serde_json::from_str(stdout(&output).trim()).expect("stdout should be json");
    assert_eq!(json["result"], "response");
    assert_eq!(json["command"], "ID");
    assert_eq!(json["status"], "OK");
    assert_eq!(json["data"], "3332");
}

#[test]
fn decode_reports_every_candidate() {
    // Good response, then the same frame with a wrong declared length.
    let output = xbee(&[
        "--format",
        "json",
        "decode",
        "7e00078801494400333284 7e00088801494400333284",
    ]);
    assert_eq!(output.status.code(), Some(60));
    let lines: Vec<String> = stdout(&output).lines().map(str::to_string).collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("\"result\":\"response\""));
    assert!(lines[1].contains("\"result\":\"rejected\""));
    assert!(lines[1].contains("length mismatch"));
}

#[test]
fn decode_from_file() {
    let path = unique_temp_file("decode");
    std::fs::write(
        &path,
        [0x00, 0x7E, 0x00, 0x05, 0x88, 0x01, 0x44, 0x30, 0x00, 0x02],
    )
    .expect("capture should be writable");

    let output = xbee(&["--format", "pretty", "decode", "--file", path.to_str().unwrap()]);
    let _ = std::fs::remove_file(&path);

    assert!(output.status.success());
    assert_eq!(
        stdout(&output).trim(),
        "#0 LOCAL_AT_RESPONSE frame=1 cmd=D0 status=OK"
    );
}

#[test]
fn decode_without_delimiter_is_data_invalid() {
    let output = xbee(&["decode", "000102"]);
    assert_eq!(output.status.code(), Some(60));
}

#[test]
fn decode_malformed_hex_is_usage_error() {
    let output = xbee(&["decode", "7e0"]);
    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn at_on_missing_device_is_transport_error() {
    let output = xbee(&["at", "ND", "--device", "/nonexistent/ttyUSB-xbee"]);
    assert_eq!(output.status.code(), Some(3));
    assert!(String::from_utf8_lossy(&output.stderr).contains("/nonexistent/ttyUSB-xbee"));
}

#[test]
fn at_device_from_environment() {
    let output = Command::new(env!("CARGO_BIN_EXE_xbee"))
        .env("XBEE_DEVICE", "/nonexistent/ttyUSB-env")
        .args(["--log-level", "off", "at", "ND"])
        .output()
        .expect("xbee should run");
    assert_eq!(output.status.code(), Some(3));
    assert!(String::from_utf8_lossy(&output.stderr).contains("/nonexistent/ttyUSB-env"));
}

#[test]
fn version_prints_package_version() {
    let output = xbee(&["version"]);
    assert!(output.status.success());
    assert_eq!(
        stdout(&output).trim(),
        format!("xbee {}", env!("CARGO_PKG_VERSION"))
    );
}

#[test]
fn version_extended() {
    let output = xbee(&["version", "--extended"]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("name: xbee"));
    assert!(out.contains("features: session=true, cli=true"));
}
