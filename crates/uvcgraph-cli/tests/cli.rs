// SPDX-License-Identifier: Apache-2.0

//! Integration tests for the uvcgraph CLI
//!
//! Each test writes a synthetic descriptor dump to a temp file and runs
//! the binary against it, checking output and exit codes end-to-end.

use std::fs;
use std::path::PathBuf;
use std::process;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;

fn uvcgraph_cmd() -> Command {
    Command::cargo_bin("uvcgraph").expect("binary built")
}

/// Write `contents` to a unique temp file and return its path.
fn write_dump(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("uvcgraph-test-{}-{}", process::id(), name));
    fs::write(&path, contents).expect("write dump");
    path
}

fn vc_region() -> Vec<u8> {
    let mut region = vec![
        13, 0x24, 0x01, // VC header
        0x10, 0x01, // UVC 1.10
        0x80, 0x8d, 0x5b, 0x00, // clock 6 MHz
        0x00, 0x00, // total length
        1, 1, // one streaming interface, number 1
    ];
    // Camera input terminal, id 1
    region.extend([
        17, 0x24, 0x02, 1, 0x01, 0x02, 0x00, 0x00, 0, 0, 0, 0, 0, 0, 2, 0x3f, 0x00,
    ]);
    // Streaming output terminal, id 2, sourced from the camera
    region.extend([9, 0x24, 0x03, 2, 0x01, 0x01, 0x00, 1, 0x00]);
    region
}

fn vs_region() -> Vec<u8> {
    let mut region = vec![
        14, 0x24, 0x01, // VS input header
        1, // one format
        0x00, 0x00, // total length
        0x81, // endpoint
        0x00, // info
        2,    // terminal link
        0x00, 0x00, 0x00, // still capture, triggers
        1, 0x00, // control width and one row
    ];
    // MJPEG format, one frame
    region.extend([11, 0x24, 0x06, 1, 1, 0x01, 1, 0, 0, 0, 0]);
    let mut frame = vec![30, 0x24, 0x07, 1, 0x03];
    frame.extend_from_slice(&640u16.to_le_bytes());
    frame.extend_from_slice(&480u16.to_le_bytes());
    frame.extend_from_slice(&1_000_000u32.to_le_bytes());
    frame.extend_from_slice(&10_000_000u32.to_le_bytes());
    frame.extend_from_slice(&614_400u32.to_le_bytes());
    frame.extend_from_slice(&333_333u32.to_le_bytes());
    frame.push(1);
    frame.extend_from_slice(&333_333u32.to_le_bytes());
    region.extend(frame);
    region
}

fn webcam_dump() -> String {
    json!({
        "vendor_id": 0x046d,
        "product_id": 0x082d,
        "control": {
            "number": 0,
            "alt_settings": [{"extra": vc_region()}]
        },
        "streaming": [{
            "number": 1,
            "alt_settings": [
                {"extra": vs_region()},
                {"endpoints": [{"address": 0x81, "max_packet_size": 1024}]}
            ]
        }],
        "strings": {"2": "Front Camera"}
    })
    .to_string()
}

#[test]
fn test_info_text_output() {
    let dump = write_dump("info.json", &webcam_dump());
    uvcgraph_cmd()
        .args(["info", dump.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("UVC 1.10 device 046d:082d"))
        .stdout(predicate::str::contains("Camera 1"))
        .stdout(predicate::str::contains("Output 2"));
}

#[test]
fn test_info_json_output() {
    let dump = write_dump("info-json.json", &webcam_dump());
    let output = uvcgraph_cmd()
        .args(["--json", "info", dump.to_str().unwrap()])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let parsed: serde_json::Value = serde_json::from_slice(&output).expect("valid JSON");
    assert_eq!(parsed["vendor_id"], "046d");
    assert_eq!(parsed["uvc_version"], "1.10");
    assert_eq!(parsed["clock_frequency_hz"], 6_000_000);
    assert_eq!(parsed["entities"].as_array().unwrap().len(), 2);
    assert_eq!(parsed["entities"][0]["kind"], "IT");
}

#[test]
fn test_topology_output() {
    let dump = write_dump("topology.json", &webcam_dump());
    uvcgraph_cmd()
        .args(["topology", dump.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("IT 1 -> OT 2"))
        .stdout(predicate::str::contains("interface 1"));
}

#[test]
fn test_formats_output() {
    let dump = write_dump("formats.json", &webcam_dump());
    uvcgraph_cmd()
        .args(["formats", dump.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("MJPG"))
        .stdout(predicate::str::contains("640 x 480"))
        .stdout(predicate::str::contains("30.00 fps"));
}

#[test]
fn test_formats_json_shape() {
    let dump = write_dump("formats-json.json", &webcam_dump());
    let output = uvcgraph_cmd()
        .args(["--json", "formats", dump.to_str().unwrap()])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let parsed: serde_json::Value = serde_json::from_slice(&output).expect("valid JSON");
    let interface = &parsed.as_array().unwrap()[0];
    assert_eq!(interface["interface"], 1);
    assert_eq!(interface["formats"][0]["fourcc"], "MJPG");
    assert_eq!(interface["formats"][0]["frames"][0]["width"], 640);
}

#[test]
fn test_missing_dump_exits_3() {
    uvcgraph_cmd()
        .args(["info", "/nonexistent/dump.json"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Cannot read dump"));
}

#[test]
fn test_invalid_json_exits_3() {
    let dump = write_dump("bad.json", "{not json");
    uvcgraph_cmd()
        .args(["info", dump.to_str().unwrap()])
        .assert()
        .code(3);
}

#[test]
fn test_truncated_descriptors_exit_4() {
    let dump = write_dump(
        "truncated.json",
        // Control region cut off mid-record.
        &json!({"control": {"number": 0, "alt_settings": [{"extra": [13, 0x24, 0x01, 0]}]}})
            .to_string(),
    );
    uvcgraph_cmd()
        .args(["info", dump.to_str().unwrap()])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Descriptor parse failed"));
}

#[test]
fn test_no_chain_exits_5() {
    // Valid control region but no streaming interfaces at all.
    let dump = write_dump(
        "nochain.json",
        &json!({
            "control": {"number": 0, "alt_settings": [{"extra": vc_region()}]}
        })
        .to_string(),
    );
    uvcgraph_cmd()
        .args(["topology", dump.to_str().unwrap()])
        .assert()
        .code(5)
        .stderr(predicate::str::contains("No video chain"));
}

#[test]
fn test_unknown_subcommand_exits_2() {
    uvcgraph_cmd().arg("frobnicate").assert().code(2);
}
