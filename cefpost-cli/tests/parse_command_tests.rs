//! Integration tests for `cefpost parse`.
//!
//! Feeds real files through the line reader and checks the emitted records.

use std::fs;

use tempfile::TempDir;

use cefpost_cli::cli::OutputFormat;
use cefpost_cli::commands::parse::parse_stream;
use cefpost_cli::output::OutputWriter;
use cefpost_core::config::ParserConfig;
use cefpost_parser::CefParser;

const SAMPLE_LOG: &str = r"<132>Aug 14 14:26:55 ossec-host CEF:0|Trend Micro Inc.|OSSEC HIDS|v2.8.3|2502|User missed the password more than one time|10|dvc=ip-172-30-2-212 cs2=ip-172-30-2-212->/var/log/auth.log cs2Label=Location msg=Aug 14 14:26:53 sshd[16217]: PAM 2 more authentication failures
CEF:0|Nessus|Nessus||Nessus\|18405|Operating System: Windows|2| eventId=6 msg=\=Have some \=escaped\= equals!\=
CEF:0|Vendor|Product|1.0|100|Unknown severity|Unknown|src=10.0.0.1
CEF:0|Vendor|Product|1.0|100|Out of range|11|src=10.0.0.1
<14>Jan  5 03:04:05 host CEF:0|Vendor|Product|1.0|200|Geo|High|slat=29.7604 slong=-95.3698 cnt=3
";

async fn parse_file(
    parser: &CefParser,
    content: &str,
    fail_fast: bool,
) -> (cefpost_cli::commands::parse::ParseSummary, Vec<serde_json::Value>) {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let path = temp_dir.path().join("events.cef");
    fs::write(&path, content).expect("should write log file");

    let file = tokio::fs::File::open(&path).await.expect("open log file");
    let reader = tokio::io::BufReader::new(file);
    let writer = OutputWriter::new(OutputFormat::Json);
    let mut out = Vec::new();

    let summary = parse_stream(reader, parser, fail_fast, &writer, &mut out)
        .await
        .expect("file should be readable");

    let records = String::from_utf8(out)
        .expect("valid UTF-8")
        .lines()
        .map(|line| serde_json::from_str(line).expect("each line is a JSON object"))
        .collect();

    (summary, records)
}

#[tokio::test]
async fn test_parse_file_mixed_lines() {
    let parser = CefParser::new(&ParserConfig::default()).expect("parser");
    let (summary, records) = parse_file(&parser, SAMPLE_LOG, false).await;

    assert_eq!(summary.parsed, 4);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.failures[0].line, 4);
    assert_eq!(summary.failures[0].category, "invalid_severity");

    let ossec = &records[0];
    assert_eq!(ossec["severity"].as_i64(), Some(10));
    assert_eq!(
        ossec["fields"]["Location"].as_str(),
        Some("ip-172-30-2-212->/var/log/auth.log")
    );
    assert_eq!(
        ossec["message"].as_str(),
        Some("Aug 14 14:26:53 sshd[16217]: PAM 2 more authentication failures")
    );

    let nessus = &records[1];
    assert_eq!(nessus["device_event_class_id"].as_str(), Some("Nessus|18405"));
    assert_eq!(nessus["device_version"].as_str(), Some(""));
    assert_eq!(nessus["fields"]["eventId"].as_i64(), Some(6));
    assert_eq!(
        nessus["message"].as_str(),
        Some("=Have some =escaped= equals!=")
    );

    assert_eq!(records[2]["severity"].as_i64(), Some(-1));

    let geo = &records[3];
    assert_eq!(geo["line"].as_u64(), Some(5));
    assert_eq!(geo["severity"].as_i64(), Some(8));
    assert_eq!(geo["fields"]["cnt"].as_i64(), Some(3));
    assert!(geo["fields"]["slat"].is_f64());
}

#[tokio::test]
async fn test_parse_file_fail_fast() {
    let parser = CefParser::new(&ParserConfig::default()).expect("parser");
    let (summary, records) = parse_file(&parser, SAMPLE_LOG, true).await;

    assert_eq!(summary.parsed, 3);
    assert_eq!(summary.failed, 1);
    assert!(summary.stopped_early);
    assert_eq!(records.len(), 3);
}

#[tokio::test]
async fn test_parse_file_applies_configured_timezone() {
    let config = ParserConfig {
        timezone: "+01:00".to_owned(),
        ..ParserConfig::default()
    };
    let parser = CefParser::new(&config).expect("parser");
    let line = "<14>Jan  5 03:04:05 host CEF:0|Vendor|Product|1.0|200|Geo|3|cnt=3\n";
    let (summary, records) = parse_file(&parser, line, false).await;

    assert_eq!(summary.parsed, 1);
    let timestamp = records[0]["timestamp"].as_str().expect("timestamp string");
    assert!(
        timestamp.ends_with("-01-05T03:04:05+01:00"),
        "unexpected timestamp {timestamp}"
    );
}

#[tokio::test]
async fn test_parse_file_line_too_long() {
    let parser = CefParser::new(&ParserConfig {
        max_line_length: 32,
        ..ParserConfig::default()
    })
    .expect("parser");
    let (summary, records) = parse_file(&parser, SAMPLE_LOG, false).await;

    assert_eq!(summary.parsed, 0);
    assert_eq!(summary.failed, 5);
    assert!(records.is_empty());
    assert!(summary.failures.iter().all(|f| f.category == "too_large"));
}

#[tokio::test]
async fn test_parse_file_invalid_utf8_is_replaced() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let path = temp_dir.path().join("binary.cef");
    let mut bytes = b"CEF:0|V|P|1|id|name|5|msg=caf".to_vec();
    bytes.extend_from_slice(&[0xff, b'\n']);
    fs::write(&path, bytes).expect("should write log file");

    let parser = CefParser::new(&ParserConfig::default()).expect("parser");
    let file = tokio::fs::File::open(&path).await.expect("open log file");
    let writer = OutputWriter::new(OutputFormat::Json);
    let mut out = Vec::new();
    let summary = parse_stream(
        tokio::io::BufReader::new(file),
        &parser,
        false,
        &writer,
        &mut out,
    )
    .await
    .expect("stream should be readable");

    assert_eq!(summary.parsed, 1);
    let record: serde_json::Value =
        serde_json::from_slice(out.trim_ascii_end()).expect("json record");
    assert_eq!(record["message"].as_str(), Some("caf\u{fffd}"));
}
