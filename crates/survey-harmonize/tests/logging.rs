//! Structured events emitted while harmonizing, captured through the file sink.

use polars::df;
use survey_common::logging::{LogConfig, LogFormat, REDACTED_VALUE, init_logging};
use survey_harmonize::{HarmonizeOptions, Harmonizer};
use tracing::Level;

#[test]
fn unmapped_codes_are_logged_without_respondent_values() {
    let mut path = std::env::temp_dir();
    path.push(format!("survey_harmonize_log_{}.jsonl", std::process::id()));
    let _ = std::fs::remove_file(&path);

    let config = LogConfig::default()
        .with_format(LogFormat::Json)
        .with_level(Level::TRACE)
        .with_log_file(&path);
    init_logging(&config).expect("install subscriber");

    let frame = df!("B1R5" => [1i64, 2, 9]).unwrap();
    let (out, log) = Harmonizer::new("sakernas", None)
        .harmonize(&frame, "2023", &HarmonizeOptions::default())
        .unwrap();
    assert_eq!(log.labels["urban_rural"].unmapped, 1);
    assert_eq!(out.height(), 3);

    let text = std::fs::read_to_string(&path).expect("read log file");
    let warning = text
        .lines()
        .find(|line| line.contains("codes without a label set to null"))
        .expect("warning event");
    assert!(warning.contains("\"column\":\"urban_rural\""));
    assert!(warning.contains("\"unmapped\":1"));

    let trace = text
        .lines()
        .find(|line| line.contains("unmapped code"))
        .expect("trace event");
    assert!(trace.contains(REDACTED_VALUE));
    assert!(!trace.contains("\"value\":\"9\""));

    let _ = std::fs::remove_file(&path);
}
