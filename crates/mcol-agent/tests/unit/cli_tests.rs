//! Tests for the command line overrides

use clap::Parser;
use mcol_agent::Cli;

#[test]
fn test_unset_flags_serialize_to_nothing() {
    let cli = Cli::try_parse_from(["mcol-agent"]).expect("parse");
    assert_eq!(serde_json::to_value(&cli).expect("json"), serde_json::json!({}));
}

#[test]
fn test_short_flags_match_config_fields() {
    let cli = Cli::try_parse_from([
        "mcol-agent",
        "-a",
        "collector:8080",
        "-p",
        "500ms",
        "-r",
        "5s",
        "-n",
        "4",
        "-t",
        "1s",
        "-k",
        "secret",
        "--protocol",
        "grpc",
    ])
    .expect("parse");

    assert_eq!(
        serde_json::to_value(&cli).expect("json"),
        serde_json::json!({
            "address": "collector:8080",
            "protocol": "grpc",
            "poll_interval": "500ms",
            "report_interval": "5s",
            "retries": 4,
            "retry_delay": "1s",
            "key": "secret",
        })
    );
}

#[test]
fn test_retries_must_be_a_number() {
    assert!(Cli::try_parse_from(["mcol-agent", "-n", "many"]).is_err());
}
