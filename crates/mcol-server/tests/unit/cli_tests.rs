//! Tests for the command line overrides

use clap::Parser;
use mcol_server::Cli;

#[test]
fn test_unset_flags_serialize_to_nothing() {
    let cli = Cli::try_parse_from(["mcol-server"]).expect("parse");
    let overrides = serde_json::to_value(&cli).expect("json");
    assert_eq!(overrides, serde_json::json!({}));
}

#[test]
fn test_flags_become_config_fields() {
    let cli = Cli::try_parse_from([
        "mcol-server",
        "-a",
        ":9000",
        "-i",
        "0",
        "-r",
        "false",
        "-t",
        "10.0.0.0/8",
        "--config",
        "server.toml",
    ])
    .expect("parse");
    let overrides = serde_json::to_value(&cli).expect("json");

    assert_eq!(
        overrides,
        serde_json::json!({
            "address": ":9000",
            "store_interval": "0",
            "restore": false,
            "trusted_subnet": "10.0.0.0/8",
        })
    );
    assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("server.toml")));
}
