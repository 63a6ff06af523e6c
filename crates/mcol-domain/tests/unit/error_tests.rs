//! Unit tests for domain error types

use mcol_domain::Error;

#[test]
fn test_not_found_error() {
    let error = Error::not_found("Unknown does not exist in Counter db");
    match error {
        Error::NotFound { resource } => assert_eq!(resource, "Unknown does not exist in Counter db"),
        _ => panic!("Expected NotFound error"),
    }
}

#[test]
fn test_invalid_argument_error() {
    let error = Error::invalid_argument("Metric must be int!");
    match error {
        Error::InvalidArgument { message } => assert_eq!(message, "Metric must be int!"),
        _ => panic!("Expected InvalidArgument error"),
    }
}

#[test]
fn test_network_error_with_source() {
    let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
    let error = Error::network_with_source("send failed", io);
    match &error {
        Error::Network { message, source } => {
            assert_eq!(message, "send failed");
            assert!(source.is_some());
        }
        _ => panic!("Expected Network error"),
    }
    assert_eq!(error.to_string(), "Network error: send failed");
}

#[test]
fn test_io_from_conversion() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
    let error: Error = io.into();
    assert!(matches!(error, Error::IoSimple { .. }));
}

#[test]
fn test_client_error_classification() {
    assert!(Error::invalid_argument("bad").is_client_error());
    assert!(Error::integrity("mismatch").is_client_error());
    assert!(Error::codec("bad gzip").is_client_error());
    assert!(!Error::database("down").is_client_error());
    assert!(!Error::forbidden("outside").is_client_error());
    assert!(!Error::internal("boom").is_client_error());
}
