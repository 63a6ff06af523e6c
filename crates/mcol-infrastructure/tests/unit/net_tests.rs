//! Tests for trusted subnet checks

use mcol_domain::Error;
use mcol_infrastructure::net::TrustedSubnet;

fn subnet() -> TrustedSubnet {
    "192.168.1.0/24".parse().expect("valid cidr")
}

#[test]
fn test_member_address_is_allowed() {
    assert!(subnet().check(Some("192.168.1.42")).is_ok());
}

#[test]
fn test_outside_address_is_forbidden() {
    match subnet().check(Some("10.0.0.1")) {
        Err(Error::Forbidden { message }) => {
            assert_eq!(message, "IP address is not inside trusted network");
        }
        other => panic!("expected forbidden, got {other:?}"),
    }
}

#[test]
fn test_missing_or_garbage_address_is_forbidden() {
    assert!(matches!(subnet().check(None), Err(Error::Forbidden { .. })));
    assert!(matches!(subnet().check(Some("")), Err(Error::Forbidden { .. })));
    assert!(matches!(
        subnet().check(Some("localhost")),
        Err(Error::Forbidden { .. })
    ));
}

#[test]
fn test_invalid_cidr_is_a_configuration_error() {
    let result = "192.168.1.0/33".parse::<TrustedSubnet>();
    assert!(matches!(result, Err(Error::Configuration { .. })));
}

#[test]
fn test_ipv6_subnet() {
    let subnet: TrustedSubnet = "fd00::/8".parse().expect("valid cidr");
    assert!(subnet.check(Some("fd12::1")).is_ok());
    assert_eq!(subnet.to_string(), "fd00::/8");
}
