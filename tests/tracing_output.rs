//! Integration tests for the registry's log output.

use lazy_registry::{with_cleanup, with_setup, Registry};
use tracing_test::traced_test;

#[test]
#[traced_test]
fn test_resolution_is_logged_with_its_key() {
    let mut registry = Registry::new();
    registry.register_named("primary", [with_setup(|| Ok(5432u16))]);

    registry.resolve_named::<u16>("primary").unwrap();

    assert!(logs_contain("resolved"));
    assert!(logs_contain("primary<u16>"));
}

#[test]
#[traced_test]
fn test_failed_resolution_is_logged() {
    let mut registry = Registry::new();
    let _ = registry.resolve::<u16>();

    assert!(logs_contain("resolve failed"));
    assert!(logs_contain("dependency not found"));
}

#[test]
#[traced_test]
fn test_cleanup_logs_a_drain_summary() {
    let mut registry = Registry::new();
    registry.register([
        with_setup(|| Ok(1u8)),
        with_cleanup(|_: &u8| Ok(())),
    ]);

    registry.resolve::<u8>().unwrap();
    registry.cleanup().unwrap();

    assert!(logs_contain("cleanup"));
    assert!(logs_contain("drained=1"));
}
