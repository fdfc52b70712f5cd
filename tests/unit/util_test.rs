//! Tests for utility functions

use global_schedule::util::{init_test_tracing, init_tracing, DEFAULT_FILTER};

#[test]
fn test_default_filter_targets_crate() {
    assert!(DEFAULT_FILTER.starts_with("global_schedule="));
}

#[test]
fn test_tracing_init_is_repeatable() {
    init_test_tracing();
    init_tracing();
    init_test_tracing();
    tracing::info!("tracing initialized twice without panicking");
}
