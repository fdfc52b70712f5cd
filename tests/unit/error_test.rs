//! Tests for error types

use global_schedule::core::{Exception, ExceptionCollector, ScheduleError};

#[test]
fn test_untracked_configuration_error() {
    let err = ScheduleError::UntrackedConfiguration("tracks".to_string());
    assert!(format!("{err}").contains("tracks"));
}

#[test]
fn test_module_construction_error_keeps_source() {
    let err = ScheduleError::ModuleConstruction {
        label: "tracks".to_string(),
        source: anyhow::anyhow!("missing calibration"),
    };
    assert!(format!("{err}").contains("tracks"));
    let source = std::error::Error::source(&err).map(ToString::to_string);
    assert_eq!(source.as_deref(), Some("missing calibration"));
}

#[test]
fn test_exception_display_lists_context_outermost_first() {
    let mut ex = Exception::new("Module", "bad input");
    ex.add_context("Calling beginJob for module Producer/'p'");
    ex.add_context("Processing begin Job for process 'TEST'");
    let rendered = ex.to_string();
    let outer = rendered.find("Processing begin Job").unwrap();
    let inner = rendered.find("Calling beginJob").unwrap();
    assert!(rendered.starts_with("[Module] bad input"));
    assert!(outer < inner);
}

#[test]
fn test_exception_from_anyhow_unwraps_exception() {
    let original = Exception::new("Configuration", "missing parameter");
    let ex = Exception::from_anyhow(anyhow::Error::new(original));
    assert_eq!(ex.category(), "Configuration");
    assert_eq!(ex.message(), "missing parameter");
}

#[test]
fn test_collector_single_error_passes_through() {
    let mut collector = ExceptionCollector::new("endJob");
    collector.call(|| Ok(()));
    collector.call(|| Err(Exception::new("Module", "only one")));
    let err = collector.finish().unwrap_err();
    assert_eq!(err.message(), "only one");
}

#[test]
fn test_collector_multiple_errors_combined() {
    let mut collector = ExceptionCollector::new("endJob");
    collector.add(Exception::new("Module", "first"));
    collector.add(Exception::new("Module", "second"));
    assert!(collector.has_thrown());
    let err = collector.finish().unwrap_err();
    assert!(err.message().contains("first"));
    assert!(err.message().contains("second"));
}
