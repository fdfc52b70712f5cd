//! Tests for configuration validation

use std::collections::HashMap;

use global_schedule::config::{JobConfig, PreallocationConfiguration, ProcessConfiguration};

#[test]
fn test_prealloc_validation() {
    assert!(PreallocationConfiguration::new(2, 1).validate().is_ok());
    assert!(PreallocationConfiguration::new(0, 1).validate().is_err());
    assert!(PreallocationConfiguration::new(1, 0).validate().is_err());
    assert!(PreallocationConfiguration::new(1, 1)
        .with_streams(0)
        .validate()
        .is_err());
    // Zero process blocks is a valid layout.
    assert!(PreallocationConfiguration::new(1, 1)
        .with_process_blocks(0)
        .validate()
        .is_ok());
}

#[test]
fn test_prealloc_from_lookup() {
    let vars: HashMap<&str, &str> = [
        ("GLOBAL_SCHEDULE_THREADS", "8"),
        ("GLOBAL_SCHEDULE_CONCURRENT_LUMIS", " 3 "),
        ("GLOBAL_SCHEDULE_CONCURRENT_RUNS", "2"),
    ]
    .into_iter()
    .collect();
    let cfg =
        PreallocationConfiguration::from_lookup(|key| vars.get(key).map(ToString::to_string))
            .unwrap();
    assert_eq!(cfg.number_of_threads, 8);
    assert_eq!(cfg.number_of_streams, 1);
    assert_eq!(cfg.number_of_luminosity_blocks, 3);
    assert_eq!(cfg.number_of_runs, 2);
    assert_eq!(cfg.number_of_process_blocks, 1);
}

#[test]
fn test_prealloc_from_lookup_rejects_garbage() {
    let err = PreallocationConfiguration::from_lookup(|key| {
        (key == "GLOBAL_SCHEDULE_CONCURRENT_RUNS").then(|| "many".to_string())
    })
    .unwrap_err();
    assert!(err.starts_with("GLOBAL_SCHEDULE_CONCURRENT_RUNS"));
}

#[test]
fn test_process_validation() {
    assert!(ProcessConfiguration::new("RECO", "1.0").validate().is_ok());
    assert!(ProcessConfiguration::new("  ", "1.0").validate().is_err());
}

#[test]
fn test_job_config_from_json() {
    let json = r#"{
        "process": { "process_name": "RECO" },
        "concurrency": { "number_of_luminosity_blocks": 2 },
        "modules": {
            "tracks": { "module_type": "TrackProducer", "parameters": { "cut": 1.5 } },
            "hits": { "module_type": "HitProducer", "tracked": false }
        },
        "schedule": ["hits", "tracks", "p1"],
        "paths": ["p1"],
        "trigger_results": true
    }"#;
    let cfg = JobConfig::from_json_str(json).unwrap();
    assert_eq!(cfg.process.process_name, "RECO");
    assert_eq!(cfg.concurrency.number_of_luminosity_blocks, 2);
    assert_eq!(cfg.concurrency.number_of_runs, 1);
    assert_eq!(cfg.modules.len(), 2);
    assert!(cfg.modules.get("tracks").unwrap().tracked);
    assert!(!cfg.modules.get("hits").unwrap().tracked);
    assert_eq!(cfg.schedule, vec!["hits", "tracks", "p1"]);
    assert!(cfg.trigger_results);
    assert!(cfg.end_paths.is_empty());
}

#[test]
fn test_job_config_rejects_path_named_like_module() {
    let json = r#"{
        "process": { "process_name": "RECO" },
        "modules": { "p1": { "module_type": "X" } },
        "paths": ["p1"]
    }"#;
    let err = JobConfig::from_json_str(json).unwrap_err();
    assert!(err.contains("p1"));
}

#[test]
fn test_job_config_rejects_missing_module_type() {
    let json = r#"{
        "process": { "process_name": "RECO" },
        "modules": { "a": { "module_type": "" } }
    }"#;
    assert!(JobConfig::from_json_str(json).is_err());
}

#[test]
fn test_job_config_parse_error() {
    let err = JobConfig::from_json_str("{ not json").unwrap_err();
    assert!(err.starts_with("parse error"));
}
