//! Tests for the schedule builder

use std::sync::Arc;

use global_schedule::builders::GlobalScheduleBuilder;
use global_schedule::config::{JobConfig, PreallocationConfiguration, ProcessConfiguration};
use global_schedule::core::{
    ActivityRegistry, InjectedModule, MakerRegistry, Module, ModuleDescription, ProductRegistry,
    ScheduleError, Slot,
};

struct Noop;

impl Module for Noop {}

fn factory() -> MakerRegistry {
    MakerRegistry::new().with_maker("Noop", |_, _| Ok(Box::new(Noop)))
}

fn labels_in_job_slot(builder: GlobalScheduleBuilder, job: &JobConfig) -> Vec<String> {
    let mut pset = job.modules.clone();
    let schedule = builder
        .build(&mut pset, &factory(), &mut ProductRegistry::new())
        .unwrap();
    schedule
        .worker_manager(Slot::Job)
        .unwrap()
        .all_workers()
        .map(|w| w.description().module_label().to_string())
        .collect()
}

#[test]
fn test_builder_from_job_config_wires_inserters() {
    let job = JobConfig::from_json_str(
        r#"{
            "process": { "process_name": "RECO" },
            "modules": { "a": { "module_type": "Noop" }, "b": { "module_type": "Noop" } },
            "schedule": ["a", "b", "p1", "e1"],
            "paths": ["p1"],
            "end_paths": ["e1"],
            "trigger_results": true
        }"#,
    )
    .unwrap();
    let builder = GlobalScheduleBuilder::from_job_config(&job).unwrap();
    assert_eq!(
        labels_in_job_slot(builder, &job),
        vec!["a", "b", "TriggerResults", "p1", "e1"]
    );
}

#[test]
fn test_builder_rejects_invalid_job_config() {
    let mut job = JobConfig::from_json_str(r#"{ "process": { "process_name": "RECO" } }"#).unwrap();
    job.process.process_name.clear();
    let err = GlobalScheduleBuilder::from_job_config(&job).unwrap_err();
    assert!(matches!(err, ScheduleError::InvalidConfig(_)));
}

#[test]
fn test_builder_extra_injected_module_comes_last() {
    let process = GlobalScheduleBuilder::process_context_for(ProcessConfiguration::new("RECO", ""));
    let job = JobConfig::from_json_str(
        r#"{ "process": { "process_name": "RECO" }, "modules": { "a": { "module_type": "Noop" } } }"#,
    )
    .unwrap();
    let builder = GlobalScheduleBuilder::new(PreallocationConfiguration::new(1, 1), process)
        .modules(["a"])
        .injected_module(InjectedModule::new(
            ModuleDescription::new("monitor", "Noop"),
            || Box::new(Noop),
        ))
        .trigger_results_inserter();
    assert_eq!(
        labels_in_job_slot(builder, &job),
        vec!["a", "TriggerResults", "monitor"]
    );
}

#[test]
fn test_builder_shares_activity_registry() {
    let registry = Arc::new(ActivityRegistry::new());
    let process = GlobalScheduleBuilder::process_context_for(ProcessConfiguration::new("RECO", ""));
    let schedule = GlobalScheduleBuilder::new(PreallocationConfiguration::new(1, 1), process)
        .activity_registry(Arc::clone(&registry))
        .build(
            &mut global_schedule::config::ParameterSet::new(),
            &factory(),
            &mut ProductRegistry::new(),
        )
        .unwrap();
    assert!(Arc::ptr_eq(schedule.activity_registry(), &registry));
    assert_eq!(schedule.process_context().process_name(), "RECO");
}
