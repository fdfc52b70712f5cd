//! Shared fakes for schedule integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use global_schedule::config::{ModuleConfig, ParameterSet, PreallocationConfiguration, ProcessConfiguration};
use global_schedule::core::{
    AppResult, GlobalContext, GlobalSchedule, MakerRegistry, Module, ProcessContext,
    ProductDeclaration, ProductRegistry,
};
use global_schedule::builders::GlobalScheduleBuilder;
use parking_lot::Mutex;

/// Shared, ordered record of what modules and subscribers did.
pub type Log = Arc<Mutex<Vec<String>>>;

pub const RECORDING: &str = "Recording";
pub const BROKEN: &str = "Broken";

pub fn new_log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn entries(log: &Log) -> Vec<String> {
    log.lock().clone()
}

pub fn count(log: &Log, entry: &str) -> usize {
    log.lock().iter().filter(|e| *e == entry).count()
}

/// Module that logs `begin:<label><tag>` / `end:<label><tag>`.
pub struct RecordingModule {
    label: String,
    tag: String,
    log: Log,
    fail_begin: bool,
    fail_end: bool,
}

impl RecordingModule {
    pub fn new(label: &str, log: Log) -> Self {
        Self {
            label: label.to_string(),
            tag: String::new(),
            log,
            fail_begin: false,
            fail_end: false,
        }
    }

    pub fn tagged(mut self, tag: &str) -> Self {
        self.tag = format!("@{tag}");
        self
    }
}

impl Module for RecordingModule {
    fn begin_job(&mut self, _context: &GlobalContext) -> AppResult<()> {
        self.log.lock().push(format!("begin:{}{}", self.label, self.tag));
        if self.fail_begin {
            anyhow::bail!("{} failed in beginJob", self.label);
        }
        Ok(())
    }

    fn end_job(&mut self, _context: &GlobalContext) -> AppResult<()> {
        self.log.lock().push(format!("end:{}{}", self.label, self.tag));
        if self.fail_end {
            anyhow::bail!("{} failed in endJob", self.label);
        }
        Ok(())
    }

    fn produces(&self) -> Vec<ProductDeclaration> {
        vec![ProductDeclaration::new(format!("{}Product", self.label))]
    }
}

/// Factory building `Recording` modules (honouring `fail_begin` /
/// `fail_end` parameters) and refusing to build `Broken` ones.
pub fn factory(log: &Log) -> MakerRegistry {
    let log = Arc::clone(log);
    MakerRegistry::new()
        .with_maker(RECORDING, move |label, config| {
            let mut module = RecordingModule::new(label, Arc::clone(&log));
            module.fail_begin = config.parameters["fail_begin"].as_bool().unwrap_or(false);
            module.fail_end = config.parameters["fail_end"].as_bool().unwrap_or(false);
            Ok(Box::new(module))
        })
        .with_maker(BROKEN, |label, _| anyhow::bail!("cannot build {label}"))
}

pub fn recording_pset(labels: &[&str]) -> ParameterSet {
    labels.iter().fold(ParameterSet::new(), |pset, label| {
        pset.with_module(*label, ModuleConfig::new(RECORDING))
    })
}

pub fn failing_config(fail_begin: bool, fail_end: bool) -> ModuleConfig {
    ModuleConfig::new(RECORDING).with_parameters(serde_json::json!({
        "fail_begin": fail_begin,
        "fail_end": fail_end,
    }))
}

pub fn process() -> Arc<ProcessContext> {
    GlobalScheduleBuilder::process_context_for(ProcessConfiguration::new("TEST", "1.0"))
}

pub struct Fixture {
    pub schedule: GlobalSchedule,
    pub log: Log,
    pub products: ProductRegistry,
}

/// Schedule over `labels` with `lumis` lumi slots, `runs` run slots and no
/// process-block slot.
pub fn fixture_with(labels: &[&str], mut pset: ParameterSet, lumis: u32, runs: u32) -> Fixture {
    let log = new_log();
    let mut products = ProductRegistry::new();
    let prealloc = PreallocationConfiguration::new(lumis, runs).with_process_blocks(0);
    let schedule = GlobalScheduleBuilder::new(prealloc, process())
        .modules(labels.iter().copied())
        .build(&mut pset, &factory(&log), &mut products)
        .expect("schedule builds");
    Fixture {
        schedule,
        log,
        products,
    }
}

pub fn fixture(labels: &[&str]) -> Fixture {
    fixture_with(labels, recording_pset(labels), 2, 2)
}
