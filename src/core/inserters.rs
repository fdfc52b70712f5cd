//! System-injected modules recording trigger and path status.

use crate::core::module::{InjectedModule, Module, ModuleDescription};
use crate::core::products::ProductDeclaration;

/// Label of the trigger results inserter.
pub const TRIGGER_RESULTS_LABEL: &str = "TriggerResults";

const TRIGGER_RESULTS_TYPE: &str = "TriggerResultInserter";
const PATH_STATUS_TYPE: &str = "PathStatusInserter";
const END_PATH_STATUS_TYPE: &str = "EndPathStatusInserter";

/// Writes the combined trigger decision of all paths.
#[derive(Debug, Default)]
pub struct TriggerResultInserter;

impl Module for TriggerResultInserter {
    fn produces(&self) -> Vec<ProductDeclaration> {
        vec![ProductDeclaration::new("TriggerResults")]
    }
}

impl TriggerResultInserter {
    /// Template injecting this inserter under [`TRIGGER_RESULTS_LABEL`].
    pub fn injected() -> InjectedModule {
        InjectedModule::new(
            ModuleDescription::new(TRIGGER_RESULTS_LABEL, TRIGGER_RESULTS_TYPE),
            || Box::new(Self),
        )
    }
}

/// Writes the status of one path.
#[derive(Debug)]
pub struct PathStatusInserter;

impl Module for PathStatusInserter {
    fn produces(&self) -> Vec<ProductDeclaration> {
        vec![ProductDeclaration::new("PathStatus")]
    }
}

impl PathStatusInserter {
    /// Template injecting the inserter for `path_name`, labelled by the path.
    pub fn injected(path_name: &str) -> InjectedModule {
        InjectedModule::new(ModuleDescription::new(path_name, PATH_STATUS_TYPE), || {
            Box::new(Self)
        })
    }
}

/// Writes the status of one end path.
#[derive(Debug)]
pub struct EndPathStatusInserter;

impl Module for EndPathStatusInserter {
    fn produces(&self) -> Vec<ProductDeclaration> {
        vec![ProductDeclaration::new("EndPathStatus")]
    }
}

impl EndPathStatusInserter {
    /// Template injecting the inserter for `end_path_name`.
    pub fn injected(end_path_name: &str) -> InjectedModule {
        InjectedModule::new(
            ModuleDescription::new(end_path_name, END_PATH_STATUS_TYPE),
            || Box::new(Self),
        )
    }
}
