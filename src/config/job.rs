//! Root job configuration.

use serde::{Deserialize, Serialize};

use super::{ParameterSet, PreallocationConfiguration, ProcessConfiguration};

/// Everything needed to build a schedule for one job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    /// Process identity.
    pub process: ProcessConfiguration,
    /// Concurrency slot counts.
    #[serde(default)]
    pub concurrency: PreallocationConfiguration,
    /// Module configurations by label.
    #[serde(default)]
    pub modules: ParameterSet,
    /// Labels of the modules to schedule, in order.
    #[serde(default)]
    pub schedule: Vec<String>,
    /// Path names; each gets a path status inserter.
    #[serde(default)]
    pub paths: Vec<String>,
    /// End path names; each gets an end path status inserter.
    #[serde(default)]
    pub end_paths: Vec<String>,
    /// Whether to inject the trigger results inserter.
    #[serde(default)]
    pub trigger_results: bool,
}

impl JobConfig {
    /// Validate all sections and check that paths do not collide with labels.
    pub fn validate(&self) -> Result<(), String> {
        self.process
            .validate()
            .map_err(|e| format!("process invalid: {e}"))?;
        self.concurrency
            .validate()
            .map_err(|e| format!("concurrency invalid: {e}"))?;
        self.modules
            .validate()
            .map_err(|e| format!("modules invalid: {e}"))?;
        for name in self.paths.iter().chain(&self.end_paths) {
            if self.modules.get(name).is_some() {
                return Err(format!("path `{name}` collides with a module label"));
            }
        }
        Ok(())
    }

    /// Parse job configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }
}
