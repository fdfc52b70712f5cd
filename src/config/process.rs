//! Process identity configuration.

use serde::{Deserialize, Serialize};

/// Name and release of the running process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessConfiguration {
    /// Process name, unique within a processing history.
    pub process_name: String,
    /// Software release the process runs with.
    #[serde(default)]
    pub release_version: String,
}

impl ProcessConfiguration {
    /// Create a process configuration.
    pub fn new(process_name: impl Into<String>, release_version: impl Into<String>) -> Self {
        Self {
            process_name: process_name.into(),
            release_version: release_version.into(),
        }
    }

    /// Validate the process name.
    pub fn validate(&self) -> Result<(), String> {
        if self.process_name.trim().is_empty() {
            return Err("process_name must not be empty".into());
        }
        Ok(())
    }
}
