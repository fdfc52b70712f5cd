//! Module parameter sets keyed by label.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

const fn default_tracked() -> bool {
    true
}

/// Configuration of one module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleConfig {
    /// Plugin type name the factory dispatches on.
    pub module_type: String,
    /// Untracked parameter sets cannot configure modules.
    #[serde(default = "default_tracked")]
    pub tracked: bool,
    /// Free-form parameters handed to the module constructor.
    #[serde(default)]
    pub parameters: serde_json::Value,
}

impl ModuleConfig {
    /// Tracked configuration with no parameters.
    pub fn new(module_type: impl Into<String>) -> Self {
        Self {
            module_type: module_type.into(),
            tracked: true,
            parameters: serde_json::Value::Null,
        }
    }

    /// Attach parameters.
    #[must_use]
    pub fn with_parameters(mut self, parameters: serde_json::Value) -> Self {
        self.parameters = parameters;
        self
    }
}

/// Process parameter set: module configurations by label.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterSet {
    modules: BTreeMap<String, ModuleConfig>,
}

impl ParameterSet {
    /// Empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the configuration for `label`.
    pub fn insert(&mut self, label: impl Into<String>, config: ModuleConfig) {
        self.modules.insert(label.into(), config);
    }

    /// Builder-style [`ParameterSet::insert`].
    #[must_use]
    pub fn with_module(mut self, label: impl Into<String>, config: ModuleConfig) -> Self {
        self.insert(label, config);
        self
    }

    /// Configuration for `label`.
    pub fn get(&self, label: &str) -> Option<&ModuleConfig> {
        self.modules.get(label)
    }

    /// Mutable configuration for `label`, used while building workers.
    pub fn pset_for_update(&mut self, label: &str) -> Option<&mut ModuleConfig> {
        self.modules.get_mut(label)
    }

    /// Configured labels in sorted order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }

    /// Number of configured modules.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Whether no module is configured.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Validate every module configuration.
    pub fn validate(&self) -> Result<(), String> {
        for (label, config) in &self.modules {
            if label.is_empty() {
                return Err("module label must not be empty".into());
            }
            if config.module_type.is_empty() {
                return Err(format!("module `{label}` has no module_type"));
            }
        }
        Ok(())
    }
}
