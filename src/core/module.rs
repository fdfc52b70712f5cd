//! Module abstraction, factories and replacement sources.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::{ModuleConfig, PreallocationConfiguration, ProcessConfiguration};
use crate::core::context::GlobalContext;
use crate::core::error::AppResult;
use crate::core::products::{ConsumesDeclaration, ProductDeclaration};

/// Immutable identity of a configured module.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModuleDescription {
    module_label: String,
    module_type: String,
}

impl ModuleDescription {
    /// Description for `module_label` of plugin type `module_type`.
    pub fn new(module_label: impl Into<String>, module_type: impl Into<String>) -> Self {
        Self {
            module_label: module_label.into(),
            module_type: module_type.into(),
        }
    }

    /// Label, unique within a job.
    pub fn module_label(&self) -> &str {
        &self.module_label
    }

    /// Plugin type name.
    pub fn module_type(&self) -> &str {
        &self.module_type
    }
}

impl fmt::Display for ModuleDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/'{}'", self.module_type, self.module_label)
    }
}

/// A pluggable unit of computation.
///
/// Every hook has a no-op default so modules implement only what they use.
pub trait Module: Send + Sync {
    /// Called once per worker before the module is first used.
    fn begin_job(&mut self, _context: &GlobalContext) -> AppResult<()> {
        Ok(())
    }

    /// Called once per worker at the end of the job.
    fn end_job(&mut self, _context: &GlobalContext) -> AppResult<()> {
        Ok(())
    }

    /// Products this module puts into the event.
    fn produces(&self) -> Vec<ProductDeclaration> {
        Vec::new()
    }

    /// Products this module reads.
    fn consumes(&self) -> Vec<ConsumesDeclaration> {
        Vec::new()
    }
}

/// Turns a label and its configuration into a module instance.
///
/// Must be deterministic: a schedule calls it once per slot for every label
/// and expects equivalent modules each time.
pub trait ModuleFactory: Send + Sync {
    /// Construct the module configured under `label`.
    ///
    /// # Errors
    ///
    /// Any construction failure; it aborts schedule construction.
    fn build(
        &self,
        label: &str,
        config: &ModuleConfig,
        prealloc: &PreallocationConfiguration,
        process: &ProcessConfiguration,
    ) -> AppResult<Box<dyn Module>>;
}

type Maker = Box<dyn Fn(&str, &ModuleConfig) -> AppResult<Box<dyn Module>> + Send + Sync>;

/// [`ModuleFactory`] dispatching on [`ModuleConfig::module_type`].
#[derive(Default)]
pub struct MakerRegistry {
    makers: HashMap<String, Maker>,
}

impl MakerRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the constructor for `module_type`, replacing any earlier one.
    pub fn register<F>(&mut self, module_type: impl Into<String>, maker: F)
    where
        F: Fn(&str, &ModuleConfig) -> AppResult<Box<dyn Module>> + Send + Sync + 'static,
    {
        self.makers.insert(module_type.into(), Box::new(maker));
    }

    /// Builder-style [`MakerRegistry::register`].
    #[must_use]
    pub fn with_maker<F>(mut self, module_type: impl Into<String>, maker: F) -> Self
    where
        F: Fn(&str, &ModuleConfig) -> AppResult<Box<dyn Module>> + Send + Sync + 'static,
    {
        self.register(module_type, maker);
        self
    }

    /// Whether a constructor exists for `module_type`.
    pub fn contains(&self, module_type: &str) -> bool {
        self.makers.contains_key(module_type)
    }
}

impl fmt::Debug for MakerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut types: Vec<&String> = self.makers.keys().collect();
        types.sort();
        f.debug_struct("MakerRegistry").field("types", &types).finish()
    }
}

impl ModuleFactory for MakerRegistry {
    fn build(
        &self,
        label: &str,
        config: &ModuleConfig,
        _prealloc: &PreallocationConfiguration,
        _process: &ProcessConfiguration,
    ) -> AppResult<Box<dyn Module>> {
        let maker = self.makers.get(&config.module_type).ok_or_else(|| {
            anyhow::anyhow!(
                "no maker registered for module type `{}` (label `{label}`)",
                config.module_type
            )
        })?;
        maker(label, config)
    }
}

type Instantiate = Arc<dyn Fn() -> Box<dyn Module> + Send + Sync>;

/// Template for a system-injected module.
///
/// Each slot gets its own instance, produced by calling the template once
/// per worker manager.
#[derive(Clone)]
pub struct InjectedModule {
    description: ModuleDescription,
    instantiate: Instantiate,
}

impl InjectedModule {
    /// Template producing instances via `instantiate`.
    pub fn new<F>(description: ModuleDescription, instantiate: F) -> Self
    where
        F: Fn() -> Box<dyn Module> + Send + Sync + 'static,
    {
        Self {
            description,
            instantiate: Arc::new(instantiate),
        }
    }

    /// Description shared by every instance.
    pub const fn description(&self) -> &ModuleDescription {
        &self.description
    }

    /// Produce a fresh instance.
    pub fn instantiate(&self) -> Box<dyn Module> {
        (self.instantiate)()
    }
}

impl fmt::Debug for InjectedModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InjectedModule")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

type Replacement = Box<dyn Fn() -> AppResult<Box<dyn Module>> + Send + Sync>;

/// Source of replacement module instances for
/// [`GlobalSchedule::replace_module`](crate::core::GlobalSchedule::replace_module).
pub struct ModuleHolder {
    module_type: String,
    make: Replacement,
}

impl ModuleHolder {
    /// Holder creating replacements of `module_type` with `make`.
    pub fn new<F>(module_type: impl Into<String>, make: F) -> Self
    where
        F: Fn() -> AppResult<Box<dyn Module>> + Send + Sync + 'static,
    {
        Self {
            module_type: module_type.into(),
            make: Box::new(make),
        }
    }

    /// Holder rebuilding `label` through a factory from `config`.
    pub fn from_factory(
        factory: Arc<dyn ModuleFactory>,
        label: impl Into<String>,
        config: ModuleConfig,
        prealloc: PreallocationConfiguration,
        process: ProcessConfiguration,
    ) -> Self {
        let label = label.into();
        let module_type = config.module_type.clone();
        Self::new(module_type, move || {
            factory.build(&label, &config, &prealloc, &process)
        })
    }

    /// Plugin type of the replacements.
    pub fn module_type(&self) -> &str {
        &self.module_type
    }

    /// Produce a fresh replacement instance.
    ///
    /// # Errors
    ///
    /// Whatever the construction closure reports.
    pub fn make_module(&self) -> AppResult<Box<dyn Module>> {
        (self.make)()
    }
}

impl fmt::Debug for ModuleHolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleHolder")
            .field("module_type", &self.module_type)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Noop;
    impl Module for Noop {}

    #[test]
    fn test_description_display() {
        let desc = ModuleDescription::new("tracks", "TrackProducer");
        assert_eq!(desc.to_string(), "TrackProducer/'tracks'");
    }

    #[test]
    fn test_maker_registry_dispatch() {
        let registry = MakerRegistry::new().with_maker("Noop", |_, _| Ok(Box::new(Noop)));
        let prealloc = PreallocationConfiguration::default();
        let process = ProcessConfiguration::new("TEST", "");
        assert!(registry
            .build("a", &ModuleConfig::new("Noop"), &prealloc, &process)
            .is_ok());
        let err = registry
            .build("b", &ModuleConfig::new("Missing"), &prealloc, &process)
            .err()
            .unwrap();
        assert!(err.to_string().contains("Missing"));
    }

    #[test]
    fn test_holder_builds_each_call() {
        let holder = ModuleHolder::new("Noop", || Ok(Box::new(Noop)));
        assert_eq!(holder.module_type(), "Noop");
        assert!(holder.make_module().is_ok());
        assert!(holder.make_module().is_ok());
    }
}
