//! Builder assembling a [`GlobalSchedule`] from its collaborators.

use std::sync::Arc;

use crate::config::{JobConfig, ParameterSet, PreallocationConfiguration, ProcessConfiguration};
use crate::core::{
    ActivityRegistry, EndPathStatusInserter, GlobalSchedule, InjectedModule, ModuleFactory,
    PathStatusInserter, ProcessContext, ProductRegistry, ScheduleError, TriggerResultInserter,
};

/// Collects the inputs of [`GlobalSchedule::new`].
///
/// Injected modules are wired after all configured modules, in the order
/// trigger results inserter, path status inserters, end path status
/// inserters, regardless of the order the builder methods were called in.
#[derive(Debug)]
pub struct GlobalScheduleBuilder {
    prealloc: PreallocationConfiguration,
    process_context: Arc<ProcessContext>,
    activity_registry: Arc<ActivityRegistry>,
    modules_to_use: Vec<String>,
    trigger_results: Option<InjectedModule>,
    path_status: Vec<InjectedModule>,
    end_path_status: Vec<InjectedModule>,
    extra: Vec<InjectedModule>,
}

impl GlobalScheduleBuilder {
    /// Builder with no modules and a fresh activity registry.
    pub fn new(prealloc: PreallocationConfiguration, process_context: Arc<ProcessContext>) -> Self {
        Self {
            prealloc,
            process_context,
            activity_registry: Arc::new(ActivityRegistry::new()),
            modules_to_use: Vec::new(),
            trigger_results: None,
            path_status: Vec::new(),
            end_path_status: Vec::new(),
            extra: Vec::new(),
        }
    }

    /// Builder pre-filled from a job configuration. The parameter set
    /// itself is passed to [`GlobalScheduleBuilder::build`].
    ///
    /// # Errors
    ///
    /// [`ScheduleError::InvalidConfig`] if the job configuration is invalid.
    pub fn from_job_config(config: &JobConfig) -> Result<Self, ScheduleError> {
        config.validate().map_err(ScheduleError::InvalidConfig)?;
        let process = Arc::new(ProcessContext::new(Arc::new(config.process.clone())));
        let mut builder = Self::new(config.concurrency.clone(), process)
            .modules(config.schedule.iter().cloned());
        if config.trigger_results {
            builder = builder.trigger_results_inserter();
        }
        for path in &config.paths {
            builder = builder.path_status_inserter(path);
        }
        for end_path in &config.end_paths {
            builder = builder.end_path_status_inserter(end_path);
        }
        Ok(builder)
    }

    /// Process context from a bare process configuration.
    pub fn process_context_for(process: ProcessConfiguration) -> Arc<ProcessContext> {
        Arc::new(ProcessContext::new(Arc::new(process)))
    }

    /// Share an existing activity registry.
    #[must_use]
    pub fn activity_registry(mut self, registry: Arc<ActivityRegistry>) -> Self {
        self.activity_registry = registry;
        self
    }

    /// Append module labels to schedule.
    #[must_use]
    pub fn modules<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.modules_to_use.extend(labels.into_iter().map(Into::into));
        self
    }

    /// Inject the trigger results inserter.
    #[must_use]
    pub fn trigger_results_inserter(mut self) -> Self {
        self.trigger_results = Some(TriggerResultInserter::injected());
        self
    }

    /// Inject a path status inserter for `path_name`.
    #[must_use]
    pub fn path_status_inserter(mut self, path_name: &str) -> Self {
        self.path_status.push(PathStatusInserter::injected(path_name));
        self
    }

    /// Inject an end path status inserter for `end_path_name`.
    #[must_use]
    pub fn end_path_status_inserter(mut self, end_path_name: &str) -> Self {
        self.end_path_status
            .push(EndPathStatusInserter::injected(end_path_name));
        self
    }

    /// Inject an arbitrary system module after the built-in inserters.
    #[must_use]
    pub fn injected_module(mut self, module: InjectedModule) -> Self {
        self.extra.push(module);
        self
    }

    /// Construct the schedule.
    ///
    /// # Errors
    ///
    /// See [`GlobalSchedule::new`].
    pub fn build(
        self,
        pset: &mut ParameterSet,
        factory: &dyn ModuleFactory,
        product_registry: &mut ProductRegistry,
    ) -> Result<GlobalSchedule, ScheduleError> {
        let injected: Vec<InjectedModule> = self
            .trigger_results
            .into_iter()
            .chain(self.path_status)
            .chain(self.end_path_status)
            .chain(self.extra)
            .collect();
        GlobalSchedule::new(
            &injected,
            &self.modules_to_use,
            pset,
            factory,
            product_registry,
            &self.prealloc,
            self.activity_registry,
            self.process_context,
        )
    }
}
