//! Per-slot worker set.

use std::sync::Arc;

use crate::config::{ModuleConfig, PreallocationConfiguration, ProcessConfiguration};
use crate::core::activity::ActivityRegistry;
use crate::core::context::GlobalContext;
use crate::core::error::{Exception, ExceptionCollector, ScheduleError};
use crate::core::module::{InjectedModule, Module, ModuleDescription, ModuleFactory};
use crate::core::products::ProductRegistry;
use crate::core::worker::Worker;

/// Owns the workers of exactly one concurrency slot, keyed by label and
/// kept in insertion order.
#[derive(Debug)]
pub struct WorkerManager {
    activity_registry: Arc<ActivityRegistry>,
    workers: Vec<Worker>,
}

impl WorkerManager {
    /// Empty manager whose workers fire module signals on `activity_registry`.
    pub fn new(activity_registry: Arc<ActivityRegistry>) -> Self {
        Self {
            activity_registry,
            workers: Vec::new(),
        }
    }

    fn position(&self, label: &str) -> Option<usize> {
        self.workers
            .iter()
            .position(|w| w.description().module_label() == label)
    }

    /// Worker for `label`, constructing the module on first request.
    ///
    /// The first call builds the module through `factory`, registers its
    /// products and consumes, and stores the new worker. Later calls for
    /// the same label return the stored worker.
    ///
    /// # Errors
    ///
    /// [`ScheduleError::UntrackedConfiguration`] for an untracked
    /// configuration, [`ScheduleError::ModuleConstruction`] if the factory
    /// fails, or a product registration conflict.
    pub fn get_worker(
        &mut self,
        config: &ModuleConfig,
        factory: &dyn ModuleFactory,
        product_registry: &mut ProductRegistry,
        prealloc: &PreallocationConfiguration,
        process: &ProcessConfiguration,
        label: &str,
    ) -> Result<&mut Worker, ScheduleError> {
        if let Some(i) = self.position(label) {
            return Ok(&mut self.workers[i]);
        }
        if !config.tracked {
            return Err(ScheduleError::UntrackedConfiguration(label.to_string()));
        }
        let module = factory
            .build(label, config, prealloc, process)
            .map_err(|source| ScheduleError::ModuleConstruction {
                label: label.to_string(),
                source,
            })?;
        let description = ModuleDescription::new(label, config.module_type.clone());
        self.insert(description, module, product_registry)
    }

    /// Worker for a system-injected module, instantiating the template for
    /// this slot on first request.
    ///
    /// # Errors
    ///
    /// A product registration conflict.
    pub fn get_worker_for_module(
        &mut self,
        injected: &InjectedModule,
        product_registry: &mut ProductRegistry,
    ) -> Result<&mut Worker, ScheduleError> {
        let label = injected.description().module_label();
        if let Some(i) = self.position(label) {
            return Ok(&mut self.workers[i]);
        }
        self.insert(
            injected.description().clone(),
            injected.instantiate(),
            product_registry,
        )
    }

    fn insert(
        &mut self,
        description: ModuleDescription,
        module: Box<dyn Module>,
        product_registry: &mut ProductRegistry,
    ) -> Result<&mut Worker, ScheduleError> {
        let label = description.module_label();
        for product in module.produces() {
            product_registry.add_product(label, &product)?;
        }
        product_registry.set_consumes(label, module.consumes());
        tracing::debug!(module = %description, "worker created");
        self.workers.push(Worker::new(
            description,
            module,
            Arc::clone(&self.activity_registry),
        ));
        let last = self.workers.len() - 1;
        Ok(&mut self.workers[last])
    }

    /// Worker for `label`, if present.
    pub fn worker(&self, label: &str) -> Option<&Worker> {
        self.position(label).map(|i| &self.workers[i])
    }

    /// Mutable worker for `label`, if present.
    pub fn worker_mut(&mut self, label: &str) -> Option<&mut Worker> {
        self.position(label).map(move |i| &mut self.workers[i])
    }

    /// All workers in insertion order.
    pub fn all_workers(&self) -> impl Iterator<Item = &Worker> {
        self.workers.iter()
    }

    /// Number of workers.
    pub fn len(&self) -> usize {
        self.workers.len()
    }

    /// Whether the manager holds no worker.
    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// Remove and drop the worker for `label`. No-op if absent.
    pub fn delete_module_if_exists(&mut self, label: &str) {
        if let Some(i) = self.position(label) {
            let worker = self.workers.remove(i);
            tracing::debug!(module = %worker.description(), "worker deleted");
        }
    }

    /// Run begin-job on every worker in insertion order, stopping at the
    /// first failure.
    ///
    /// # Errors
    ///
    /// The first worker failure.
    pub fn begin_job(&mut self, context: &GlobalContext) -> Result<(), Exception> {
        for worker in &mut self.workers {
            worker.begin_job(context)?;
        }
        Ok(())
    }

    /// Run end-job on every worker in insertion order. Failures go to
    /// `collector` and never stop the loop.
    pub fn end_job(&mut self, collector: &mut ExceptionCollector, context: &GlobalContext) {
        for worker in &mut self.workers {
            collector.call(|| worker.end_job(context));
        }
    }
}
