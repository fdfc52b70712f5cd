//! Job-level schedule owning one worker manager per concurrency slot.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::{ParameterSet, PreallocationConfiguration};
use crate::core::activity::{ActivityRegistry, EarlyTermination, TerminationOrigin};
use crate::core::context::{GlobalContext, ProcessContext, Transition};
use crate::core::error::{Exception, ExceptionCollector, ScheduleError};
use crate::core::module::{InjectedModule, ModuleDescription, ModuleFactory, ModuleHolder};
use crate::core::products::ProductRegistry;
use crate::core::service::{add_context_and_report, Operate, ServiceWeakToken};
use crate::core::slot::{Slot, SlotLayout};
use crate::core::transition::run_transition;
use crate::core::worker::Worker;
use crate::core::worker_manager::WorkerManager;

/// How [`GlobalSchedule::replace_module_with_policy`] treats a slot that
/// has no worker for the label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplaceScanPolicy {
    /// Stop scanning; later slots keep their old module even if they hold
    /// the label.
    #[default]
    StopAtFirstMissingSlot,
    /// Skip the slot and keep scanning.
    VisitEverySlot,
}

impl ReplaceScanPolicy {
    const fn continues_past_missing_slot(self) -> bool {
        matches!(self, Self::VisitEverySlot)
    }
}

/// Policy used by [`GlobalSchedule::replace_module`].
pub const REPLACE_SCAN_POLICY: ReplaceScanPolicy = ReplaceScanPolicy::StopAtFirstMissingSlot;

/// Owns a fixed pool of worker managers, one per concurrency slot, each
/// holding an equivalent worker set.
///
/// Begin-job and end-job act on the job slot only. Replacement and deletion
/// act on every slot and must only run while per-event work is quiesced;
/// see [`SharedSchedule`](crate::core::SharedSchedule).
#[derive(Debug)]
pub struct GlobalSchedule {
    activity_registry: Arc<ActivityRegistry>,
    process_context: Arc<ProcessContext>,
    layout: SlotLayout,
    worker_managers: Vec<WorkerManager>,
}

impl GlobalSchedule {
    /// Build every slot's worker set.
    ///
    /// Each label in `modules_to_use` with a configuration in `pset` gets a
    /// worker in every slot. Labels without a configuration belong to
    /// system-injected modules, which are instead instantiated from
    /// `injected`, again once per slot.
    ///
    /// # Errors
    ///
    /// Invalid slot counts, or the first worker construction failure. No
    /// partial schedule is returned.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        injected: &[InjectedModule],
        modules_to_use: &[String],
        pset: &mut ParameterSet,
        factory: &dyn ModuleFactory,
        product_registry: &mut ProductRegistry,
        prealloc: &PreallocationConfiguration,
        activity_registry: Arc<ActivityRegistry>,
        process_context: Arc<ProcessContext>,
    ) -> Result<Self, ScheduleError> {
        prealloc.validate().map_err(ScheduleError::InvalidConfig)?;
        let layout = SlotLayout::from_prealloc(prealloc);
        let mut worker_managers: Vec<WorkerManager> = (0..layout.len())
            .map(|_| WorkerManager::new(Arc::clone(&activity_registry)))
            .collect();

        let process = process_context.configuration();
        for label in modules_to_use {
            let Some(config) = pset.pset_for_update(label) else {
                debug!(label = %label, "no configuration, expecting a system-injected module");
                continue;
            };
            for manager in &mut worker_managers {
                manager.get_worker(config, factory, product_registry, prealloc, process, label)?;
            }
        }
        for module in injected {
            for manager in &mut worker_managers {
                manager.get_worker_for_module(module, product_registry)?;
            }
        }

        info!(
            lumi_slots = prealloc.number_of_luminosity_blocks,
            run_slots = prealloc.number_of_runs,
            process_block_slots = prealloc.number_of_process_blocks,
            workers_per_slot = worker_managers.last().map_or(0, WorkerManager::len),
            "global schedule constructed"
        );

        Ok(Self {
            activity_registry,
            process_context,
            layout,
            worker_managers,
        })
    }

    fn context(&self, transition: Transition) -> GlobalContext {
        GlobalContext::new(transition, Arc::clone(&self.process_context))
    }

    /// Run the begin-job transition on the job slot.
    ///
    /// # Errors
    ///
    /// The first failure among the pre-signal, the job slot's workers and
    /// the post-signal.
    pub fn begin_job(&mut self) -> Result<(), Exception> {
        let context = self.context(Transition::BeginJob);
        let registry = Arc::clone(&self.activity_registry);
        let manager = &mut self.worker_managers[self.layout.job_index()];
        info!("begin job");
        run_transition(
            &context,
            || registry.pre_begin_job.emit(&context),
            || manager.begin_job(&context),
            || registry.post_begin_job.emit(&context),
        )
        .into_result()
    }

    /// Run the end-job transition on the job slot.
    ///
    /// Every worker gets its end-job call. Worker failures and the first
    /// signal failure are added to `collector`.
    pub fn end_job(&mut self, collector: &mut ExceptionCollector) {
        let context = self.context(Transition::EndJob);
        let registry = Arc::clone(&self.activity_registry);
        let manager = &mut self.worker_managers[self.layout.job_index()];
        info!("end job");
        let outcome = run_transition(
            &context,
            || registry.pre_end_job.emit(&context),
            || {
                manager.end_job(collector, &context);
                Ok(())
            },
            || registry.post_end_job.emit(&context),
        );
        if let Err(err) = outcome.into_result() {
            collector.add(err);
        }
    }

    /// Swap the module behind `label` in every slot, scanning slots in
    /// order under [`REPLACE_SCAN_POLICY`].
    ///
    /// # Errors
    ///
    /// See [`GlobalSchedule::replace_module_with_policy`].
    pub fn replace_module(&mut self, holder: &ModuleHolder, label: &str) -> Result<(), Exception> {
        self.replace_module_with_policy(holder, label, REPLACE_SCAN_POLICY)
    }

    /// Swap the module behind `label`, slot by slot in construction order.
    ///
    /// Each worker keeps its identity and gets a fresh module from
    /// `holder`. The job slot's worker immediately runs begin-job, since
    /// the job-wide begin-job will not run again.
    ///
    /// # Errors
    ///
    /// A replacement construction failure or the job slot's begin-job
    /// failure. Slots updated before the failure keep the new module.
    pub fn replace_module_with_policy(
        &mut self,
        holder: &ModuleHolder,
        label: &str,
        policy: ReplaceScanPolicy,
    ) -> Result<(), Exception> {
        let job_index = self.layout.job_index();
        let process_context = Arc::clone(&self.process_context);
        for (index, manager) in self.worker_managers.iter_mut().enumerate() {
            let Some(worker) = manager.worker_mut(label) else {
                if policy.continues_past_missing_slot() {
                    continue;
                }
                debug!(label, slot = index, "module absent, replacement scan stops");
                return Ok(());
            };
            let module = holder.make_module().map_err(|err| {
                Exception::from_anyhow(err).with_context(format!(
                    "Constructing replacement {} for module '{label}'",
                    holder.module_type()
                ))
            })?;
            worker.replace_module(module);
            if index == job_index {
                let context = GlobalContext::new(Transition::BeginJob, Arc::clone(&process_context));
                worker.begin_job(&context)?;
            }
        }
        Ok(())
    }

    /// Remove the worker for `label` from every slot. Unknown labels are a
    /// no-op.
    pub fn delete_module(&mut self, label: &str) {
        for manager in &mut self.worker_managers {
            manager.delete_module_if_exists(label);
        }
    }

    /// Descriptions of every worker, slot by slot, in insertion order
    /// within a slot. A label appears once per slot holding it.
    pub fn get_all_module_descriptions(&self) -> Vec<&ModuleDescription> {
        self.all_workers().map(Worker::description).collect()
    }

    /// Every worker of every slot, in slot order.
    pub fn all_workers(&self) -> impl Iterator<Item = &Worker> {
        self.worker_managers
            .iter()
            .flat_map(WorkerManager::all_workers)
    }

    /// Whether every slot holds the same labels in the same order.
    pub fn is_homogeneous(&self) -> bool {
        let labels = |m: &WorkerManager| -> Vec<String> {
            m.all_workers()
                .map(|w| w.description().module_label().to_string())
                .collect()
        };
        let mut managers = self.worker_managers.iter();
        managers.next().map_or(true, |first| {
            let expected = labels(first);
            managers.all(|m| labels(m) == expected)
        })
    }

    /// Enrich an error that escaped a transition and report it.
    ///
    /// If `error` has no context yet, the rendering of `context` is added.
    /// The error is then reported through the services behind
    /// `weak_token` and the early-termination signal fires, both with the
    /// services active only for the duration of the call. A failure of
    /// the termination signal is logged and dropped.
    pub fn handle_exception(
        &self,
        context: &GlobalContext,
        weak_token: &ServiceWeakToken,
        cleaning_up_after_exception: bool,
        error: &mut Exception,
    ) {
        let added = if error.context().is_empty() {
            context.to_string()
        } else {
            String::new()
        };
        {
            let _services = Operate::new(weak_token.lock());
            add_context_and_report(&added, error, cleaning_up_after_exception);
        }

        let _services = Operate::new(weak_token.lock());
        let termination = EarlyTermination {
            context: context.clone(),
            origin: TerminationOrigin::ExceptionFromThisContext,
        };
        if let Err(err) = self
            .activity_registry
            .pre_global_early_termination
            .emit(&termination)
        {
            warn!(error = %err, "ignoring failure of early termination signal");
        }
    }

    /// Slot counts and ordering.
    pub const fn slot_layout(&self) -> SlotLayout {
        self.layout
    }

    /// Manager of `slot`.
    pub fn worker_manager(&self, slot: Slot) -> Option<&WorkerManager> {
        self.layout
            .index_of(slot)
            .and_then(|i| self.worker_managers.get(i))
    }

    /// Mutable manager of `slot`.
    pub fn worker_manager_mut(&mut self, slot: Slot) -> Option<&mut WorkerManager> {
        self.layout
            .index_of(slot)
            .and_then(|i| self.worker_managers.get_mut(i))
    }

    /// Process this schedule runs in.
    pub fn process_context(&self) -> &ProcessContext {
        &self.process_context
    }

    /// Signal table shared with the workers.
    pub fn activity_registry(&self) -> &Arc<ActivityRegistry> {
        &self.activity_registry
    }
}
