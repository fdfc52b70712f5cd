//! Scheduler-owned wrapper around one module instance in one slot.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::core::activity::{ActivityRegistry, Signal};
use crate::core::context::{exception_context, GlobalContext, Transition};
use crate::core::error::{AppResult, Exception};
use crate::core::module::{Module, ModuleDescription};

/// Wraps one module instance for one concurrency slot.
///
/// Each job transition runs at most once per module instance; swapping the
/// module in place resets that record.
pub struct Worker {
    description: ModuleDescription,
    module: Box<dyn Module>,
    activity_registry: Arc<ActivityRegistry>,
    completed: BTreeSet<Transition>,
    generation: u32,
}

impl Worker {
    /// Wrap `module`.
    pub fn new(
        description: ModuleDescription,
        module: Box<dyn Module>,
        activity_registry: Arc<ActivityRegistry>,
    ) -> Self {
        Self {
            description,
            module,
            activity_registry,
            completed: BTreeSet::new(),
            generation: 0,
        }
    }

    /// Identity of the wrapped module.
    pub const fn description(&self) -> &ModuleDescription {
        &self.description
    }

    /// The wrapped module.
    pub fn module(&self) -> &dyn Module {
        self.module.as_ref()
    }

    /// How many times the module has been replaced.
    pub const fn generation(&self) -> u32 {
        self.generation
    }

    /// Whether `transition` already completed for the current module.
    pub fn has_completed(&self, transition: Transition) -> bool {
        self.completed.contains(&transition)
    }

    /// Swap in `module`, keeping this worker's identity. The new module has
    /// not run any transition yet.
    pub fn replace_module(&mut self, module: Box<dyn Module>) {
        self.module = module;
        self.completed.clear();
        self.generation += 1;
        tracing::debug!(
            module = %self.description,
            generation = self.generation,
            "module replaced"
        );
    }

    /// Run the module's begin-job unless it already ran.
    ///
    /// # Errors
    ///
    /// The module's or a module signal subscriber's failure, annotated with
    /// the module identity.
    pub fn begin_job(&mut self, context: &GlobalContext) -> Result<(), Exception> {
        if self.has_completed(Transition::BeginJob) {
            return Ok(());
        }
        let registry = Arc::clone(&self.activity_registry);
        self.run_transition(
            context,
            "beginJob",
            &registry.pre_module_begin_job,
            &registry.post_module_begin_job,
            |module, ctx| module.begin_job(ctx),
        )?;
        self.completed.insert(Transition::BeginJob);
        Ok(())
    }

    /// Run the module's end-job unless it already ran.
    ///
    /// # Errors
    ///
    /// The module's or a module signal subscriber's failure, annotated with
    /// the module identity.
    pub fn end_job(&mut self, context: &GlobalContext) -> Result<(), Exception> {
        if self.has_completed(Transition::EndJob) {
            return Ok(());
        }
        // A failed end-job is not retried.
        self.completed.insert(Transition::EndJob);
        let registry = Arc::clone(&self.activity_registry);
        self.run_transition(
            context,
            "endJob",
            &registry.pre_module_end_job,
            &registry.post_module_end_job,
            |module, ctx| module.end_job(ctx),
        )
    }

    fn run_transition<F>(
        &mut self,
        context: &GlobalContext,
        name: &str,
        pre: &Signal<ModuleDescription>,
        post: &Signal<ModuleDescription>,
        call: F,
    ) -> Result<(), Exception>
    where
        F: FnOnce(&mut dyn Module, &GlobalContext) -> AppResult<()>,
    {
        let annotate = |err: anyhow::Error| {
            let mut exception = Exception::from_anyhow(err);
            exception_context(
                &mut exception,
                context,
                &format!("Calling {name} for module {}", self.description),
            );
            exception
        };
        pre.emit(&self.description).map_err(annotate)?;
        tracing::debug!(module = %self.description, transition = name, "running module transition");
        call(self.module.as_mut(), context).map_err(annotate)?;
        post.emit(&self.description).map_err(annotate)
    }
}

impl fmt::Debug for Worker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Worker")
            .field("description", &self.description)
            .field("completed", &self.completed)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}
