//! Reconfiguration lock around a shared schedule.
//!
//! Per-slot traversal holds a read guard. Replacing or deleting modules
//! needs a [`ReconfigurationWindow`], which holds the write guard, so it
//! cannot overlap any traversal.

use std::ops::Deref;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::core::error::{Exception, ExceptionCollector};
use crate::core::global_schedule::{GlobalSchedule, ReplaceScanPolicy};
use crate::core::module::ModuleHolder;

/// A schedule shared between the coordinating thread and per-slot workers.
#[derive(Debug, Clone)]
pub struct SharedSchedule {
    inner: Arc<RwLock<GlobalSchedule>>,
}

impl SharedSchedule {
    /// Share `schedule`.
    pub fn new(schedule: GlobalSchedule) -> Self {
        Self {
            inner: Arc::new(RwLock::new(schedule)),
        }
    }

    /// Read access for per-slot traversal. Blocks while a reconfiguration
    /// window is open.
    pub fn read(&self) -> RwLockReadGuard<'_, GlobalSchedule> {
        self.inner.read()
    }

    /// Open a reconfiguration window. Blocks until every reader is gone.
    pub fn reconfigure(&self) -> ReconfigurationWindow<'_> {
        ReconfigurationWindow {
            guard: self.inner.write(),
        }
    }

    /// Run begin-job under exclusive access.
    ///
    /// # Errors
    ///
    /// See [`GlobalSchedule::begin_job`].
    pub fn begin_job(&self) -> Result<(), Exception> {
        self.inner.write().begin_job()
    }

    /// Run end-job under exclusive access.
    pub fn end_job(&self, collector: &mut ExceptionCollector) {
        self.inner.write().end_job(collector);
    }
}

/// Exclusive access to a shared schedule for module replacement and
/// deletion. Closing the window (dropping it) resumes traversal.
#[must_use = "the window closes when dropped"]
pub struct ReconfigurationWindow<'a> {
    guard: RwLockWriteGuard<'a, GlobalSchedule>,
}

impl ReconfigurationWindow<'_> {
    /// See [`GlobalSchedule::replace_module`].
    ///
    /// # Errors
    ///
    /// See [`GlobalSchedule::replace_module`].
    pub fn replace_module(&mut self, holder: &ModuleHolder, label: &str) -> Result<(), Exception> {
        self.guard.replace_module(holder, label)
    }

    /// See [`GlobalSchedule::replace_module_with_policy`].
    ///
    /// # Errors
    ///
    /// See [`GlobalSchedule::replace_module_with_policy`].
    pub fn replace_module_with_policy(
        &mut self,
        holder: &ModuleHolder,
        label: &str,
        policy: ReplaceScanPolicy,
    ) -> Result<(), Exception> {
        self.guard.replace_module_with_policy(holder, label, policy)
    }

    /// See [`GlobalSchedule::delete_module`].
    pub fn delete_module(&mut self, label: &str) {
        self.guard.delete_module(label);
    }
}

impl Deref for ReconfigurationWindow<'_> {
    type Target = GlobalSchedule;

    fn deref(&self) -> &Self::Target {
        &self.guard
    }
}
