//! Process-wide signal table fired around transitions.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::core::context::GlobalContext;
use crate::core::error::AppResult;
use crate::core::module::ModuleDescription;

type Subscriber<A> = Arc<dyn Fn(&A) -> AppResult<()> + Send + Sync>;

/// A named, multi-subscriber notification point.
///
/// Subscribers run synchronously in registration order. The first failing
/// subscriber stops the emission and its error is returned. Emission runs
/// on a snapshot of the subscriber list, so subscribers may connect to or
/// emit any signal; a subscriber connected during an emission first runs
/// on the next one.
pub struct Signal<A> {
    name: &'static str,
    subscribers: RwLock<Vec<Subscriber<A>>>,
}

impl<A> Signal<A> {
    /// Signal with no subscribers.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            subscribers: RwLock::new(Vec::new()),
        }
    }

    /// Name of the hook point.
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Append a subscriber.
    pub fn connect<F>(&self, subscriber: F)
    where
        F: Fn(&A) -> AppResult<()> + Send + Sync + 'static,
    {
        self.subscribers.write().push(Arc::new(subscriber));
    }

    /// Number of subscribers.
    pub fn len(&self) -> usize {
        self.subscribers.read().len()
    }

    /// Whether nobody subscribed.
    pub fn is_empty(&self) -> bool {
        self.subscribers.read().is_empty()
    }

    /// Fire the signal.
    ///
    /// # Errors
    ///
    /// The error of the first failing subscriber; later subscribers do not run.
    pub fn emit(&self, args: &A) -> AppResult<()> {
        let subscribers: Vec<Subscriber<A>> = self.subscribers.read().clone();
        for subscriber in &subscribers {
            subscriber(args)?;
        }
        Ok(())
    }
}

impl<A> fmt::Debug for Signal<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("name", &self.name)
            .field("subscribers", &self.len())
            .finish()
    }
}

/// Why a global transition is terminating early.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerminationOrigin {
    /// An exception was raised within the transition being notified.
    ExceptionFromThisContext,
    /// An exception was raised in another context.
    ExceptionFromAnotherContext,
    /// An external signal requested shutdown.
    ExternalSignal,
}

/// Arguments of the early-termination signal.
#[derive(Debug, Clone)]
pub struct EarlyTermination {
    /// Transition being terminated.
    pub context: GlobalContext,
    /// Why it terminates.
    pub origin: TerminationOrigin,
}

/// Hook points fired around job transitions, module transitions and early
/// termination.
#[derive(Debug)]
pub struct ActivityRegistry {
    /// Before begin-job reaches any module.
    pub pre_begin_job: Signal<GlobalContext>,
    /// After begin-job, whether or not it succeeded.
    pub post_begin_job: Signal<GlobalContext>,
    /// Before end-job reaches any module.
    pub pre_end_job: Signal<GlobalContext>,
    /// After end-job, whether or not it succeeded.
    pub post_end_job: Signal<GlobalContext>,
    /// Before a module runs its begin-job.
    pub pre_module_begin_job: Signal<ModuleDescription>,
    /// After a module ran its begin-job successfully.
    pub post_module_begin_job: Signal<ModuleDescription>,
    /// Before a module runs its end-job.
    pub pre_module_end_job: Signal<ModuleDescription>,
    /// After a module ran its end-job successfully.
    pub post_module_end_job: Signal<ModuleDescription>,
    /// A global transition is ending early because of a failure.
    pub pre_global_early_termination: Signal<EarlyTermination>,
}

impl Default for ActivityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ActivityRegistry {
    /// Registry with no subscribers.
    pub fn new() -> Self {
        Self {
            pre_begin_job: Signal::new("preBeginJob"),
            post_begin_job: Signal::new("postBeginJob"),
            pre_end_job: Signal::new("preEndJob"),
            post_end_job: Signal::new("postEndJob"),
            pre_module_begin_job: Signal::new("preModuleBeginJob"),
            post_module_begin_job: Signal::new("postModuleBeginJob"),
            pre_module_end_job: Signal::new("preModuleEndJob"),
            post_module_end_job: Signal::new("postModuleEndJob"),
            pre_global_early_termination: Signal::new("preGlobalEarlyTermination"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn test_emit_in_registration_order() {
        let signal: Signal<u32> = Signal::new("test");
        let seen = Arc::new(Mutex::new(Vec::new()));
        for tag in ["a", "b", "c"] {
            let seen = Arc::clone(&seen);
            signal.connect(move |v| {
                seen.lock().push(format!("{tag}{v}"));
                Ok(())
            });
        }
        signal.emit(&1).unwrap();
        assert_eq!(*seen.lock(), vec!["a1", "b1", "c1"]);
    }

    #[test]
    fn test_first_failure_stops_emission() {
        let signal: Signal<()> = Signal::new("test");
        let ran_last = Arc::new(Mutex::new(false));
        signal.connect(|()| Err(anyhow::anyhow!("service failed")));
        let flag = Arc::clone(&ran_last);
        signal.connect(move |()| {
            *flag.lock() = true;
            Ok(())
        });
        let err = signal.emit(&()).unwrap_err();
        assert_eq!(err.to_string(), "service failed");
        assert!(!*ran_last.lock());
    }

    #[test]
    fn test_subscriber_may_connect_and_reemit() {
        let signal: Arc<Signal<u32>> = Arc::new(Signal::new("test"));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let inner_signal = Arc::clone(&signal);
        let inner_seen = Arc::clone(&seen);
        signal.connect(move |depth| {
            inner_seen.lock().push(*depth);
            if *depth == 0 {
                let late_seen = Arc::clone(&inner_seen);
                inner_signal.connect(move |d| {
                    late_seen.lock().push(100 + d);
                    Ok(())
                });
                inner_signal.emit(&1)?;
            }
            Ok(())
        });
        signal.emit(&0).unwrap();
        // The nested emission already sees the late subscriber; the outer
        // one runs on its own snapshot.
        assert_eq!(*seen.lock(), vec![0, 1, 101]);
        assert_eq!(signal.len(), 2);
    }

    #[test]
    fn test_empty_signal() {
        let registry = ActivityRegistry::new();
        assert!(registry.pre_begin_job.is_empty());
        assert_eq!(registry.post_end_job.name(), "postEndJob");
    }
}
