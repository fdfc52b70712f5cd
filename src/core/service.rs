//! Ambient service scope: report sinks activated for the duration of a call.
//!
//! A [`ServiceToken`] owns a [`ServiceSet`]; components that must not keep
//! it alive hold a [`ServiceWeakToken`] and activate it with [`Operate`]
//! only while they need it. An expired token activates nothing.

use std::cell::RefCell;
use std::fmt;
use std::sync::{Arc, Weak};

use tracing::span::EnteredSpan;

use crate::core::error::Exception;

/// Receives exceptions reported through the active service scope.
pub trait ReportSink: Send + Sync {
    /// Report `exception`. `cleaning_up` is set while handling a failure
    /// that follows an earlier one.
    fn report(&self, exception: &Exception, cleaning_up: bool);
}

/// Services available to code running inside an [`Operate`] scope.
pub struct ServiceSet {
    name: String,
    sinks: Vec<Arc<dyn ReportSink>>,
}

impl ServiceSet {
    /// Service set with no sinks.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sinks: Vec::new(),
        }
    }

    /// Add a report sink.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn ReportSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Name used for the tracing span of an activation.
    pub fn name(&self) -> &str {
        &self.name
    }

    fn report(&self, exception: &Exception, cleaning_up: bool) {
        for sink in &self.sinks {
            sink.report(exception, cleaning_up);
        }
    }
}

impl fmt::Debug for ServiceSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceSet")
            .field("name", &self.name)
            .field("sinks", &self.sinks.len())
            .finish()
    }
}

/// Owning handle to a service set.
#[derive(Debug, Clone)]
pub struct ServiceToken(Arc<ServiceSet>);

impl ServiceToken {
    /// Take ownership of `services`.
    pub fn new(services: ServiceSet) -> Self {
        Self(Arc::new(services))
    }

    /// Non-owning handle to the same services.
    pub fn downgrade(&self) -> ServiceWeakToken {
        ServiceWeakToken(Arc::downgrade(&self.0))
    }

    /// The services.
    pub fn services(&self) -> &ServiceSet {
        &self.0
    }
}

/// Non-owning handle; resolves to nothing once every owner is gone.
#[derive(Debug, Clone, Default)]
pub struct ServiceWeakToken(Weak<ServiceSet>);

impl ServiceWeakToken {
    /// A handle that never resolves.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Resolve the handle.
    pub fn lock(&self) -> Option<ServiceToken> {
        self.0.upgrade().map(ServiceToken)
    }
}

thread_local! {
    static ACTIVE: RefCell<Vec<Option<ServiceToken>>> = const { RefCell::new(Vec::new()) };
}

/// Scoped activation of a service set on the current thread.
///
/// Activations nest; dropping the guard restores the previous one.
/// Activating `None` hides any outer activation for the scope.
#[must_use = "services are deactivated when the guard is dropped"]
pub struct Operate {
    _span: EnteredSpan,
}

impl Operate {
    /// Activate `token` until the guard is dropped.
    pub fn new(token: Option<ServiceToken>) -> Self {
        let span = match &token {
            Some(t) => tracing::debug_span!("service_scope", services = %t.services().name()),
            None => tracing::debug_span!("service_scope", services = "none"),
        };
        ACTIVE.with(|active| active.borrow_mut().push(token));
        Self {
            _span: span.entered(),
        }
    }

    /// Services active on this thread, if any.
    pub fn current() -> Option<ServiceToken> {
        ACTIVE.with(|active| active.borrow().last().cloned().flatten())
    }
}

impl Drop for Operate {
    fn drop(&mut self) {
        ACTIVE.with(|active| {
            active.borrow_mut().pop();
        });
    }
}

impl fmt::Debug for Operate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operate").finish_non_exhaustive()
    }
}

/// Add `context` to `exception` and report it through the active services.
///
/// An exception is reported at most once; later calls only add context.
pub fn add_context_and_report(context: &str, exception: &mut Exception, cleaning_up: bool) {
    exception.add_context(context);
    if exception.already_printed() {
        return;
    }
    tracing::error!(
        category = exception.category(),
        cleaning_up,
        "{exception}"
    );
    if let Some(token) = Operate::current() {
        token.services().report(exception, cleaning_up);
    }
    exception.set_already_printed();
}
