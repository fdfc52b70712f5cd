//! Pre-signal / action / post-signal sequencing with first-error-wins.
//!
//! A transition runs its pre-signal, then its action if the pre-signal
//! succeeded, then its post-signal unconditionally. The first failure is
//! kept; failures after it are logged and kept aside as suppressed, never
//! chained onto the first.

use crate::core::context::{exception_context, GlobalContext};
use crate::core::error::{AppResult, Exception};

const PRE_SIGNAL_CONTEXT: &str = "Handling pre signal, likely in a service function";
const POST_SIGNAL_CONTEXT: &str = "Handling post signal, likely in a service function";

/// Phases of a transition, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionPhase {
    /// Pre-signal subscribers ran.
    PreSignal,
    /// The action ran.
    Action,
    /// Post-signal subscribers ran.
    PostSignal,
}

/// What happened during one transition.
#[derive(Debug, Default)]
pub struct TransitionOutcome {
    ran: Vec<TransitionPhase>,
    error: Option<Exception>,
    suppressed: Vec<Exception>,
}

impl TransitionOutcome {
    fn record(&mut self, err: Exception) {
        if self.error.is_none() {
            self.error = Some(err);
        } else {
            tracing::warn!(error = %err, "suppressing error raised after an earlier transition failure");
            self.suppressed.push(err);
        }
    }

    /// Phases that ran, in order.
    pub fn phases(&self) -> &[TransitionPhase] {
        &self.ran
    }

    /// Whether `phase` ran.
    pub fn ran(&self, phase: TransitionPhase) -> bool {
        self.ran.contains(&phase)
    }

    /// Whether no phase failed.
    pub const fn succeeded(&self) -> bool {
        self.error.is_none()
    }

    /// The first recorded failure.
    pub const fn error(&self) -> Option<&Exception> {
        self.error.as_ref()
    }

    /// Failures raised after the first one.
    pub fn suppressed(&self) -> &[Exception] {
        &self.suppressed
    }

    /// Surface the first failure.
    ///
    /// # Errors
    ///
    /// The first recorded failure; suppressed ones are dropped.
    pub fn into_result(self) -> Result<(), Exception> {
        self.error.map_or(Ok(()), Err)
    }
}

/// Run one transition.
///
/// A pre-signal failure skips `action`. Signal failures are annotated with
/// `context`; a post-signal failure is only annotated when it becomes the
/// recorded error.
pub fn run_transition<Pre, Act, Post>(
    context: &GlobalContext,
    pre_signal: Pre,
    action: Act,
    post_signal: Post,
) -> TransitionOutcome
where
    Pre: FnOnce() -> AppResult<()>,
    Act: FnOnce() -> Result<(), Exception>,
    Post: FnOnce() -> AppResult<()>,
{
    let mut outcome = TransitionOutcome::default();

    let pre = pre_signal();
    outcome.ran.push(TransitionPhase::PreSignal);
    match pre {
        Ok(()) => {
            outcome.ran.push(TransitionPhase::Action);
            if let Err(err) = action() {
                outcome.record(err);
            }
        }
        Err(err) => {
            let mut ex = Exception::from_anyhow(err);
            exception_context(&mut ex, context, PRE_SIGNAL_CONTEXT);
            outcome.record(ex);
        }
    }

    let post = post_signal();
    outcome.ran.push(TransitionPhase::PostSignal);
    if let Err(err) = post {
        let mut ex = Exception::from_anyhow(err);
        if outcome.error.is_none() {
            exception_context(&mut ex, context, POST_SIGNAL_CONTEXT);
        }
        outcome.record(ex);
    }

    outcome
}
