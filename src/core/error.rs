//! Error types for schedule construction, transitions and module failures.

use std::fmt;

use thiserror::Error;

/// Category assigned to errors that did not originate as an [`Exception`].
pub const STD_EXCEPTION_CATEGORY: &str = "StdException";

/// Category of the combined exception produced by [`ExceptionCollector::finish`].
pub const MULTIPLE_EXCEPTIONS_CATEGORY: &str = "MultipleExceptions";

/// A framework exception: a categorized message plus the context lines
/// accumulated while it travelled outward through transitions and modules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exception {
    category: String,
    message: String,
    context: Vec<String>,
    already_printed: bool,
}

impl Exception {
    /// Create an exception with no context.
    pub fn new(category: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            message: message.into(),
            context: Vec::new(),
            already_printed: false,
        }
    }

    /// Convert an error raised by module or subscriber code.
    ///
    /// An `anyhow::Error` wrapping an `Exception` yields that exception, with
    /// any context layered on top of it appended innermost first. Anything
    /// else becomes a `StdException`.
    pub fn from_anyhow(err: anyhow::Error) -> Self {
        let outer: Vec<String> = err
            .chain()
            .take_while(|cause| !cause.is::<Self>())
            .map(ToString::to_string)
            .collect();
        match err.downcast::<Self>() {
            Ok(mut exception) => {
                for line in outer.into_iter().rev() {
                    exception.add_context(line);
                }
                exception
            }
            Err(other) => Self::new(STD_EXCEPTION_CATEGORY, format!("{other:#}")),
        }
    }

    /// Exception category.
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Original message, without context.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Context lines in the order they were added.
    pub fn context(&self) -> &[String] {
        &self.context
    }

    /// Append a context line. Empty lines are ignored.
    pub fn add_context(&mut self, line: impl Into<String>) {
        let line = line.into();
        if !line.is_empty() {
            self.context.push(line);
        }
    }

    /// Builder-style variant of [`Exception::add_context`].
    #[must_use]
    pub fn with_context(mut self, line: impl Into<String>) -> Self {
        self.add_context(line);
        self
    }

    /// Whether the exception has already been sent to a report sink.
    pub const fn already_printed(&self) -> bool {
        self.already_printed
    }

    /// Mark the exception as reported.
    pub fn set_already_printed(&mut self) {
        self.already_printed = true;
    }
}

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.category, self.message)?;
        for line in self.context.iter().rev() {
            write!(f, "\n  while {line}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Exception {}

/// Errors produced while building a schedule or its workers.
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// The factory failed to construct a module.
    #[error("failed to construct module `{label}`: {source}")]
    ModuleConstruction {
        /// Label of the module being constructed.
        label: String,
        /// Underlying factory error.
        #[source]
        source: anyhow::Error,
    },
    /// A module configuration used for a worker is not tracked.
    #[error("configuration for module `{0}` is untracked")]
    UntrackedConfiguration(String),
    /// A product declaration conflicts with an existing registration.
    #[error("product registration conflict: {0}")]
    ProductConflict(String),
    /// Configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// A transition failed while constructing or reconfiguring.
    #[error(transparent)]
    Exception(#[from] Exception),
}

/// Application-facing result using anyhow for module and subscriber code.
pub type AppResult<T> = Result<T, anyhow::Error>;

/// Aggregates failures without stopping, then reports them together.
///
/// Used by end-of-job processing so every worker gets its cleanup call even
/// after earlier workers failed.
#[derive(Debug, Default)]
pub struct ExceptionCollector {
    initial_message: String,
    errors: Vec<Exception>,
}

impl ExceptionCollector {
    /// Create a collector whose combined report starts with `initial_message`.
    pub fn new(initial_message: impl Into<String>) -> Self {
        Self {
            initial_message: initial_message.into(),
            errors: Vec::new(),
        }
    }

    /// Run `f` now and record its failure, if any. Never propagates.
    pub fn call<F>(&mut self, f: F)
    where
        F: FnOnce() -> Result<(), Exception>,
    {
        if let Err(err) = f() {
            self.errors.push(err);
        }
    }

    /// Record an already materialized failure.
    pub fn add(&mut self, err: Exception) {
        self.errors.push(err);
    }

    /// Whether any failure has been recorded.
    pub fn has_thrown(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Recorded failures in submission order.
    pub fn errors(&self) -> &[Exception] {
        &self.errors
    }

    /// Consume the collector and surface what it gathered.
    ///
    /// # Errors
    ///
    /// Returns the single recorded exception unchanged, or a
    /// `MultipleExceptions` exception enumerating all of them in order.
    pub fn finish(mut self) -> Result<(), Exception> {
        match self.errors.len() {
            0 => Ok(()),
            1 => Err(self.errors.remove(0)),
            n => {
                let mut message = if self.initial_message.is_empty() {
                    format!("{n} exceptions were collected")
                } else {
                    format!("{} ({n} exceptions)", self.initial_message)
                };
                for (i, err) in self.errors.iter().enumerate() {
                    message.push_str(&format!("\n---- exception {} ----\n{err}", i + 1));
                }
                Err(Exception::new(MULTIPLE_EXCEPTIONS_CATEGORY, message))
            }
        }
    }
}
