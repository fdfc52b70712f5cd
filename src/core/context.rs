//! Process and transition descriptors used by signals and error annotation.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::ProcessConfiguration;
use crate::core::error::Exception;

/// Global transitions a schedule or its outer engine can be processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Transition {
    /// Begin of job.
    BeginJob,
    /// Begin of a process block.
    BeginProcessBlock,
    /// Reading an input process block.
    AccessInputProcessBlock,
    /// Global begin of a run.
    BeginRun,
    /// Global begin of a luminosity block.
    BeginLuminosityBlock,
    /// Global end of a luminosity block.
    EndLuminosityBlock,
    /// Global end of a run.
    EndRun,
    /// End of a process block.
    EndProcessBlock,
    /// Writing a process block.
    WriteProcessBlock,
    /// Writing a run.
    WriteRun,
    /// Writing a luminosity block.
    WriteLuminosityBlock,
    /// End of job.
    EndJob,
}

impl Transition {
    /// Human-readable name used in context lines.
    pub const fn description(self) -> &'static str {
        match self {
            Self::BeginJob => "begin Job",
            Self::BeginProcessBlock => "begin ProcessBlock",
            Self::AccessInputProcessBlock => "access input ProcessBlock",
            Self::BeginRun => "global begin Run",
            Self::BeginLuminosityBlock => "global begin LuminosityBlock",
            Self::EndLuminosityBlock => "global end LuminosityBlock",
            Self::EndRun => "global end Run",
            Self::EndProcessBlock => "end ProcessBlock",
            Self::WriteProcessBlock => "write ProcessBlock",
            Self::WriteRun => "global write Run",
            Self::WriteLuminosityBlock => "global write LuminosityBlock",
            Self::EndJob => "end Job",
        }
    }

    const fn is_run_scoped(self) -> bool {
        matches!(self, Self::BeginRun | Self::EndRun | Self::WriteRun)
    }

    const fn is_lumi_scoped(self) -> bool {
        matches!(
            self,
            Self::BeginLuminosityBlock | Self::EndLuminosityBlock | Self::WriteLuminosityBlock
        )
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Run and luminosity block numbers for run/lumi-scoped transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LuminosityBlockId {
    /// Run number.
    pub run: u32,
    /// Luminosity block number (0 for run-level transitions).
    pub luminosity_block: u32,
}

/// Identity of the running process. Outlives every schedule built for it.
#[derive(Debug, Clone)]
pub struct ProcessContext {
    configuration: Arc<ProcessConfiguration>,
    instance_id: Uuid,
}

impl ProcessContext {
    /// Create a context for a process with a fresh instance id.
    pub fn new(configuration: Arc<ProcessConfiguration>) -> Self {
        Self {
            configuration,
            instance_id: Uuid::new_v4(),
        }
    }

    /// Process name, e.g. `RECO`.
    pub fn process_name(&self) -> &str {
        &self.configuration.process_name
    }

    /// Full process configuration.
    pub fn configuration(&self) -> &ProcessConfiguration {
        &self.configuration
    }

    /// Unique id of this process instance.
    pub const fn instance_id(&self) -> Uuid {
        self.instance_id
    }
}

/// Which transition is running, under which process.
///
/// Cloning only bumps a reference count.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    transition: Transition,
    lumi_id: Option<LuminosityBlockId>,
    process_context: Arc<ProcessContext>,
}

impl GlobalContext {
    /// Context for a job- or process-block-level transition.
    pub fn new(transition: Transition, process_context: Arc<ProcessContext>) -> Self {
        Self {
            transition,
            lumi_id: None,
            process_context,
        }
    }

    /// Context for a run- or lumi-scoped transition.
    #[must_use]
    pub fn with_lumi_id(mut self, lumi_id: LuminosityBlockId) -> Self {
        self.lumi_id = Some(lumi_id);
        self
    }

    /// Transition tag.
    pub const fn transition(&self) -> Transition {
        self.transition
    }

    /// Run/lumi numbers, when the transition carries them.
    pub const fn lumi_id(&self) -> Option<LuminosityBlockId> {
        self.lumi_id
    }

    /// Process the transition belongs to.
    pub fn process_context(&self) -> &ProcessContext {
        &self.process_context
    }
}

impl fmt::Display for GlobalContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Processing {}", self.transition)?;
        if let Some(id) = self.lumi_id {
            if self.transition.is_run_scoped() {
                write!(f, " run: {}", id.run)?;
            } else if self.transition.is_lumi_scoped() {
                write!(f, " run: {} luminosityBlock: {}", id.run, id.luminosity_block)?;
            }
        }
        write!(f, " for process '{}'", self.process_context.process_name())
    }
}

/// Annotate `exception` with `message` followed by the rendered context.
pub fn exception_context(exception: &mut Exception, context: &GlobalContext, message: &str) {
    exception.add_context(message);
    exception.add_context(context.to_string());
}
