//! Configuration models for processes, concurrency and modules.

pub mod job;
pub mod prealloc;
pub mod process;
pub mod pset;

pub use job::JobConfig;
pub use prealloc::PreallocationConfiguration;
pub use process::ProcessConfiguration;
pub use pset::{ModuleConfig, ParameterSet};
