//! Scheduling core: workers, per-slot managers, transitions and signals.

pub mod activity;
pub mod context;
pub mod error;
pub mod global_schedule;
pub mod inserters;
pub mod module;
pub mod products;
pub mod reconfigure;
pub mod service;
pub mod slot;
pub mod transition;
pub mod worker;
pub mod worker_manager;

pub use activity::{ActivityRegistry, EarlyTermination, Signal, TerminationOrigin};
pub use context::{exception_context, GlobalContext, LuminosityBlockId, ProcessContext, Transition};
pub use error::{AppResult, Exception, ExceptionCollector, ScheduleError};
pub use global_schedule::{GlobalSchedule, ReplaceScanPolicy, REPLACE_SCAN_POLICY};
pub use inserters::{EndPathStatusInserter, PathStatusInserter, TriggerResultInserter};
pub use module::{InjectedModule, MakerRegistry, Module, ModuleDescription, ModuleFactory, ModuleHolder};
pub use products::{ConsumesDeclaration, ProductDeclaration, ProductRegistry};
pub use reconfigure::{ReconfigurationWindow, SharedSchedule};
pub use service::{Operate, ReportSink, ServiceSet, ServiceToken, ServiceWeakToken};
pub use slot::{Slot, SlotLayout};
pub use transition::{run_transition, TransitionOutcome, TransitionPhase};
pub use worker::Worker;
pub use worker_manager::WorkerManager;
