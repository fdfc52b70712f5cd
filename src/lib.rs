//! # Global Schedule
//!
//! A process-wide module-execution scheduler for data-processing jobs built
//! from pluggable modules.
//!
//! The schedule owns one [`WorkerManager`](core::WorkerManager) per
//! concurrency slot: one per in-flight luminosity block, one per in-flight
//! run, one per in-flight process block, and exactly one job-level slot.
//! Every slot holds an equivalent set of [`Worker`](core::Worker)s, one per
//! configured module.
//!
//! ## Key Features
//!
//! - **Homogeneous construction**: every configured label is built once per
//!   slot through a [`ModuleFactory`](core::ModuleFactory)
//! - **Two-phase transitions**: begin-job and end-job run a pre-signal, the
//!   job slot's workers, then a post-signal; the first failure wins
//! - **End-job aggregation**: every worker gets its end-job call and failures
//!   are gathered in an [`ExceptionCollector`](core::ExceptionCollector)
//! - **Late mutation**: modules can be replaced or deleted across all slots
//!   inside a [`ReconfigurationWindow`](core::ReconfigurationWindow)
//! - **Error enrichment**: errors escaping a transition are annotated with
//!   their [`GlobalContext`](core::GlobalContext) and reported through the
//!   ambient service scope
//!
//! ## Example
//!
//! ```rust,ignore
//! use global_schedule::builders::GlobalScheduleBuilder;
//! use global_schedule::config::{ModuleConfig, ParameterSet, PreallocationConfiguration, ProcessConfiguration};
//! use global_schedule::core::{ExceptionCollector, MakerRegistry, ProductRegistry};
//!
//! let factory = MakerRegistry::new().with_maker("TrackProducer", |_, _| Ok(Box::new(TrackProducer)));
//! let mut pset = ParameterSet::new().with_module("tracks", ModuleConfig::new("TrackProducer"));
//! let mut products = ProductRegistry::new();
//!
//! let process = GlobalScheduleBuilder::process_context_for(ProcessConfiguration::new("RECO", "1.0"));
//! let mut schedule = GlobalScheduleBuilder::new(PreallocationConfiguration::new(2, 1), process)
//!     .modules(["tracks"])
//!     .trigger_results_inserter()
//!     .build(&mut pset, &factory, &mut products)?;
//!
//! schedule.begin_job()?;
//! // ... per-event processing driven by the outer engine ...
//! let mut collector = ExceptionCollector::new("endJob");
//! schedule.end_job(&mut collector);
//! collector.finish()?;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core scheduling abstractions: workers, managers, transitions, signals.
pub mod core;
/// Configuration models for processes, concurrency and modules.
pub mod config;
/// Builders to construct schedules from configuration.
pub mod builders;
/// Shared utilities.
pub mod util;
