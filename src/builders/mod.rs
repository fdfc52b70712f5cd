//! Builders to construct schedules from configuration.

pub mod schedule_builder;

pub use schedule_builder::GlobalScheduleBuilder;
