//! Background processors.
//!
//! Each processor is a struct with an async `run()` that is spawned once at
//! startup and stopped through a shared `watch` shutdown channel. Processors
//! never terminate the host process on error; a failed pass is logged and
//! retried on the next trigger.

pub mod audit_writer;
pub mod sweeper;

pub use audit_writer::AuditWriter;
pub use sweeper::{ExpirySweeper, SweepSummary, SweeperConfig};
