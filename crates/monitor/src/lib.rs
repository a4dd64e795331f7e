//! Smart-shoe monitor: the tick loop that drives the rule evaluator.
//!
//! - [`MonitorConfig`] loads the JSON settings file
//! - [`SnapshotSource`] abstracts where readings come from
//!   ([`SimulatedShoe`], [`ReplaySource`])
//! - [`Monitor`] owns all loop state; [`Monitor::start`] spawns it and
//!   returns a [`MonitorHandle`]
//! - [`Storage`] persists readings and medications ([`FileStorage`])

#![warn(clippy::pedantic)]

pub mod config;
pub mod events;
pub mod monitor;
pub mod source;
pub mod storage;

pub use config::{ConfigError, MonitorConfig};
pub use events::{MonitorEvent, StopReason};
pub use monitor::{Monitor, MonitorHandle, MonitorReport, TickOutcome};
pub use source::{ReplaySource, SimulatedShoe, SnapshotSource, SourceError};
pub use storage::{FileStorage, Storage, StorageError, StorageResult};
