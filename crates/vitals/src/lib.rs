//! Biometric rules for the Stride smart-shoe monitor.
//!
//! This crate is pure: nothing in it performs I/O, reads clocks on its own,
//! or keeps state between calls.
//!
//! - [`BiometricSnapshot`] is one reading of every tracked metric
//! - [`evaluate`] runs the threshold rules and returns ordered [`Advisory`]s
//! - [`advice`] holds the glucose-driven food, exercise and meal tables
//! - [`status`], [`schedule`] and [`history`] classify readings, doses and
//!   stored records for display
//!
//! # Usage
//!
//! ```
//! use chrono::Utc;
//! use vitals::{evaluate, BiometricSnapshot};
//!
//! let previous = BiometricSnapshot::new(100.0, 72.0, 120.0, 80.0, 98.6, Utc::now());
//! let current = BiometricSnapshot::new(120.0, 72.0, 120.0, 80.0, 98.6, Utc::now());
//!
//! let evaluation = evaluate(&current, Some(&previous));
//! assert!(evaluation.ids().contains(&"glucose-trend"));
//! ```

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod advice;
pub mod advisory;
pub mod history;
pub mod records;
pub mod rules;
pub mod schedule;
pub mod snapshot;
pub mod status;

pub use advisory::{Advisory, BadgeVariant, Category, Severity, Tone};
pub use records::{HealthRecord, Medication};
pub use rules::{evaluate, Evaluation, RuleId};
pub use snapshot::{BiometricSnapshot, Field};
