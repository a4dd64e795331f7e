//! Threshold rules that turn a snapshot into advisories.
//!
//! Each handler owns one metric and declares the snapshot fields it reads.
//! Handlers run in a fixed order (glucose, heart rate, blood pressure,
//! glucose trend, temperature) and are skipped when any field they read is
//! not a finite number. Skipping is reported on the [`Evaluation`] rather
//! than as an error, so one bad reading never hides advisories for the
//! remaining metrics.

mod blood_pressure;
mod glucose;
mod heart_rate;
mod temperature;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::advisory::{Advisory, Category, Severity};
use crate::snapshot::{BiometricSnapshot, Field};

pub use blood_pressure::BloodPressureHandler;
pub use glucose::{GlucoseBandHandler, GlucoseTrendHandler, TREND_DELTA};
pub use heart_rate::HeartRateHandler;
pub use temperature::FeverHandler;

/// Identifier of every rule the evaluator knows, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleId {
    GlucoseLow,
    GlucoseHigh,
    GlucoseElevated,
    GlucoseOptimal,
    HeartRateLow,
    HeartRateHigh,
    HeartRateNormal,
    BloodPressureHigh,
    BloodPressureLow,
    GlucoseTrend,
    Fever,
}

impl RuleId {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::GlucoseLow => "glucose-low",
            Self::GlucoseHigh => "glucose-high",
            Self::GlucoseElevated => "glucose-elevated",
            Self::GlucoseOptimal => "glucose-optimal",
            Self::HeartRateLow => "heart-rate-low",
            Self::HeartRateHigh => "heart-rate-high",
            Self::HeartRateNormal => "heart-rate-normal",
            Self::BloodPressureHigh => "blood-pressure-high",
            Self::BloodPressureLow => "blood-pressure-low",
            Self::GlucoseTrend => "glucose-trend",
            Self::Fever => "fever",
        }
    }

    #[must_use]
    pub const fn category(&self) -> Category {
        match self {
            Self::GlucoseLow
            | Self::GlucoseHigh
            | Self::HeartRateHigh
            | Self::BloodPressureHigh
            | Self::Fever => Category::Alert,
            Self::GlucoseElevated | Self::HeartRateLow | Self::BloodPressureLow => {
                Category::Recommendation
            }
            Self::GlucoseOptimal | Self::HeartRateNormal => Category::Normal,
            Self::GlucoseTrend => Category::Prediction,
        }
    }

    /// Fixed display confidence. Not derived from the data.
    #[must_use]
    pub const fn confidence(&self) -> u8 {
        match self {
            Self::GlucoseLow => 98,
            Self::GlucoseHigh => 96,
            Self::GlucoseElevated => 89,
            Self::GlucoseOptimal => 95,
            Self::HeartRateLow => 82,
            Self::HeartRateHigh => 90,
            Self::HeartRateNormal => 94,
            Self::BloodPressureHigh => 91,
            Self::BloodPressureLow => 85,
            Self::GlucoseTrend => 87,
            Self::Fever => 93,
        }
    }

    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            Self::GlucoseLow | Self::GlucoseHigh => Severity::Critical,
            Self::GlucoseElevated
            | Self::HeartRateLow
            | Self::HeartRateHigh
            | Self::BloodPressureHigh
            | Self::BloodPressureLow
            | Self::Fever => Severity::Warning,
            Self::GlucoseOptimal | Self::HeartRateNormal | Self::GlucoseTrend => Severity::Info,
        }
    }

    /// Build the advisory for this rule.
    #[must_use]
    pub fn advisory(self, title: impl Into<String>, message: impl Into<String>) -> Advisory {
        Advisory {
            id: self.as_str().to_string(),
            category: self.category(),
            title: title.into(),
            message: message.into(),
            confidence: self.confidence(),
            severity: self.severity(),
        }
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inputs handed to every rule handler.
#[derive(Debug, Clone, Copy)]
pub struct RuleInput<'a> {
    pub current: &'a BiometricSnapshot,
    pub previous: Option<&'a BiometricSnapshot>,
}

/// A group of rules over one metric.
pub trait RuleHandler: Send + Sync {
    /// Short name used in diagnostics.
    fn name(&self) -> &'static str;

    /// Fields of the current snapshot this handler reads.
    fn requires(&self) -> &'static [Field];

    /// Evaluate the handler's rules. Only called when every required field
    /// of `input.current` is finite.
    fn evaluate(&self, input: &RuleInput<'_>) -> Vec<Advisory>;
}

static HANDLERS: [&dyn RuleHandler; 5] = [
    &GlucoseBandHandler,
    &HeartRateHandler,
    &BloodPressureHandler,
    &GlucoseTrendHandler,
    &FeverHandler,
];

/// Registered handlers in evaluation order.
#[must_use]
pub fn handlers() -> &'static [&'static dyn RuleHandler] {
    &HANDLERS
}

/// Result of evaluating one snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    /// Advisories in rule-declaration order
    pub advisories: Vec<Advisory>,
    /// Set when at least one rule was skipped because of a non-finite field
    pub incomplete_input: bool,
    /// Non-finite fields of the current snapshot
    pub missing: Vec<Field>,
}

impl Evaluation {
    /// Advisories in the `alert` category.
    pub fn alerts(&self) -> impl Iterator<Item = &Advisory> {
        self.advisories.iter().filter(|a| a.is_alert())
    }

    /// Look up an advisory by rule id.
    #[must_use]
    pub fn get(&self, rule: RuleId) -> Option<&Advisory> {
        self.advisories.iter().find(|a| a.id == rule.as_str())
    }

    #[must_use]
    pub fn fired(&self, rule: RuleId) -> bool {
        self.get(rule).is_some()
    }

    /// Rule ids in output order.
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        self.advisories.iter().map(|a| a.id.as_str()).collect()
    }
}

/// Evaluate every rule against `current`, using `previous` for trend rules.
///
/// Pure and deterministic: the same inputs always produce the same output.
#[must_use]
pub fn evaluate(current: &BiometricSnapshot, previous: Option<&BiometricSnapshot>) -> Evaluation {
    let missing = current.missing_fields();
    let input = RuleInput { current, previous };
    let mut evaluation = Evaluation {
        advisories: Vec::new(),
        incomplete_input: false,
        missing,
    };

    for handler in handlers() {
        if handler
            .requires()
            .iter()
            .any(|field| evaluation.missing.contains(field))
        {
            evaluation.incomplete_input = true;
            continue;
        }
        evaluation.advisories.extend(handler.evaluate(&input));
    }

    evaluation
}
