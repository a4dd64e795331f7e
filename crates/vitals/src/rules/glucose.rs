//! Glucose band and glucose trend rules.
//!
//! Bands: < 70 low, > 180 high, (140, 180] elevated, [70, 100] optimal.
//! Readings in (100, 140] fall between the optimal and elevated bands and
//! produce no band advisory.

use super::{RuleHandler, RuleId, RuleInput};
use crate::advisory::Advisory;
use crate::snapshot::Field;

const LOW: f64 = 70.0;
const HIGH: f64 = 180.0;
const ELEVATED: f64 = 140.0;
const OPTIMAL_MAX: f64 = 100.0;

/// Minimum absolute change between readings (mg/dL) that counts as a trend.
pub const TREND_DELTA: f64 = 15.0;

pub struct GlucoseBandHandler;

impl RuleHandler for GlucoseBandHandler {
    fn name(&self) -> &'static str {
        "glucose-band"
    }

    fn requires(&self) -> &'static [Field] {
        &[Field::Glucose]
    }

    fn evaluate(&self, input: &RuleInput<'_>) -> Vec<Advisory> {
        let glucose = input.current.glucose;

        let advisory = if glucose < LOW {
            Some(RuleId::GlucoseLow.advisory(
                "Glucose Dangerously Low",
                format!(
                    "Your glucose is {glucose:.0} mg/dL - dangerously low! \
                     Consume fast-acting carbs immediately."
                ),
            ))
        } else if glucose > HIGH {
            Some(RuleId::GlucoseHigh.advisory(
                "Glucose Critically High",
                format!(
                    "Your glucose is {glucose:.0} mg/dL - critically high! \
                     Consider insulin and avoid carbohydrates."
                ),
            ))
        } else if glucose > ELEVATED {
            Some(RuleId::GlucoseElevated.advisory(
                "Glucose Elevated",
                format!(
                    "Your glucose is {glucose:.0} mg/dL. A 15-30 minute walk can help \
                     reduce levels by 20-40 mg/dL."
                ),
            ))
        } else if glucose <= OPTIMAL_MAX {
            Some(RuleId::GlucoseOptimal.advisory(
                "Glucose Levels Stable",
                "Your glucose levels are within the normal range (70-100 mg/dL). \
                 Keep up the good work!",
            ))
        } else {
            None
        };

        advisory.into_iter().collect()
    }
}

pub struct GlucoseTrendHandler;

impl RuleHandler for GlucoseTrendHandler {
    fn name(&self) -> &'static str {
        "glucose-trend"
    }

    fn requires(&self) -> &'static [Field] {
        &[Field::Glucose]
    }

    fn evaluate(&self, input: &RuleInput<'_>) -> Vec<Advisory> {
        let Some(previous) = input.previous.and_then(|p| p.finite(Field::Glucose)) else {
            return vec![];
        };

        let delta = input.current.glucose - previous;
        if delta.abs() <= TREND_DELTA {
            return vec![];
        }

        let magnitude = delta.abs();
        let advisory = if delta > 0.0 {
            RuleId::GlucoseTrend.advisory(
                "Glucose Rising",
                format!(
                    "Glucose is rising: up {magnitude:.0} mg/dL since the last reading. \
                     Monitor for the next 2 hours."
                ),
            )
        } else {
            RuleId::GlucoseTrend.advisory(
                "Glucose Falling",
                format!(
                    "Glucose is falling: down {magnitude:.0} mg/dL since the last reading. \
                     Keep a fast-acting snack nearby."
                ),
            )
        };

        vec![advisory]
    }
}
