//! Heart rate band rules: < 60 low, > 100 high, otherwise normal.

use super::{RuleHandler, RuleId, RuleInput};
use crate::advisory::Advisory;
use crate::snapshot::Field;

const LOW: f64 = 60.0;
const HIGH: f64 = 100.0;

pub struct HeartRateHandler;

impl RuleHandler for HeartRateHandler {
    fn name(&self) -> &'static str {
        "heart-rate"
    }

    fn requires(&self) -> &'static [Field] {
        &[Field::HeartRate]
    }

    fn evaluate(&self, input: &RuleInput<'_>) -> Vec<Advisory> {
        let heart_rate = input.current.heart_rate;

        let advisory = if heart_rate < LOW {
            RuleId::HeartRateLow.advisory(
                "Low Resting Heart Rate",
                format!(
                    "Your heart rate is {heart_rate:.0} BPM. If you feel dizzy or tired, \
                     sit down and consider contacting your doctor."
                ),
            )
        } else if heart_rate > HIGH {
            RuleId::HeartRateHigh.advisory(
                "High Heart Rate Warning",
                format!("Your heart rate is {heart_rate:.0} BPM. Rest and take deep breaths."),
            )
        } else {
            RuleId::HeartRateNormal.advisory(
                "Heart Rate Optimal",
                "Your heart rate is in the healthy resting range (60-100 BPM). \
                 Light exercise helps maintain cardiovascular health.",
            )
        };

        vec![advisory]
    }
}
