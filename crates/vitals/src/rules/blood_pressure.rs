//! Blood pressure rules.
//!
//! High (systolic >= 140 or diastolic >= 90) and low (systolic < 90 or
//! diastolic < 60) are checked independently, so a wide pulse pressure such
//! as 150/55 fires both.

use super::{RuleHandler, RuleId, RuleInput};
use crate::advisory::Advisory;
use crate::snapshot::Field;

const SYSTOLIC_HIGH: f64 = 140.0;
const DIASTOLIC_HIGH: f64 = 90.0;
const SYSTOLIC_LOW: f64 = 90.0;
const DIASTOLIC_LOW: f64 = 60.0;

pub struct BloodPressureHandler;

impl RuleHandler for BloodPressureHandler {
    fn name(&self) -> &'static str {
        "blood-pressure"
    }

    fn requires(&self) -> &'static [Field] {
        &[Field::BloodPressureSystolic, Field::BloodPressureDiastolic]
    }

    fn evaluate(&self, input: &RuleInput<'_>) -> Vec<Advisory> {
        let systolic = input.current.blood_pressure_systolic;
        let diastolic = input.current.blood_pressure_diastolic;
        let mut advisories = Vec::new();

        if systolic >= SYSTOLIC_HIGH || diastolic >= DIASTOLIC_HIGH {
            advisories.push(RuleId::BloodPressureHigh.advisory(
                "High Blood Pressure",
                format!(
                    "Your blood pressure is {systolic:.0}/{diastolic:.0} mmHg. \
                     Reduce salt intake, rest, and recheck in 15 minutes."
                ),
            ));
        }

        if systolic < SYSTOLIC_LOW || diastolic < DIASTOLIC_LOW {
            advisories.push(RuleId::BloodPressureLow.advisory(
                "Low Blood Pressure",
                format!(
                    "Your blood pressure is {systolic:.0}/{diastolic:.0} mmHg. \
                     Drink water and stand up slowly."
                ),
            ));
        }

        advisories
    }
}
