//! Fever rule: temperature above 99.5 °F.

use super::{RuleHandler, RuleId, RuleInput};
use crate::advisory::Advisory;
use crate::snapshot::Field;

const FEVER: f64 = 99.5;

pub struct FeverHandler;

impl RuleHandler for FeverHandler {
    fn name(&self) -> &'static str {
        "fever"
    }

    fn requires(&self) -> &'static [Field] {
        &[Field::Temperature]
    }

    fn evaluate(&self, input: &RuleInput<'_>) -> Vec<Advisory> {
        let temperature = input.current.temperature;
        if temperature <= FEVER {
            return vec![];
        }

        vec![RuleId::Fever.advisory(
            "Elevated Temperature",
            format!(
                "Your temperature is {temperature:.1}°F. Stay hydrated and monitor \
                 for other symptoms of infection."
            ),
        )]
    }
}
