//! Biometric snapshot captured by the shoe at a single instant.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// One of the numeric fields carried by a [`BiometricSnapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Glucose,
    HeartRate,
    BloodPressureSystolic,
    BloodPressureDiastolic,
    Temperature,
}

impl Field {
    /// All fields, in declaration order.
    pub const ALL: [Field; 5] = [
        Field::Glucose,
        Field::HeartRate,
        Field::BloodPressureSystolic,
        Field::BloodPressureDiastolic,
        Field::Temperature,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Glucose => "glucose",
            Self::HeartRate => "heartRate",
            Self::BloodPressureSystolic => "bloodPressureSystolic",
            Self::BloodPressureDiastolic => "bloodPressureDiastolic",
            Self::Temperature => "temperature",
        }
    }

    /// Unit the field is reported in.
    #[must_use]
    pub const fn unit(&self) -> &'static str {
        match self {
            Self::Glucose => "mg/dL",
            Self::HeartRate => "BPM",
            Self::BloodPressureSystolic | Self::BloodPressureDiastolic => "mmHg",
            Self::Temperature => "°F",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A simultaneous reading of every tracked biometric field.
///
/// Snapshots are never mutated after construction. A field that the device
/// failed to report is stored as NaN; missing or `null` values in JSON input
/// deserialize that way so a malformed reading still reaches the evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BiometricSnapshot {
    /// Blood glucose, mg/dL
    #[serde(default = "missing", deserialize_with = "reading")]
    pub glucose: f64,
    /// Heart rate, beats per minute
    #[serde(default = "missing", deserialize_with = "reading")]
    pub heart_rate: f64,
    /// Systolic blood pressure, mmHg
    #[serde(default = "missing", deserialize_with = "reading")]
    pub blood_pressure_systolic: f64,
    /// Diastolic blood pressure, mmHg
    #[serde(default = "missing", deserialize_with = "reading")]
    pub blood_pressure_diastolic: f64,
    /// Body temperature, °F
    #[serde(default = "missing", deserialize_with = "reading")]
    pub temperature: f64,
    /// When the reading was taken
    #[serde(default = "Utc::now")]
    pub captured_at: DateTime<Utc>,
}

fn missing() -> f64 {
    f64::NAN
}

fn reading<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

impl BiometricSnapshot {
    /// Create a snapshot from raw readings.
    #[must_use]
    pub fn new(
        glucose: f64,
        heart_rate: f64,
        blood_pressure_systolic: f64,
        blood_pressure_diastolic: f64,
        temperature: f64,
        captured_at: DateTime<Utc>,
    ) -> Self {
        Self {
            glucose,
            heart_rate,
            blood_pressure_systolic,
            blood_pressure_diastolic,
            temperature,
            captured_at,
        }
    }

    /// Value of a single field.
    #[must_use]
    pub const fn value(&self, field: Field) -> f64 {
        match field {
            Field::Glucose => self.glucose,
            Field::HeartRate => self.heart_rate,
            Field::BloodPressureSystolic => self.blood_pressure_systolic,
            Field::BloodPressureDiastolic => self.blood_pressure_diastolic,
            Field::Temperature => self.temperature,
        }
    }

    /// Value of a field, or `None` when it is NaN or infinite.
    #[must_use]
    pub fn finite(&self, field: Field) -> Option<f64> {
        let value = self.value(field);
        value.is_finite().then_some(value)
    }

    /// Fields whose value is not a finite number, in declaration order.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|field| !self.value(*field).is_finite())
            .collect()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        Field::ALL.iter().all(|field| self.value(*field).is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BiometricSnapshot {
        BiometricSnapshot::new(95.0, 72.0, 120.0, 80.0, 98.6, Utc::now())
    }

    #[test]
    fn test_complete_snapshot_has_no_missing_fields() {
        let snapshot = sample();
        assert!(snapshot.is_complete());
        assert!(snapshot.missing_fields().is_empty());
        assert_eq!(snapshot.finite(Field::Glucose), Some(95.0));
    }

    #[test]
    fn test_non_finite_values_are_reported_missing() {
        let snapshot = BiometricSnapshot {
            glucose: f64::NAN,
            temperature: f64::INFINITY,
            ..sample()
        };
        assert!(!snapshot.is_complete());
        assert_eq!(
            snapshot.missing_fields(),
            vec![Field::Glucose, Field::Temperature]
        );
        assert_eq!(snapshot.finite(Field::Glucose), None);
        assert_eq!(snapshot.finite(Field::HeartRate), Some(72.0));
    }

    #[test]
    fn test_deserialize_missing_and_null_fields_as_nan() {
        let json = r#"{
            "glucose": null,
            "heartRate": 72,
            "bloodPressureSystolic": 120,
            "temperature": 98.6,
            "capturedAt": "2024-05-01T10:00:00Z"
        }"#;
        let snapshot: BiometricSnapshot = serde_json::from_str(json).unwrap();
        assert!(snapshot.glucose.is_nan());
        assert!(snapshot.blood_pressure_diastolic.is_nan());
        assert_eq!(snapshot.heart_rate, 72.0);
        assert_eq!(
            snapshot.missing_fields(),
            vec![Field::Glucose, Field::BloodPressureDiastolic]
        );
    }

    #[test]
    fn test_field_units() {
        assert_eq!(Field::Glucose.unit(), "mg/dL");
        assert_eq!(Field::BloodPressureDiastolic.unit(), "mmHg");
        assert_eq!(Field::HeartRate.to_string(), "heartRate");
    }
}
