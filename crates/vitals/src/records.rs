//! Rows persisted for a user: health readings and medication schedules.

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::snapshot::BiometricSnapshot;

/// One stored health reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthRecord {
    pub id: String,
    pub user_id: String,
    pub glucose_level: Option<f64>,
    pub heart_rate: Option<f64>,
    pub blood_pressure_systolic: Option<f64>,
    pub blood_pressure_diastolic: Option<f64>,
    pub temperature: Option<f64>,
    #[serde(default)]
    pub steps: Option<u32>,
    /// Minutes of exercise
    #[serde(default)]
    pub exercise_duration: Option<u32>,
    #[serde(default)]
    pub notes: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

impl HealthRecord {
    /// Build a row from a snapshot. Non-finite readings are stored as `None`.
    #[must_use]
    pub fn from_snapshot(user_id: impl Into<String>, snapshot: &BiometricSnapshot) -> Self {
        let finite = |v: f64| v.is_finite().then_some(v);
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            glucose_level: finite(snapshot.glucose),
            heart_rate: finite(snapshot.heart_rate),
            blood_pressure_systolic: finite(snapshot.blood_pressure_systolic),
            blood_pressure_diastolic: finite(snapshot.blood_pressure_diastolic),
            temperature: finite(snapshot.temperature),
            steps: None,
            exercise_duration: None,
            notes: None,
            recorded_at: snapshot.captured_at,
        }
    }

    #[must_use]
    pub fn with_activity(mut self, steps: u32, exercise_duration: u32) -> Self {
        self.steps = Some(steps);
        self.exercise_duration = Some(exercise_duration);
        self
    }
}

fn default_frequency() -> String {
    "daily".to_string()
}

/// A scheduled medication for a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Medication {
    pub id: String,
    pub user_id: String,
    pub medication_name: String,
    pub dosage: String,
    pub scheduled_time: NaiveTime,
    #[serde(default = "default_frequency")]
    pub frequency: String,
    #[serde(default)]
    pub is_taken: bool,
    #[serde(default)]
    pub taken_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Medication {
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        medication_name: impl Into<String>,
        dosage: impl Into<String>,
        scheduled_time: NaiveTime,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            medication_name: medication_name.into(),
            dosage: dosage.into(),
            scheduled_time,
            frequency: default_frequency(),
            is_taken: false,
            taken_at: None,
            created_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn with_frequency(mut self, frequency: impl Into<String>) -> Self {
        self.frequency = frequency.into();
        self
    }

    pub fn mark_taken(&mut self, at: DateTime<Utc>) {
        self.is_taken = true;
        self.taken_at = Some(at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_drops_non_finite_readings() {
        let snapshot = BiometricSnapshot::new(f64::NAN, 72.0, 120.0, 80.0, 98.6, Utc::now());
        let record = HealthRecord::from_snapshot("user-1", &snapshot).with_activity(1200, 10);
        assert_eq!(record.glucose_level, None);
        assert_eq!(record.heart_rate, Some(72.0));
        assert_eq!(record.steps, Some(1200));
        assert_eq!(record.recorded_at, snapshot.captured_at);
    }

    #[test]
    fn test_medication_defaults() {
        let time = NaiveTime::from_hms_opt(8, 30, 0).unwrap();
        let mut med = Medication::new("user-1", "Metformin", "500mg", time);
        assert_eq!(med.frequency, "daily");
        assert!(!med.is_taken);

        let now = Utc::now();
        med.mark_taken(now);
        assert!(med.is_taken);
        assert_eq!(med.taken_at, Some(now));
    }

    #[test]
    fn test_medication_deserializes_with_defaults() {
        let json = r#"{
            "id": "m1",
            "user_id": "u1",
            "medication_name": "Insulin",
            "dosage": "8 units",
            "scheduled_time": "12:00:00",
            "created_at": "2024-05-01T10:00:00Z"
        }"#;
        let med: Medication = serde_json::from_str(json).unwrap();
        assert_eq!(med.frequency, "daily");
        assert!(!med.is_taken);
        assert_eq!(med.scheduled_time, NaiveTime::from_hms_opt(12, 0, 0).unwrap());
    }
}
