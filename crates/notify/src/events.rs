//! Notification event types for the health monitor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use vitals::schedule::Reminder;
use vitals::{Advisory, Medication, Severity};

/// Events that can trigger notifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotifyEvent {
    /// An alert-category advisory opened a new episode
    HealthAlert {
        rule_id: String,
        severity: Severity,
        title: String,
        message: String,
        #[serde(default)]
        context: BTreeMap<String, String>,
        #[serde(default = "Utc::now")]
        timestamp: DateTime<Utc>,
    },

    /// The daily step goal was reached
    StepGoalReached {
        steps: u32,
        goal: u32,
        #[serde(default = "Utc::now")]
        timestamp: DateTime<Utc>,
    },

    /// A scheduled medication is coming up, due, or overdue
    MedicationReminder {
        medication: String,
        dosage: String,
        reminder: Reminder,
        #[serde(default = "Utc::now")]
        timestamp: DateTime<Utc>,
    },
}

impl NotifyEvent {
    /// Build a health alert from an advisory.
    #[must_use]
    pub fn health_alert(advisory: &Advisory, timestamp: DateTime<Utc>) -> Self {
        let mut context = BTreeMap::new();
        context.insert("category".to_string(), advisory.category.to_string());
        context.insert(
            "confidence".to_string(),
            format!("{}%", advisory.confidence),
        );

        Self::HealthAlert {
            rule_id: advisory.id.clone(),
            severity: advisory.severity,
            title: advisory.title.clone(),
            message: advisory.message.clone(),
            context,
            timestamp,
        }
    }

    #[must_use]
    pub fn medication_reminder(
        medication: &Medication,
        reminder: Reminder,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self::MedicationReminder {
            medication: medication.medication_name.clone(),
            dosage: medication.dosage.clone(),
            reminder,
            timestamp,
        }
    }

    /// Get a short title for this event type.
    #[must_use]
    pub fn title(&self) -> String {
        match self {
            Self::HealthAlert {
                severity, title, ..
            } => match severity {
                Severity::Critical => format!("CRITICAL: {title}"),
                Severity::Warning | Severity::Info => title.clone(),
            },
            Self::StepGoalReached { .. } => "Step Goal Achieved!".to_string(),
            Self::MedicationReminder {
                medication,
                reminder,
                ..
            } => match reminder {
                Reminder::UpcomingSoon => format!("Upcoming: {medication}"),
                Reminder::DueNow => format!("Take Now: {medication}"),
                Reminder::Overdue { .. } => format!("Overdue: {medication}"),
            },
        }
    }

    /// Get the body text for this event.
    #[must_use]
    pub fn body(&self) -> String {
        match self {
            Self::HealthAlert { message, .. } => message.clone(),
            Self::StepGoalReached { steps, .. } => format!(
                "Congratulations! You've reached {steps} steps today. Keep up the great work!"
            ),
            Self::MedicationReminder {
                medication,
                dosage,
                reminder,
                ..
            } => match reminder {
                Reminder::UpcomingSoon => {
                    format!("Take {medication} ({dosage}) in 5 minutes.")
                }
                Reminder::DueNow => format!("Take {medication} ({dosage}) now."),
                Reminder::Overdue { minutes } => {
                    format!("{medication} ({dosage}) was due {minutes} minutes ago.")
                }
            },
        }
    }

    /// Get the severity for this event.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            Self::HealthAlert { severity, .. } => *severity,
            Self::StepGoalReached { .. } => Severity::Info,
            Self::MedicationReminder { reminder, .. } => match reminder {
                Reminder::UpcomingSoon => Severity::Info,
                Reminder::DueNow | Reminder::Overdue { .. } => Severity::Warning,
            },
        }
    }

    /// Get the timestamp for this event.
    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::HealthAlert { timestamp, .. }
            | Self::StepGoalReached { timestamp, .. }
            | Self::MedicationReminder { timestamp, .. } => *timestamp,
        }
    }

    /// Tag used by platform notifiers to replace rather than stack repeats.
    #[must_use]
    pub fn tag(&self) -> String {
        match self {
            Self::HealthAlert { rule_id, .. } => format!("health-{rule_id}"),
            Self::StepGoalReached { .. } => "step-goal-reached".to_string(),
            Self::MedicationReminder { medication, .. } => {
                format!("medication-{}", medication.to_lowercase().replace(' ', "-"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitals::RuleId;

    #[test]
    fn test_health_alert_from_advisory() {
        let advisory = RuleId::GlucoseLow.advisory("Glucose Dangerously Low", "Eat now");
        let event = NotifyEvent::health_alert(&advisory, Utc::now());

        assert_eq!(event.severity(), Severity::Critical);
        assert_eq!(event.title(), "CRITICAL: Glucose Dangerously Low");
        assert_eq!(event.body(), "Eat now");
        assert_eq!(event.tag(), "health-glucose-low");

        let NotifyEvent::HealthAlert { context, .. } = &event else {
            panic!("expected health alert");
        };
        assert_eq!(context.get("confidence").map(String::as_str), Some("98%"));
        assert_eq!(context.get("category").map(String::as_str), Some("alert"));
    }

    #[test]
    fn test_serializes_with_type_tag() {
        let event = NotifyEvent::StepGoalReached {
            steps: 10_250,
            goal: 10_000,
            timestamp: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "step_goal_reached");
        assert_eq!(json["steps"], 10_250);
        assert_eq!(event.severity(), Severity::Info);
    }

    #[test]
    fn test_medication_reminder_severity() {
        let event = NotifyEvent::MedicationReminder {
            medication: "Long Acting Insulin".to_string(),
            dosage: "20 units".to_string(),
            reminder: Reminder::Overdue { minutes: 12 },
            timestamp: Utc::now(),
        };
        assert_eq!(event.severity(), Severity::Warning);
        assert_eq!(event.title(), "Overdue: Long Acting Insulin");
        assert_eq!(event.body(), "Long Acting Insulin (20 units) was due 12 minutes ago.");
        assert_eq!(event.tag(), "medication-long-acting-insulin");
    }
}
