//! Medication reminders and insulin dose status.
//!
//! Schedules are same-day wall-clock times; nothing here wraps past
//! midnight.

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::records::Medication;

/// Window after the scheduled time during which a dose counts as overdue.
const OVERDUE_WINDOW_MINS: i64 = 30;

/// Lead time of the advance medication reminder.
const REMINDER_LEAD_MINS: i64 = 5;

/// Whole minutes from `now` until `scheduled`, ignoring seconds.
/// Negative once the scheduled minute has passed.
#[must_use]
pub fn minutes_until(now: NaiveTime, scheduled: NaiveTime) -> i64 {
    let to_minutes = |t: NaiveTime| i64::from(t.hour()) * 60 + i64::from(t.minute());
    to_minutes(scheduled) - to_minutes(now)
}

/// Reminder to raise for a medication at the current minute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Reminder {
    /// Dose is due in five minutes
    UpcomingSoon,
    /// Dose is due this minute
    DueNow,
    /// Dose was due `minutes` ago, still within the overdue window
    Overdue { minutes: i64 },
}

impl Reminder {
    #[must_use]
    pub fn message(&self, medication: &Medication) -> String {
        let name = &medication.medication_name;
        let dosage = &medication.dosage;
        match self {
            Self::UpcomingSoon => {
                format!("Reminder: Take {name} ({dosage}) in {REMINDER_LEAD_MINS} minutes!")
            }
            Self::DueNow => format!("TIME TO TAKE: {name} ({dosage}) NOW!"),
            Self::Overdue { minutes } => {
                format!("OVERDUE: {name} was due {minutes} minutes ago!")
            }
        }
    }
}

/// Decide whether `medication` needs a reminder at `now`.
#[must_use]
pub fn medication_reminder(medication: &Medication, now: NaiveTime) -> Option<Reminder> {
    if medication.is_taken {
        return None;
    }

    match minutes_until(now, medication.scheduled_time) {
        REMINDER_LEAD_MINS => Some(Reminder::UpcomingSoon),
        0 => Some(Reminder::DueNow),
        diff if diff < 0 && diff > -OVERDUE_WINDOW_MINS => Some(Reminder::Overdue { minutes: -diff }),
        _ => None,
    }
}

/// Minutes past the scheduled time after which a listed dose shows as overdue.
const LIST_OVERDUE_AFTER_MINS: i64 = 15;

/// Minutes ahead of the scheduled time within which a listed dose is upcoming.
const LIST_UPCOMING_WITHIN_MINS: i64 = 30;

/// Status of a medication in the schedule list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MedicationStatus {
    Taken,
    Overdue,
    Due,
    Upcoming,
    Scheduled,
}

impl MedicationStatus {
    #[must_use]
    pub fn at(medication: &Medication, now: NaiveTime) -> Self {
        if medication.is_taken {
            return Self::Taken;
        }

        match minutes_until(now, medication.scheduled_time) {
            diff if diff < -LIST_OVERDUE_AFTER_MINS => Self::Overdue,
            diff if diff <= 0 => Self::Due,
            diff if diff <= LIST_UPCOMING_WITHIN_MINS => Self::Upcoming,
            _ => Self::Scheduled,
        }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Taken => "taken",
            Self::Overdue => "overdue",
            Self::Due => "due",
            Self::Upcoming => "upcoming",
            Self::Scheduled => "scheduled",
        }
    }
}

/// True when any medication in the list shows as overdue.
#[must_use]
pub fn any_medication_overdue(medications: &[Medication], now: NaiveTime) -> bool {
    medications
        .iter()
        .any(|m| MedicationStatus::at(m, now) == MedicationStatus::Overdue)
}

/// Status of a scheduled insulin dose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DoseStatus {
    Overdue,
    Due,
    Upcoming,
    Scheduled,
}

impl DoseStatus {
    #[must_use]
    pub fn at(scheduled: NaiveTime, now: NaiveTime) -> Self {
        let elapsed = now.signed_duration_since(scheduled).num_seconds();
        let window = OVERDUE_WINDOW_MINS * 60;

        if elapsed > window {
            Self::Overdue
        } else if elapsed > 0 {
            Self::Due
        } else if elapsed > -window {
            Self::Upcoming
        } else {
            Self::Scheduled
        }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Overdue => "OVERDUE",
            Self::Due => "DUE NOW",
            Self::Upcoming => "UPCOMING",
            Self::Scheduled => "SCHEDULED",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsulinKind {
    Rapid,
    Long,
}

impl InsulinKind {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Rapid => "Rapid-Acting",
            Self::Long => "Long-Acting",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsulinDose {
    pub time: NaiveTime,
    pub kind: InsulinKind,
    pub dose: String,
}

impl InsulinDose {
    #[must_use]
    pub fn status(&self, now: NaiveTime) -> DoseStatus {
        DoseStatus::at(self.time, now)
    }
}

/// Default daily plan: two rapid-acting doses with meals and a long-acting
/// dose at night.
#[must_use]
pub fn default_insulin_plan() -> Vec<InsulinDose> {
    [
        (12, InsulinKind::Rapid, "8 units"),
        (18, InsulinKind::Rapid, "6 units"),
        (22, InsulinKind::Long, "20 units"),
    ]
    .into_iter()
    .filter_map(|(hour, kind, amount)| {
        NaiveTime::from_hms_opt(hour, 0, 0).map(|time| InsulinDose {
            time,
            kind,
            dose: amount.to_string(),
        })
    })
    .collect()
}

/// True when any dose in the plan is overdue.
#[must_use]
pub fn any_overdue(plan: &[InsulinDose], now: NaiveTime) -> bool {
    plan.iter().any(|d| d.status(now) == DoseStatus::Overdue)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hm(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    fn med_at(time: NaiveTime) -> Medication {
        Medication::new("u1", "Metformin", "500mg", time)
    }

    #[test]
    fn test_minutes_until_ignores_seconds() {
        let now = NaiveTime::from_hms_opt(8, 0, 59).unwrap();
        assert_eq!(minutes_until(now, hm(8, 5)), 5);
        assert_eq!(minutes_until(hm(8, 10), hm(8, 5)), -5);
    }

    #[test]
    fn test_medication_reminders() {
        let med = med_at(hm(8, 30));
        assert_eq!(medication_reminder(&med, hm(8, 25)), Some(Reminder::UpcomingSoon));
        assert_eq!(medication_reminder(&med, hm(8, 30)), Some(Reminder::DueNow));
        assert_eq!(
            medication_reminder(&med, hm(8, 40)),
            Some(Reminder::Overdue { minutes: 10 })
        );
        assert_eq!(medication_reminder(&med, hm(9, 0)), None);
        assert_eq!(medication_reminder(&med, hm(8, 20)), None);
    }

    #[test]
    fn test_taken_medication_never_reminds() {
        let mut med = med_at(hm(8, 30));
        med.is_taken = true;
        assert_eq!(medication_reminder(&med, hm(8, 30)), None);
    }

    #[test]
    fn test_reminder_messages() {
        let med = med_at(hm(8, 30));
        assert_eq!(
            Reminder::DueNow.message(&med),
            "TIME TO TAKE: Metformin (500mg) NOW!"
        );
        assert_eq!(
            Reminder::Overdue { minutes: 12 }.message(&med),
            "OVERDUE: Metformin was due 12 minutes ago!"
        );
    }

    #[test]
    fn test_medication_status_boundaries() {
        let med = med_at(hm(9, 0));
        // diff = scheduled - now
        assert_eq!(MedicationStatus::at(&med, hm(9, 16)), MedicationStatus::Overdue);
        assert_eq!(MedicationStatus::at(&med, hm(9, 15)), MedicationStatus::Due);
        assert_eq!(MedicationStatus::at(&med, hm(9, 0)), MedicationStatus::Due);
        assert_eq!(MedicationStatus::at(&med, hm(8, 59)), MedicationStatus::Upcoming);
        assert_eq!(MedicationStatus::at(&med, hm(8, 30)), MedicationStatus::Upcoming);
        assert_eq!(MedicationStatus::at(&med, hm(8, 29)), MedicationStatus::Scheduled);
    }

    #[test]
    fn test_taken_medication_status() {
        let mut med = med_at(hm(9, 0));
        med.mark_taken(chrono::Utc::now());
        assert_eq!(MedicationStatus::at(&med, hm(11, 0)), MedicationStatus::Taken);
        assert!(!any_medication_overdue(&[med], hm(11, 0)));
        assert!(any_medication_overdue(&[med_at(hm(9, 0))], hm(11, 0)));
    }

    #[test]
    fn test_dose_status_windows() {
        let noon = hm(12, 0);
        assert_eq!(DoseStatus::at(noon, hm(11, 0)), DoseStatus::Scheduled);
        assert_eq!(DoseStatus::at(noon, hm(11, 30)), DoseStatus::Scheduled);
        assert_eq!(DoseStatus::at(noon, hm(11, 45)), DoseStatus::Upcoming);
        assert_eq!(DoseStatus::at(noon, hm(12, 0)), DoseStatus::Upcoming);
        assert_eq!(DoseStatus::at(noon, hm(12, 10)), DoseStatus::Due);
        assert_eq!(DoseStatus::at(noon, hm(12, 30)), DoseStatus::Due);
        assert_eq!(DoseStatus::at(noon, hm(12, 31)), DoseStatus::Overdue);
    }

    #[test]
    fn test_default_plan() {
        let plan = default_insulin_plan();
        assert_eq!(plan.len(), 3);
        assert_eq!(plan[2].kind, InsulinKind::Long);
        assert!(!any_overdue(&plan, hm(9, 0)));
        assert!(any_overdue(&plan, hm(13, 0)));
    }
}
