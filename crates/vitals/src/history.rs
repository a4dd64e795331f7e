//! Summaries over stored health records.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::records::HealthRecord;
use crate::status::{GlucoseStatus, Trend};

/// Aggregate view of a user's recent history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistorySummary {
    /// Rounded mean of present glucose readings, 0 when there are none
    pub avg_glucose: u32,
    /// Rounded mean of present heart rate readings, 0 when there are none
    pub avg_heart_rate: u32,
    pub total_steps: u64,
    pub records: usize,
}

impl HistorySummary {
    #[must_use]
    pub fn from_records(records: &[HealthRecord]) -> Self {
        Self {
            avg_glucose: rounded_mean(records.iter().filter_map(|r| r.glucose_level)),
            avg_heart_rate: rounded_mean(records.iter().filter_map(|r| r.heart_rate)),
            total_steps: records
                .iter()
                .filter_map(|r| r.steps)
                .map(u64::from)
                .sum(),
            records: records.len(),
        }
    }
}

// Zero readings count as absent.
fn rounded_mean(values: impl Iterator<Item = f64>) -> u32 {
    let (sum, count) = values
        .filter(|v| v.is_finite() && *v != 0.0)
        .fold((0.0, 0_u32), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        return 0;
    }
    (sum / f64::from(count)).round() as u32
}

/// A history row with its derived labels.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry<'a> {
    pub record: &'a HealthRecord,
    pub glucose_status: GlucoseStatus,
    pub glucose_trend: Trend,
    pub heart_rate_trend: Trend,
}

/// Group records (newest first) by calendar date, newest date first.
/// Trends compare each record with the next older one on the same date.
#[must_use]
pub fn timeline(records: &[HealthRecord]) -> Vec<(NaiveDate, Vec<TimelineEntry<'_>>)> {
    let mut sorted: Vec<&HealthRecord> = records.iter().collect();
    sorted.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));

    let mut groups: BTreeMap<NaiveDate, Vec<&HealthRecord>> = BTreeMap::new();
    for record in sorted {
        groups
            .entry(record.recorded_at.date_naive())
            .or_default()
            .push(record);
    }

    groups
        .into_iter()
        .rev()
        .map(|(date, day)| {
            let entries = day
                .iter()
                .enumerate()
                .map(|(i, &record)| {
                    let older = day.get(i + 1);
                    TimelineEntry {
                        record,
                        glucose_status: GlucoseStatus::of(record.glucose_level),
                        glucose_trend: Trend::between(
                            record.glucose_level,
                            older.and_then(|o| o.glucose_level),
                        ),
                        heart_rate_trend: Trend::between(
                            record.heart_rate,
                            older.and_then(|o| o.heart_rate),
                        ),
                    }
                })
                .collect();
            (date, entries)
        })
        .collect()
}
