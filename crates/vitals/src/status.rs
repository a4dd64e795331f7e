//! Dashboard status classification for individual metrics and the device.

use serde::{Deserialize, Serialize};

use crate::snapshot::BiometricSnapshot;

/// Status shown on a metric card.
///
/// A non-finite reading is `Unknown` rather than being classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricStatus {
    Normal,
    Warning,
    Danger,
    Unknown,
}

impl MetricStatus {
    #[must_use]
    pub fn glucose(glucose: f64) -> Self {
        if !glucose.is_finite() {
            Self::Unknown
        } else if glucose < 100.0 {
            Self::Normal
        } else if glucose < 140.0 {
            Self::Warning
        } else {
            Self::Danger
        }
    }

    #[must_use]
    pub fn heart_rate(heart_rate: f64) -> Self {
        if !heart_rate.is_finite() {
            Self::Unknown
        } else if (60.0..=100.0).contains(&heart_rate) {
            Self::Normal
        } else {
            Self::Warning
        }
    }

    /// Classified on systolic pressure only.
    #[must_use]
    pub fn blood_pressure(systolic: f64) -> Self {
        if !systolic.is_finite() {
            Self::Unknown
        } else if systolic < 130.0 {
            Self::Normal
        } else if systolic < 140.0 {
            Self::Warning
        } else {
            Self::Danger
        }
    }

    #[must_use]
    pub fn temperature(temperature: f64) -> Self {
        if !temperature.is_finite() {
            Self::Unknown
        } else if (98.0..=99.5).contains(&temperature) {
            Self::Normal
        } else {
            Self::Warning
        }
    }
}

/// Direction of change between two readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

impl Trend {
    /// Stable when either side is missing, non-finite, or the values are equal.
    #[must_use]
    pub fn between(current: Option<f64>, previous: Option<f64>) -> Self {
        match (current, previous) {
            (Some(c), Some(p)) if c.is_finite() && p.is_finite() => {
                if c > p {
                    Self::Up
                } else if c < p {
                    Self::Down
                } else {
                    Self::Stable
                }
            }
            _ => Self::Stable,
        }
    }
}

/// One metric card: display value, status and trend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricCard {
    pub title: &'static str,
    pub value: String,
    pub unit: &'static str,
    pub status: MetricStatus,
    pub trend: Trend,
}

/// Build the four dashboard cards for the latest reading.
#[must_use]
pub fn metric_cards(
    current: &BiometricSnapshot,
    previous: Option<&BiometricSnapshot>,
) -> Vec<MetricCard> {
    vec![
        MetricCard {
            title: "Glucose Level",
            value: display(current.glucose, 0),
            unit: "mg/dL",
            status: MetricStatus::glucose(current.glucose),
            trend: trend_of(current, previous, |s| s.glucose),
        },
        MetricCard {
            title: "Heart Rate",
            value: display(current.heart_rate, 0),
            unit: "BPM",
            status: MetricStatus::heart_rate(current.heart_rate),
            trend: trend_of(current, previous, |s| s.heart_rate),
        },
        MetricCard {
            title: "Blood Pressure",
            value: format!(
                "{}/{}",
                display(current.blood_pressure_systolic, 0),
                display(current.blood_pressure_diastolic, 0)
            ),
            unit: "mmHg",
            status: MetricStatus::blood_pressure(current.blood_pressure_systolic),
            trend: trend_of(current, previous, |s| s.blood_pressure_systolic),
        },
        MetricCard {
            title: "Temperature",
            value: display(current.temperature, 1),
            unit: "°F",
            status: MetricStatus::temperature(current.temperature),
            trend: trend_of(current, previous, |s| s.temperature),
        },
    ]
}

/// Missing readings render as "-".
fn display(value: f64, precision: usize) -> String {
    if value.is_finite() {
        format!("{value:.precision$}")
    } else {
        "-".to_string()
    }
}

fn trend_of(
    current: &BiometricSnapshot,
    previous: Option<&BiometricSnapshot>,
    pick: fn(&BiometricSnapshot) -> f64,
) -> Trend {
    Trend::between(Some(pick(current)), previous.map(pick))
}

/// Glucose label used on stored history rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GlucoseStatus {
    Unknown,
    Low,
    Normal,
    High,
}

impl GlucoseStatus {
    /// A missing or zero reading is unknown.
    #[must_use]
    pub fn of(level: Option<f64>) -> Self {
        match level {
            Some(g) if g.is_finite() && g != 0.0 => {
                if g < 70.0 {
                    Self::Low
                } else if g > 140.0 {
                    Self::High
                } else {
                    Self::Normal
                }
            }
            _ => Self::Unknown,
        }
    }
}

/// Battery or signal classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LevelStatus {
    Good,
    Fair,
    Poor,
    Charging,
}

/// Connection state of the shoe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceStatus {
    pub connected: bool,
    /// Percent, 0-100
    pub battery_level: u8,
    /// Percent, 0-100
    pub signal_strength: u8,
    pub charging: bool,
}

impl Default for DeviceStatus {
    fn default() -> Self {
        Self {
            connected: true,
            battery_level: 85,
            signal_strength: 92,
            charging: false,
        }
    }
}

impl DeviceStatus {
    #[must_use]
    pub fn battery(&self) -> LevelStatus {
        if self.charging {
            LevelStatus::Charging
        } else if self.battery_level > 50 {
            LevelStatus::Good
        } else if self.battery_level > 20 {
            LevelStatus::Fair
        } else {
            LevelStatus::Poor
        }
    }

    #[must_use]
    pub fn signal(&self) -> LevelStatus {
        if self.signal_strength > 70 {
            LevelStatus::Good
        } else if self.signal_strength > 30 {
            LevelStatus::Fair
        } else {
            LevelStatus::Poor
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_metric_status_bands() {
        assert_eq!(MetricStatus::glucose(99.0), MetricStatus::Normal);
        assert_eq!(MetricStatus::glucose(100.0), MetricStatus::Warning);
        assert_eq!(MetricStatus::glucose(140.0), MetricStatus::Danger);
        assert_eq!(MetricStatus::heart_rate(100.0), MetricStatus::Normal);
        assert_eq!(MetricStatus::heart_rate(59.0), MetricStatus::Warning);
        assert_eq!(MetricStatus::blood_pressure(135.0), MetricStatus::Warning);
        assert_eq!(MetricStatus::blood_pressure(140.0), MetricStatus::Danger);
        assert_eq!(MetricStatus::temperature(99.5), MetricStatus::Normal);
        assert_eq!(MetricStatus::temperature(97.9), MetricStatus::Warning);
    }

    #[test]
    fn test_trend_between() {
        assert_eq!(Trend::between(Some(2.0), Some(1.0)), Trend::Up);
        assert_eq!(Trend::between(Some(1.0), Some(2.0)), Trend::Down);
        assert_eq!(Trend::between(Some(1.0), Some(1.0)), Trend::Stable);
        assert_eq!(Trend::between(Some(1.0), None), Trend::Stable);
        assert_eq!(Trend::between(Some(f64::NAN), Some(1.0)), Trend::Stable);
    }

    #[test]
    fn test_metric_cards() {
        let previous = BiometricSnapshot::new(95.0, 75.0, 118.0, 78.0, 98.6, Utc::now());
        let current = BiometricSnapshot::new(102.4, 72.0, 131.0, 82.0, 98.64, Utc::now());
        let cards = metric_cards(&current, Some(&previous));

        assert_eq!(cards[0].value, "102");
        assert_eq!(cards[0].status, MetricStatus::Warning);
        assert_eq!(cards[0].trend, Trend::Up);
        assert_eq!(cards[1].trend, Trend::Down);
        assert_eq!(cards[2].value, "131/82");
        assert_eq!(cards[2].status, MetricStatus::Warning);
        assert_eq!(cards[3].value, "98.6");
    }

    #[test]
    fn test_missing_reading_is_unknown() {
        assert_eq!(MetricStatus::glucose(f64::NAN), MetricStatus::Unknown);
        assert_eq!(MetricStatus::heart_rate(f64::INFINITY), MetricStatus::Unknown);
        assert_eq!(MetricStatus::blood_pressure(f64::NAN), MetricStatus::Unknown);
        assert_eq!(MetricStatus::temperature(f64::NAN), MetricStatus::Unknown);

        let current = BiometricSnapshot::new(f64::NAN, 72.0, 120.0, f64::NAN, 98.6, Utc::now());
        let cards = metric_cards(&current, None);
        assert_eq!(cards[0].value, "-");
        assert_eq!(cards[0].status, MetricStatus::Unknown);
        assert_eq!(cards[1].status, MetricStatus::Normal);
        assert_eq!(cards[2].value, "120/-");
        assert_eq!(cards[2].status, MetricStatus::Normal);
    }

    #[test]
    fn test_glucose_status() {
        assert_eq!(GlucoseStatus::of(None), GlucoseStatus::Unknown);
        assert_eq!(GlucoseStatus::of(Some(0.0)), GlucoseStatus::Unknown);
        assert_eq!(GlucoseStatus::of(Some(65.0)), GlucoseStatus::Low);
        assert_eq!(GlucoseStatus::of(Some(140.0)), GlucoseStatus::Normal);
        assert_eq!(GlucoseStatus::of(Some(141.0)), GlucoseStatus::High);
    }

    #[test]
    fn test_device_levels() {
        let mut device = DeviceStatus::default();
        assert_eq!(device.battery(), LevelStatus::Good);
        assert_eq!(device.signal(), LevelStatus::Good);

        device.battery_level = 20;
        device.signal_strength = 31;
        assert_eq!(device.battery(), LevelStatus::Poor);
        assert_eq!(device.signal(), LevelStatus::Fair);

        device.charging = true;
        assert_eq!(device.battery(), LevelStatus::Charging);
    }
}
