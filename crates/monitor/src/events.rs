//! Events emitted by the monitor loop.

use chrono::{DateTime, Utc};
use notify::NotifyEvent;
use serde::Serialize;
use vitals::advice::ActivitySummary;
use vitals::status::{DeviceStatus, LevelStatus};
use vitals::{Advisory, BiometricSnapshot, Field, Severity};

/// Why the monitor loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// `MonitorHandle::stop` was called or the handle was dropped
    Requested,
    /// The configured tick limit was reached
    MaxTicks,
    /// The snapshot source has nothing left
    SourceExhausted,
}

impl StopReason {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Requested => "requested",
            Self::MaxTicks => "max ticks reached",
            Self::SourceExhausted => "source exhausted",
        }
    }
}

/// One line of monitor output.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum MonitorEvent {
    Started {
        user_id: String,
        interval_seconds: u64,
        device: DeviceStatus,
        battery: LevelStatus,
        signal: LevelStatus,
        timestamp: DateTime<Utc>,
    },
    /// A snapshot was evaluated
    Tick {
        tick: u64,
        snapshot: BiometricSnapshot,
        advisories: Vec<Advisory>,
        incomplete_input: bool,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        missing: Vec<Field>,
        activity: ActivitySummary,
        timestamp: DateTime<Utc>,
    },
    /// A notification was handed to the notifier
    Notification {
        tag: String,
        severity: Severity,
        title: String,
        body: String,
        timestamp: DateTime<Utc>,
    },
    /// A reading was written to storage
    Persisted {
        record_id: String,
        timestamp: DateTime<Utc>,
    },
    /// Storage failed; the loop keeps running
    StorageFailed {
        error: String,
        timestamp: DateTime<Utc>,
    },
    Stopped {
        reason: StopReason,
        ticks: u64,
        timestamp: DateTime<Utc>,
    },
}

impl MonitorEvent {
    #[must_use]
    pub fn notification(event: &NotifyEvent) -> Self {
        Self::Notification {
            tag: event.tag(),
            severity: event.severity(),
            title: event.title(),
            body: event.body(),
            timestamp: event.timestamp(),
        }
    }
}
