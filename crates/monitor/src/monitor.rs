//! The tick loop.
//!
//! A single tokio task owns every piece of mutable state: the snapshot
//! source, the recent-history window, the alert gate, the step latch and the
//! report counters. Each tick pulls one snapshot, evaluates it against the
//! previous one, passes alert advisories through the gate, hands new
//! episodes to the notifier and persists the reading.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local, NaiveTime, Utc};
use notify::{AlertGate, Notifier, NotifyEvent, StepGoalLatch};
use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};
use vitals::advice::{ActivityGoals, ActivitySummary};
use vitals::schedule::{medication_reminder, Reminder};
use vitals::{evaluate, BiometricSnapshot, Evaluation, HealthRecord, Medication};

use crate::config::{ConfigError, MonitorConfig};
use crate::events::{MonitorEvent, StopReason};
use crate::source::SnapshotSource;
use crate::storage::Storage;

/// How often medication schedules are checked. Reminders match on whole
/// minutes, so this must not exceed one minute.
pub const REMINDER_INTERVAL: Duration = Duration::from_secs(60);

/// Counters collected over one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MonitorReport {
    pub ticks: u64,
    /// Advisories produced across all ticks
    pub advisories: u64,
    /// Alert episodes opened (one notification each)
    pub alerts_dispatched: u64,
    /// Ticks whose snapshot had at least one non-finite field
    pub incomplete_ticks: u64,
    pub records_persisted: u64,
    pub storage_failures: u64,
    pub reminders_sent: u64,
    /// Step count when the run ended
    pub steps: u32,
    pub stop_reason: Option<StopReason>,
}

/// Everything one tick produced.
#[derive(Debug, Clone)]
pub struct TickOutcome {
    pub tick: u64,
    pub snapshot: BiometricSnapshot,
    pub evaluation: Evaluation,
    /// Health alerts that opened a new episode on this tick
    pub notifications: Vec<NotifyEvent>,
    pub activity: ActivitySummary,
    /// Reading to persist, present every `persist_every` ticks
    pub record: Option<HealthRecord>,
}

pub struct Monitor {
    config: MonitorConfig,
    source: Box<dyn SnapshotSource>,
    notifier: Arc<Notifier>,
    storage: Option<Arc<dyn Storage>>,
    events: Option<mpsc::UnboundedSender<MonitorEvent>>,
    gate: AlertGate,
    latch: StepGoalLatch,
    history: VecDeque<BiometricSnapshot>,
    steps: u32,
    exercise_mins: u32,
    /// Last reminder kind raised per medication id
    reminded: HashMap<String, &'static str>,
    /// Local wall-clock time used for medication schedules
    local_clock: Box<dyn Fn() -> NaiveTime + Send>,
    report: MonitorReport,
}

impl Monitor {
    /// Build a monitor. The config is validated here, so a zero interval,
    /// window or persist period is rejected before the loop can use it.
    pub fn new(
        config: MonitorConfig,
        source: impl SnapshotSource + 'static,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let latch = StepGoalLatch::new(config.step_goal);
        let history = VecDeque::with_capacity(config.history_window);
        Ok(Self {
            config,
            source: Box::new(source),
            notifier: Arc::new(Notifier::disabled()),
            storage: None,
            events: None,
            gate: AlertGate::new(),
            latch,
            history,
            steps: 0,
            exercise_mins: 0,
            reminded: HashMap::new(),
            local_clock: Box::new(|| Local::now().time()),
            report: MonitorReport::default(),
        })
    }

    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    #[must_use]
    pub fn with_storage(mut self, storage: Arc<dyn Storage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Send every [`MonitorEvent`] to `events`.
    #[must_use]
    pub fn with_events(mut self, events: mpsc::UnboundedSender<MonitorEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Starting step count and exercise minutes for the day.
    #[must_use]
    pub fn with_activity(mut self, steps: u32, exercise_mins: u32) -> Self {
        self.steps = steps;
        self.exercise_mins = exercise_mins;
        self
    }

    /// Replace the local wall clock used to match medication schedules.
    #[must_use]
    pub fn with_local_clock(mut self, clock: impl Fn() -> NaiveTime + Send + 'static) -> Self {
        self.local_clock = Box::new(clock);
        self
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn report(&self) -> &MonitorReport {
        &self.report
    }

    /// Recent snapshots, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &BiometricSnapshot> {
        self.history.iter()
    }

    pub fn gate(&self) -> &AlertGate {
        &self.gate
    }

    pub fn activity(&self) -> ActivitySummary {
        ActivitySummary::new(
            self.steps,
            self.exercise_mins,
            ActivityGoals {
                steps: self.config.step_goal,
                exercise_mins: self.config.exercise_goal_mins,
            },
        )
    }

    /// Run one tick. Returns `None` once the source is exhausted.
    ///
    /// Synchronous: nothing is sent or written here. The caller dispatches
    /// `notifications` and persists `record`.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<TickOutcome> {
        let snapshot = self.source.next_snapshot(now)?;
        let evaluation = evaluate(&snapshot, self.history.back());

        self.report.ticks += 1;
        let tick = self.report.ticks;
        self.report.advisories += evaluation.advisories.len() as u64;

        if evaluation.incomplete_input {
            self.report.incomplete_ticks += 1;
            warn!(tick, missing = ?evaluation.missing, "Snapshot has non-finite fields, some rules skipped");
        }

        debug!(tick, advisories = ?evaluation.ids(), "Evaluated snapshot");

        let notifications: Vec<NotifyEvent> = self
            .gate
            .observe(&evaluation.advisories)
            .iter()
            .map(|advisory| {
                info!(
                    tick,
                    rule_id = %advisory.id,
                    severity = advisory.severity.as_str(),
                    "Alert episode opened"
                );
                NotifyEvent::health_alert(advisory, snapshot.captured_at)
            })
            .collect();
        self.report.alerts_dispatched += notifications.len() as u64;

        self.history.push_back(snapshot);
        while self.history.len() > self.config.history_window {
            self.history.pop_front();
        }

        let record = (tick % self.config.persist_every == 0).then(|| {
            HealthRecord::from_snapshot(&self.config.user_id, &snapshot)
                .with_activity(self.steps, self.exercise_mins)
        });

        Some(TickOutcome {
            tick,
            snapshot,
            evaluation,
            notifications,
            activity: self.activity(),
            record,
        })
    }

    /// Apply one step update. Returns the goal notification the first time
    /// the goal is reached.
    pub fn advance_steps(&mut self, now: DateTime<Utc>) -> Option<NotifyEvent> {
        self.steps = self.steps.saturating_add(self.source.step_increment());
        self.report.steps = self.steps;

        self.latch.observe(self.steps).then(|| {
            info!(steps = self.steps, goal = self.latch.goal(), "Step goal reached");
            NotifyEvent::StepGoalReached {
                steps: self.steps,
                goal: self.latch.goal(),
                timestamp: now,
            }
        })
    }

    /// Reminders due at `local_time`. Each medication raises a given kind
    /// of reminder once until its reminder state changes. Medications no
    /// longer in `medications` are forgotten.
    pub fn medication_reminders(
        &mut self,
        medications: &[Medication],
        local_time: NaiveTime,
        now: DateTime<Utc>,
    ) -> Vec<NotifyEvent> {
        self.reminded
            .retain(|id, _| medications.iter().any(|m| &m.id == id));

        let mut events = Vec::new();

        for medication in medications {
            let Some(reminder) = medication_reminder(medication, local_time) else {
                self.reminded.remove(&medication.id);
                continue;
            };

            let kind = reminder_kind(reminder);
            if self.reminded.get(&medication.id) == Some(&kind) {
                continue;
            }
            self.reminded.insert(medication.id.clone(), kind);

            debug!(medication = %medication.medication_name, kind, "Medication reminder");
            events.push(NotifyEvent::medication_reminder(medication, reminder, now));
        }

        self.report.reminders_sent += events.len() as u64;
        events
    }

    /// Spawn the loop on the current tokio runtime.
    pub fn start(self) -> MonitorHandle {
        let (stop_tx, stop_rx) = watch::channel(false);
        let task = tokio::spawn(self.run(stop_rx));
        MonitorHandle { stop_tx, task }
    }

    async fn run(mut self, mut stop: watch::Receiver<bool>) -> MonitorReport {
        let mut ticker = time::interval(self.config.tick_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let step_period = self.config.step_interval();
        let mut step_ticker = time::interval_at(Instant::now() + step_period, step_period);
        step_ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut reminder_ticker = time::interval(REMINDER_INTERVAL);
        reminder_ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let device = self.source.device_status();

        info!(
            user_id = %self.config.user_id,
            interval_secs = self.config.tick_interval_secs,
            channels = self.notifier.channel_count(),
            "Monitor started"
        );
        if !device.connected {
            warn!("Device reports disconnected");
        }
        self.emit(MonitorEvent::Started {
            user_id: self.config.user_id.clone(),
            interval_seconds: self.config.tick_interval_secs,
            device,
            battery: device.battery(),
            signal: device.signal(),
            timestamp: Utc::now(),
        });

        let reason = loop {
            if self.limit_reached() {
                break StopReason::MaxTicks;
            }

            tokio::select! {
                changed = stop.changed() => {
                    if changed.is_err() || *stop.borrow() {
                        break StopReason::Requested;
                    }
                }
                _ = step_ticker.tick() => {
                    if let Some(event) = self.advance_steps(Utc::now()) {
                        self.dispatch(event);
                    }
                }
                _ = ticker.tick() => {
                    let Some(outcome) = self.tick(Utc::now()) else {
                        break StopReason::SourceExhausted;
                    };
                    self.handle_outcome(outcome).await;
                }
                _ = reminder_ticker.tick() => {
                    self.check_medications(Utc::now()).await;
                }
            }
        };

        info!(reason = reason.as_str(), ticks = self.report.ticks, "Monitor stopped");
        self.report.stop_reason = Some(reason);
        self.emit(MonitorEvent::Stopped {
            reason,
            ticks: self.report.ticks,
            timestamp: Utc::now(),
        });

        self.report
    }

    fn limit_reached(&self) -> bool {
        self.config
            .max_ticks
            .is_some_and(|max| self.report.ticks >= max)
    }

    async fn handle_outcome(&mut self, outcome: TickOutcome) {
        let TickOutcome {
            tick,
            snapshot,
            evaluation,
            notifications,
            activity,
            record,
        } = outcome;

        self.emit(MonitorEvent::Tick {
            tick,
            snapshot,
            advisories: evaluation.advisories,
            incomplete_input: evaluation.incomplete_input,
            missing: evaluation.missing,
            activity,
            timestamp: snapshot.captured_at,
        });

        for event in notifications {
            self.dispatch(event);
        }

        if let Some(record) = record {
            self.persist(&record).await;
        }
    }

    async fn persist(&mut self, record: &HealthRecord) {
        let Some(storage) = self.storage.clone() else {
            return;
        };

        match storage.insert_reading(record).await {
            Ok(()) => {
                self.report.records_persisted += 1;
                self.emit(MonitorEvent::Persisted {
                    record_id: record.id.clone(),
                    timestamp: Utc::now(),
                });
            }
            Err(e) => {
                warn!(error = %e, "Failed to persist reading");
                self.report.storage_failures += 1;
                self.emit(MonitorEvent::StorageFailed {
                    error: e.to_string(),
                    timestamp: Utc::now(),
                });
            }
        }
    }

    async fn check_medications(&mut self, now: DateTime<Utc>) {
        let Some(storage) = self.storage.clone() else {
            return;
        };

        let medications = match storage.list_medications(&self.config.user_id).await {
            Ok(medications) => medications,
            Err(e) => {
                warn!(error = %e, "Failed to load medications");
                return;
            }
        };

        let local_time = (self.local_clock)();
        for event in self.medication_reminders(&medications, local_time, now) {
            self.dispatch(event);
        }
    }

    fn dispatch(&self, event: NotifyEvent) {
        self.emit(MonitorEvent::notification(&event));
        self.notifier.notify(event);
    }

    fn emit(&self, event: MonitorEvent) {
        if let Some(events) = &self.events {
            if events.send(event).is_err() {
                debug!("Event receiver dropped");
            }
        }
    }
}

const fn reminder_kind(reminder: Reminder) -> &'static str {
    match reminder {
        Reminder::UpcomingSoon => "upcoming",
        Reminder::DueNow => "due",
        Reminder::Overdue { .. } => "overdue",
    }
}

/// Handle to a running monitor task.
///
/// Dropping the handle stops the loop.
pub struct MonitorHandle {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<MonitorReport>,
}

impl MonitorHandle {
    /// Ask the loop to stop and wait for its report.
    pub async fn stop(self) -> Result<MonitorReport, JoinError> {
        // The loop may already have ended on its own.
        let _ = self.stop_tx.send(true);
        self.task.await
    }

    /// Wait for the loop to end on its own (tick limit or exhausted source).
    pub async fn wait(self) -> Result<MonitorReport, JoinError> {
        let Self { stop_tx, task } = self;
        let report = task.await;
        drop(stop_tx);
        report
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::ReplaySource;

    fn at_glucose(glucose: f64) -> BiometricSnapshot {
        BiometricSnapshot::new(glucose, 72.0, 120.0, 80.0, 98.6, Utc::now())
    }

    fn monitor(glucose: &[f64]) -> Monitor {
        let source = ReplaySource::new(glucose.iter().copied().map(at_glucose));
        Monitor::new(MonitorConfig::default(), source).unwrap()
    }

    #[test]
    fn test_tick_uses_previous_snapshot_for_trend() {
        let mut monitor = monitor(&[100.0, 120.0]);
        let first = monitor.tick(Utc::now()).unwrap();
        assert!(!first.evaluation.ids().contains(&"glucose-trend"));

        let second = monitor.tick(Utc::now()).unwrap();
        assert!(second.evaluation.ids().contains(&"glucose-trend"));
        assert!(monitor.tick(Utc::now()).is_none());
    }

    #[test]
    fn test_history_window_is_bounded() {
        let mut monitor = monitor(&[90.0; 8]);
        while monitor.tick(Utc::now()).is_some() {}
        assert_eq!(monitor.history().count(), 5);
        assert_eq!(monitor.report().ticks, 8);
    }

    #[test]
    fn test_persist_every() {
        let source = ReplaySource::new([90.0, 91.0, 92.0, 93.0].map(at_glucose));
        let config = MonitorConfig {
            persist_every: 2,
            ..MonitorConfig::default()
        };
        let mut monitor = Monitor::new(config, source).unwrap();

        let persisted: Vec<bool> = std::iter::from_fn(|| monitor.tick(Utc::now()))
            .map(|outcome| outcome.record.is_some())
            .collect();
        assert_eq!(persisted, vec![false, true, false, true]);
    }

    #[test]
    fn test_step_goal_fires_once() {
        let source = ReplaySource::default().with_steps(4_000);
        let mut monitor = Monitor::new(MonitorConfig::default(), source).unwrap();

        assert!(monitor.advance_steps(Utc::now()).is_none());
        assert!(monitor.advance_steps(Utc::now()).is_none());
        let event = monitor.advance_steps(Utc::now()).unwrap();
        assert!(matches!(
            event,
            NotifyEvent::StepGoalReached { steps: 12_000, goal: 10_000, .. }
        ));
        assert!(monitor.advance_steps(Utc::now()).is_none());
        assert_eq!(monitor.activity().step_progress, 100.0);
    }

    #[test]
    fn test_medication_reminders_once_per_kind() {
        let mut monitor = monitor(&[]);
        let dose = NaiveTime::from_hms_opt(8, 0, 0).unwrap();
        let medications = vec![Medication::new("local", "Metformin", "500mg", dose)];
        let now = Utc::now();

        let at = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();
        assert_eq!(monitor.medication_reminders(&medications, at(7, 55), now).len(), 1);
        assert!(monitor.medication_reminders(&medications, at(7, 55), now).is_empty());
        assert!(monitor.medication_reminders(&medications, at(7, 57), now).is_empty());
        assert_eq!(monitor.medication_reminders(&medications, at(8, 0), now).len(), 1);
        assert_eq!(monitor.medication_reminders(&medications, at(8, 10), now).len(), 1);
        assert!(monitor.medication_reminders(&medications, at(8, 11), now).is_empty());
        assert_eq!(monitor.report().reminders_sent, 3);
    }

    #[test]
    fn test_removed_medications_are_forgotten() {
        let mut monitor = monitor(&[]);
        let dose = NaiveTime::from_hms_opt(8, 0, 0).unwrap();
        let kept = Medication::new("local", "Metformin", "500mg", dose);
        let removed = Medication::new("local", "Aspirin", "81mg", dose);
        let now = Utc::now();

        let both = vec![kept.clone(), removed];
        assert_eq!(monitor.medication_reminders(&both, dose, now).len(), 2);
        assert_eq!(monitor.reminded.len(), 2);

        let remaining = vec![kept];
        assert!(monitor.medication_reminders(&remaining, dose, now).is_empty());
        assert_eq!(monitor.reminded.len(), 1);

        assert!(monitor.medication_reminders(&[], dose, now).is_empty());
        assert!(monitor.reminded.is_empty());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = MonitorConfig {
            persist_every: 0,
            ..MonitorConfig::default()
        };
        let source = ReplaySource::new([at_glucose(90.0)]);
        assert!(matches!(
            Monitor::new(config, source),
            Err(ConfigError::Invalid(_))
        ));
    }
}
