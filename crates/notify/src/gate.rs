//! Episode de-duplication for alert advisories.
//!
//! A rule that stays out of range for many ticks is one episode and should
//! produce one notification. [`AlertGate`] tracks which alert rule ids are
//! currently firing and lets an advisory through only on the tick its episode
//! opens. The episode closes on the first tick the rule id is absent.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;
use vitals::Advisory;

/// Delivery state of one rule id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryState {
    Idle,
    Firing,
}

/// Tracks open alert episodes across ticks.
///
/// Owned by a single writer (the monitor task); not shared.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlertGate {
    firing: HashSet<String>,
}

impl AlertGate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one tick's advisories and return those that open a new episode.
    ///
    /// Only `alert`-category advisories take part. Other categories never
    /// dispatch and do not touch episode state.
    pub fn observe(&mut self, advisories: &[Advisory]) -> Vec<Advisory> {
        let present: HashSet<&str> = advisories
            .iter()
            .filter(|a| a.is_alert())
            .map(|a| a.id.as_str())
            .collect();

        self.firing.retain(|id| {
            let still_firing = present.contains(id.as_str());
            if !still_firing {
                debug!(rule_id = %id, "Alert episode closed");
            }
            still_firing
        });

        let mut dispatch = Vec::new();
        for advisory in advisories.iter().filter(|a| a.is_alert()) {
            if self.firing.insert(advisory.id.clone()) {
                debug!(rule_id = %advisory.id, "Alert episode opened");
                dispatch.push(advisory.clone());
            } else {
                debug!(rule_id = %advisory.id, "Suppressing repeat alert");
            }
        }

        dispatch
    }

    #[must_use]
    pub fn state(&self, rule_id: &str) -> DeliveryState {
        if self.firing.contains(rule_id) {
            DeliveryState::Firing
        } else {
            DeliveryState::Idle
        }
    }

    #[must_use]
    pub fn is_firing(&self, rule_id: &str) -> bool {
        self.firing.contains(rule_id)
    }

    /// Number of open episodes.
    #[must_use]
    pub fn firing_count(&self) -> usize {
        self.firing.len()
    }

    /// Close every open episode.
    pub fn reset(&mut self) {
        self.firing.clear();
    }
}

/// Default daily step goal.
pub const DEFAULT_STEP_GOAL: u32 = 10_000;

/// Fires once when the daily step count reaches the goal.
///
/// Re-arms when the count drops below a tenth of the goal, which is how a
/// counter reset at the start of a new day shows up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepGoalLatch {
    goal: u32,
    reached: bool,
}

impl Default for StepGoalLatch {
    fn default() -> Self {
        Self::new(DEFAULT_STEP_GOAL)
    }
}

impl StepGoalLatch {
    #[must_use]
    pub const fn new(goal: u32) -> Self {
        Self {
            goal,
            reached: false,
        }
    }

    #[must_use]
    pub const fn goal(&self) -> u32 {
        self.goal
    }

    /// Returns true on the observation that first reaches the goal.
    pub fn observe(&mut self, steps: u32) -> bool {
        if steps >= self.goal {
            if self.reached {
                return false;
            }
            self.reached = true;
            return true;
        }

        if self.reached && steps < self.goal / 10 {
            debug!(steps, goal = self.goal, "Step goal latch re-armed");
            self.reached = false;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use vitals::{evaluate, BiometricSnapshot, RuleId};

    fn tick(gate: &mut AlertGate, glucose: f64) -> Vec<String> {
        let snapshot = BiometricSnapshot::new(glucose, 72.0, 120.0, 80.0, 98.6, Utc::now());
        let evaluation = evaluate(&snapshot, None);
        gate.observe(&evaluation.advisories)
            .into_iter()
            .map(|a| a.id)
            .collect()
    }

    #[test]
    fn test_sustained_low_dispatches_once() {
        let mut gate = AlertGate::new();
        assert_eq!(tick(&mut gate, 50.0), vec!["glucose-low"]);
        assert!(tick(&mut gate, 50.0).is_empty());
        assert!(tick(&mut gate, 50.0).is_empty());
        assert!(gate.is_firing("glucose-low"));
    }

    #[test]
    fn test_recovery_reopens_episode() {
        let mut gate = AlertGate::new();
        assert_eq!(tick(&mut gate, 50.0), vec!["glucose-low"]);
        assert!(tick(&mut gate, 90.0).is_empty());
        assert_eq!(gate.state("glucose-low"), DeliveryState::Idle);
        assert_eq!(tick(&mut gate, 50.0), vec!["glucose-low"]);
    }

    #[test]
    fn test_non_alert_categories_never_dispatch() {
        let mut gate = AlertGate::new();
        let advisories = vec![
            RuleId::GlucoseElevated.advisory("Glucose Elevated", "walk"),
            RuleId::GlucoseTrend.advisory("Glucose Rising", "rising"),
            RuleId::HeartRateNormal.advisory("Heart Rate Normal", "ok"),
        ];
        assert!(gate.observe(&advisories).is_empty());
        assert_eq!(gate.firing_count(), 0);
    }

    #[test]
    fn test_non_alert_advisory_does_not_close_episode() {
        let mut gate = AlertGate::new();
        let fever = RuleId::Fever.advisory("Fever", "hot");
        let trend = RuleId::GlucoseTrend.advisory("Glucose Rising", "rising");

        assert_eq!(gate.observe(&[fever.clone()]).len(), 1);
        assert!(gate.observe(&[fever, trend.clone()]).is_empty());
        assert!(gate.is_firing("fever"));

        assert!(gate.observe(&[trend]).is_empty());
        assert!(!gate.is_firing("fever"));
    }

    #[test]
    fn test_independent_rule_ids() {
        let mut gate = AlertGate::new();
        let low = RuleId::GlucoseLow.advisory("Low", "low");
        let fever = RuleId::Fever.advisory("Fever", "hot");

        assert_eq!(gate.observe(&[low.clone()]).len(), 1);
        let dispatched = gate.observe(&[low, fever]);
        assert_eq!(dispatched.len(), 1);
        assert_eq!(dispatched[0].id, "fever");
        assert_eq!(gate.firing_count(), 2);
    }

    #[test]
    fn test_reset_closes_everything() {
        let mut gate = AlertGate::new();
        assert_eq!(tick(&mut gate, 50.0).len(), 1);
        gate.reset();
        assert_eq!(tick(&mut gate, 50.0).len(), 1);
    }

    #[test]
    fn test_step_goal_latch() {
        let mut latch = StepGoalLatch::default();
        assert!(!latch.observe(9_999));
        assert!(latch.observe(10_000));
        assert!(!latch.observe(10_500));
        assert!(!latch.observe(5_000));
        assert!(!latch.observe(10_200));

        assert!(!latch.observe(999));
        assert!(latch.observe(10_001));
    }
}
