//! Daily step and exercise progress.

use serde::{Deserialize, Serialize};

/// Daily activity targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityGoals {
    pub steps: u32,
    pub exercise_mins: u32,
}

impl Default for ActivityGoals {
    fn default() -> Self {
        Self {
            steps: 10_000,
            exercise_mins: 30,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivitySummary {
    pub steps: u32,
    pub exercise_mins: u32,
    /// Percent of the step goal, capped at 100
    pub step_progress: f64,
    /// Percent of the exercise goal, capped at 100
    pub exercise_progress: f64,
    pub calories_burned: u32,
}

impl ActivitySummary {
    #[must_use]
    pub fn new(steps: u32, exercise_mins: u32, goals: ActivityGoals) -> Self {
        Self {
            steps,
            exercise_mins,
            step_progress: progress(steps, goals.steps),
            exercise_progress: progress(exercise_mins, goals.exercise_mins),
            calories_burned: (f64::from(steps) * 0.04 + f64::from(exercise_mins) * 5.0).round()
                as u32,
        }
    }
}

fn progress(value: u32, goal: u32) -> f64 {
    if goal == 0 {
        return 100.0;
    }
    (f64::from(value) / f64::from(goal) * 100.0).min(100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_and_calories() {
        let summary = ActivitySummary::new(5_000, 15, ActivityGoals::default());
        assert_eq!(summary.step_progress, 50.0);
        assert_eq!(summary.exercise_progress, 50.0);
        // 5000 * 0.04 + 15 * 5
        assert_eq!(summary.calories_burned, 275);
    }

    #[test]
    fn test_progress_is_capped() {
        let summary = ActivitySummary::new(25_000, 90, ActivityGoals::default());
        assert_eq!(summary.step_progress, 100.0);
        assert_eq!(summary.exercise_progress, 100.0);
    }

    #[test]
    fn test_zero_goal_counts_as_complete() {
        let goals = ActivityGoals {
            steps: 0,
            exercise_mins: 0,
        };
        let summary = ActivitySummary::new(0, 0, goals);
        assert_eq!(summary.step_progress, 100.0);
        assert_eq!(summary.calories_burned, 0);
    }
}
