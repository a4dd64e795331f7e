//! Glucose-driven lifestyle advice: food, exercise, meal plans and activity
//! progress.
//!
//! Advice uses its own three bands (< 70 low, > 140 high, otherwise normal),
//! which are wider than the evaluator's optimal band.

pub mod activity;
pub mod exercise;
pub mod food;
pub mod meal_plan;

use serde::{Deserialize, Serialize};

pub use activity::{ActivityGoals, ActivitySummary};
pub use exercise::{exercise_guidance, exercise_recommendations, ExerciseRecommendation, Intensity};
pub use food::{food_suggestions, FoodEffect, FoodSuggestion};
pub use meal_plan::{meal_plan, GlucoseImpact, Meal, MealItem, MealPlan, MealSection};

const LOW: f64 = 70.0;
const HIGH: f64 = 140.0;

/// Glucose band used by the advice tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GlucoseBand {
    Low,
    Normal,
    High,
}

impl GlucoseBand {
    #[must_use]
    pub fn classify(glucose: f64) -> Self {
        if glucose < LOW {
            Self::Low
        } else if glucose > HIGH {
            Self::High
        } else {
            Self::Normal
        }
    }

    /// Short headline shown above the food suggestions.
    #[must_use]
    pub const fn headline(&self) -> &'static str {
        match self {
            Self::Low => "Low Glucose - Quick Action Needed",
            Self::High => "High Glucose - Choose Carefully",
            Self::Normal => "Normal Range - Maintain Balance",
        }
    }
}

/// Everything the advice tables say about one glucose reading.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdviceSheet {
    pub glucose: f64,
    pub band: GlucoseBand,
    pub headline: &'static str,
    pub foods: Vec<FoodSuggestion>,
    pub exercises: Vec<ExerciseRecommendation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guidance: Option<&'static str>,
}

impl AdviceSheet {
    #[must_use]
    pub fn for_glucose(glucose: f64) -> Self {
        let band = GlucoseBand::classify(glucose);
        Self {
            glucose,
            band,
            headline: band.headline(),
            foods: food_suggestions(band),
            exercises: exercise_recommendations(band),
            guidance: exercise_guidance(band),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_boundaries() {
        assert_eq!(GlucoseBand::classify(69.9), GlucoseBand::Low);
        assert_eq!(GlucoseBand::classify(70.0), GlucoseBand::Normal);
        assert_eq!(GlucoseBand::classify(120.0), GlucoseBand::Normal);
        assert_eq!(GlucoseBand::classify(140.0), GlucoseBand::Normal);
        assert_eq!(GlucoseBand::classify(140.1), GlucoseBand::High);
    }

    #[test]
    fn test_advice_sheet_for_high_glucose() {
        let sheet = AdviceSheet::for_glucose(190.0);
        assert_eq!(sheet.band, GlucoseBand::High);
        assert_eq!(sheet.headline, "High Glucose - Choose Carefully");
        assert_eq!(sheet.foods.len(), 3);
        assert_eq!(sheet.exercises.len(), 3);
        assert!(sheet.guidance.is_some());
    }

    #[test]
    fn test_advice_sheet_for_normal_glucose_has_no_guidance() {
        let sheet = AdviceSheet::for_glucose(110.0);
        assert_eq!(sheet.band, GlucoseBand::Normal);
        assert!(sheet.guidance.is_none());
    }
}
