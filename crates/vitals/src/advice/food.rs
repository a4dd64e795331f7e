//! Food suggestions per glucose band.

use serde::Serialize;

use super::GlucoseBand;

/// How a food affects glucose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FoodEffect {
    Lower,
    Stable,
    Avoid,
}

impl FoodEffect {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Lower => "Lowers",
            Self::Stable => "Stabilizes",
            Self::Avoid => "Avoid",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FoodSuggestion {
    pub name: &'static str,
    pub effect: FoodEffect,
    pub description: &'static str,
}

const fn food(name: &'static str, effect: FoodEffect, description: &'static str) -> FoodSuggestion {
    FoodSuggestion {
        name,
        effect,
        description,
    }
}

const LOW_FOODS: [FoodSuggestion; 3] = [
    food("Orange Juice", FoodEffect::Stable, "Quick glucose boost"),
    food("Banana", FoodEffect::Stable, "Natural sugars + potassium"),
    food("Glucose Tablets", FoodEffect::Stable, "Fast-acting glucose"),
];

const HIGH_FOODS: [FoodSuggestion; 3] = [
    food("Leafy Greens", FoodEffect::Lower, "Low glycemic index"),
    food("Grilled Chicken", FoodEffect::Lower, "Protein without carbs"),
    food("Avoid Sweets", FoodEffect::Avoid, "Skip high-sugar foods"),
];

const NORMAL_FOODS: [FoodSuggestion; 3] = [
    food("Whole Grains", FoodEffect::Stable, "Steady energy release"),
    food("Nuts & Seeds", FoodEffect::Stable, "Healthy fats & protein"),
    food("Lean Protein", FoodEffect::Stable, "Maintains glucose balance"),
];

#[must_use]
pub fn food_suggestions(band: GlucoseBand) -> Vec<FoodSuggestion> {
    match band {
        GlucoseBand::Low => LOW_FOODS.to_vec(),
        GlucoseBand::High => HIGH_FOODS.to_vec(),
        GlucoseBand::Normal => NORMAL_FOODS.to_vec(),
    }
}
