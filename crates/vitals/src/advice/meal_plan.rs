//! Full-day meal plans per glucose band.
//!
//! A low reading gets an immediate correction and a follow-up snack instead
//! of a day plan.

use serde::Serialize;

use super::GlucoseBand;

/// Expected effect of a meal item on glucose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GlucoseImpact {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealItem {
    pub name: &'static str,
    pub portion: &'static str,
    pub calories: u32,
    pub glucose_impact: GlucoseImpact,
    pub benefits: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Meal {
    pub time: &'static str,
    pub kind: &'static str,
    pub total_calories: u32,
    pub items: Vec<MealItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MealSection {
    pub name: &'static str,
    pub meal: Meal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealPlan {
    pub band: GlucoseBand,
    pub sections: Vec<MealSection>,
}

impl MealPlan {
    /// Sum of every meal's listed total.
    #[must_use]
    pub fn total_daily_calories(&self) -> u32 {
        self.sections.iter().map(|s| s.meal.total_calories).sum()
    }

    #[must_use]
    pub fn section(&self, name: &str) -> Option<&Meal> {
        self.sections.iter().find(|s| s.name == name).map(|s| &s.meal)
    }
}

const fn item(
    name: &'static str,
    portion: &'static str,
    calories: u32,
    glucose_impact: GlucoseImpact,
    benefits: &'static str,
) -> MealItem {
    MealItem {
        name,
        portion,
        calories,
        glucose_impact,
        benefits,
    }
}

fn section(
    name: &'static str,
    time: &'static str,
    kind: &'static str,
    total_calories: u32,
    items: &[MealItem],
) -> MealSection {
    MealSection {
        name,
        meal: Meal {
            time,
            kind,
            total_calories,
            items: items.to_vec(),
        },
    }
}

#[must_use]
pub fn meal_plan(band: GlucoseBand) -> MealPlan {
    use GlucoseImpact::{High, Low, Medium};

    let sections = match band {
        GlucoseBand::Low => vec![
            section(
                "immediate",
                "Now",
                "Quick Action",
                100,
                &[
                    item("Orange Juice", "1/2 cup", 55, High, "Fast-acting sugar for quick recovery"),
                    item("Glucose Tablets", "3-4 tablets", 45, High, "Immediate glucose boost"),
                ],
            ),
            section(
                "followUp",
                "15 mins later",
                "Stabilizing Snack",
                200,
                &[
                    item("Whole Wheat Crackers", "6 crackers", 80, Medium, "Complex carbs for sustained energy"),
                    item("Peanut Butter", "2 tbsp", 190, Low, "Protein + healthy fats"),
                ],
            ),
        ],
        GlucoseBand::High => vec![
            section(
                "breakfast",
                "7:00 AM",
                "Breakfast",
                350,
                &[
                    item("Scrambled Eggs", "2 eggs", 180, Low, "High protein, no carbs"),
                    item("Spinach Sauté", "1 cup", 40, Low, "Fiber-rich, low glycemic"),
                    item("Avocado", "1/2", 130, Low, "Healthy fats, very low GI"),
                ],
            ),
            section(
                "lunch",
                "12:30 PM",
                "Lunch",
                450,
                &[
                    item("Grilled Salmon", "5 oz", 250, Low, "Omega-3, no glucose spike"),
                    item("Mixed Greens Salad", "2 cups", 50, Low, "High fiber, low calories"),
                    item("Olive Oil Dressing", "2 tbsp", 150, Low, "Healthy monounsaturated fats"),
                ],
            ),
            section(
                "snack",
                "3:30 PM",
                "Afternoon Snack",
                150,
                &[
                    item("Almonds", "1/4 cup", 100, Low, "Protein + fiber"),
                    item("Celery Sticks", "4 sticks", 10, Low, "Virtually no glucose impact"),
                    item("Cucumber Slices", "1/2 cup", 8, Low, "Hydrating, low calorie"),
                ],
            ),
            section(
                "dinner",
                "7:00 PM",
                "Dinner",
                500,
                &[
                    item("Grilled Chicken Breast", "6 oz", 280, Low, "Lean protein source"),
                    item("Steamed Broccoli", "1.5 cups", 80, Low, "High fiber, vitamin C"),
                    item("Cauliflower Rice", "1 cup", 40, Low, "Low-carb rice alternative"),
                    item("Olive Oil", "1 tbsp", 100, Low, "Heart-healthy fats"),
                ],
            ),
        ],
        GlucoseBand::Normal => vec![
            section(
                "breakfast",
                "7:00 AM",
                "Breakfast",
                400,
                &[
                    item("Steel-Cut Oatmeal", "1 cup cooked", 150, Medium, "Slow-release energy"),
                    item("Mixed Berries", "1/2 cup", 40, Low, "Antioxidants, low sugar"),
                    item("Greek Yogurt", "1/2 cup", 80, Low, "Protein + probiotics"),
                    item("Walnuts", "1 tbsp", 50, Low, "Omega-3 fatty acids"),
                ],
            ),
            section(
                "lunch",
                "12:30 PM",
                "Lunch",
                550,
                &[
                    item("Quinoa", "1 cup cooked", 220, Medium, "Complete protein grain"),
                    item("Grilled Chicken", "4 oz", 180, Low, "Lean protein"),
                    item("Roasted Vegetables", "1 cup", 100, Low, "Fiber + vitamins"),
                    item("Tahini Dressing", "1 tbsp", 50, Low, "Healthy fats + calcium"),
                ],
            ),
            section(
                "snack",
                "3:30 PM",
                "Afternoon Snack",
                200,
                &[
                    item("Apple", "1 medium", 95, Medium, "Fiber slows sugar absorption"),
                    item("Almond Butter", "1 tbsp", 100, Low, "Protein + healthy fats"),
                ],
            ),
            section(
                "dinner",
                "7:00 PM",
                "Dinner",
                600,
                &[
                    item("Baked Salmon", "5 oz", 280, Low, "Omega-3 rich"),
                    item("Sweet Potato", "1 medium", 130, Medium, "Complex carbs + fiber"),
                    item("Asparagus", "8 spears", 30, Low, "Low calorie, nutrient dense"),
                    item("Lemon Herb Sauce", "2 tbsp", 80, Low, "Fresh, light flavoring"),
                ],
            ),
        ],
    };

    MealPlan { band, sections }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_low_plan_is_correction_only() {
        let plan = meal_plan(GlucoseBand::Low);
        let names: Vec<_> = plan.sections.iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["immediate", "followUp"]);
        assert_eq!(plan.total_daily_calories(), 300);
        assert_eq!(plan.section("immediate").unwrap().time, "Now");
    }

    #[test]
    fn test_daily_totals() {
        assert_eq!(meal_plan(GlucoseBand::High).total_daily_calories(), 1450);
        assert_eq!(meal_plan(GlucoseBand::Normal).total_daily_calories(), 1750);
    }

    #[test]
    fn test_high_plan_keeps_glucose_impact_low() {
        let plan = meal_plan(GlucoseBand::High);
        assert!(plan
            .sections
            .iter()
            .flat_map(|s| s.meal.items.iter())
            .all(|i| i.glucose_impact == GlucoseImpact::Low));
        assert!(plan.section("immediate").is_none());
    }
}
