//! Exercise recommendations per glucose band.

use serde::Serialize;

use super::GlucoseBand;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    Low,
    Moderate,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseRecommendation {
    pub name: &'static str,
    pub duration_mins: u32,
    pub intensity: Intensity,
    pub glucose_impact: &'static str,
    pub calories_burned: u32,
}

const fn exercise(
    name: &'static str,
    duration_mins: u32,
    intensity: Intensity,
    glucose_impact: &'static str,
    calories_burned: u32,
) -> ExerciseRecommendation {
    ExerciseRecommendation {
        name,
        duration_mins,
        intensity,
        glucose_impact,
        calories_burned,
    }
}

// High glucose: moderate to high intensity helps bring levels down.
const HIGH: [ExerciseRecommendation; 3] = [
    exercise("Brisk Walking", 30, Intensity::Moderate, "Can reduce glucose by 20-40 mg/dL", 150),
    exercise("Light Jogging", 20, Intensity::Moderate, "Can reduce glucose by 30-50 mg/dL", 200),
    exercise(
        "Resistance Training",
        25,
        Intensity::High,
        "Improves insulin sensitivity for 24-48 hours",
        180,
    ),
];

// Low glucose: nothing intense until levels recover.
const LOW: [ExerciseRecommendation; 2] = [
    exercise("Gentle Stretching", 15, Intensity::Low, "Safe for low glucose, minimal impact", 30),
    exercise("Slow Walk", 10, Intensity::Low, "Light activity after snack recommended", 40),
];

const NORMAL: [ExerciseRecommendation; 4] = [
    exercise("Moderate Walking", 30, Intensity::Moderate, "Maintains stable glucose levels", 120),
    exercise("Cycling", 25, Intensity::Moderate, "Great for cardiovascular health", 170),
    exercise("Yoga", 30, Intensity::Low, "Reduces stress, stabilizes glucose", 80),
    exercise(
        "Swimming",
        20,
        Intensity::Moderate,
        "Full-body workout, excellent for joints",
        200,
    ),
];

#[must_use]
pub fn exercise_recommendations(band: GlucoseBand) -> Vec<ExerciseRecommendation> {
    match band {
        GlucoseBand::High => HIGH.to_vec(),
        GlucoseBand::Low => LOW.to_vec(),
        GlucoseBand::Normal => NORMAL.to_vec(),
    }
}

/// Extra caution shown with the recommendations, if any.
#[must_use]
pub const fn exercise_guidance(band: GlucoseBand) -> Option<&'static str> {
    match band {
        GlucoseBand::High => Some(
            "Your glucose is elevated. A 15-30 minute walk can help reduce levels by \
             20-40 mg/dL. Consider light exercise after your next meal.",
        ),
        GlucoseBand::Low => Some(
            "Your glucose is low. Avoid intense exercise and have a snack with fast-acting \
             carbs first. Light stretching is safe after stabilizing.",
        ),
        GlucoseBand::Normal => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_low_band_avoids_intense_exercise() {
        let recs = exercise_recommendations(GlucoseBand::Low);
        assert_eq!(recs.len(), 2);
        assert!(recs.iter().all(|r| r.intensity == Intensity::Low));
    }

    #[test]
    fn test_normal_band_offers_four_options() {
        let recs = exercise_recommendations(GlucoseBand::Normal);
        let names: Vec<_> = recs.iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["Moderate Walking", "Cycling", "Yoga", "Swimming"]);
    }

    #[test]
    fn test_high_band_guidance_mentions_walk() {
        let guidance = exercise_guidance(GlucoseBand::High).unwrap();
        assert!(guidance.contains("walk"));
        assert!(exercise_guidance(GlucoseBand::Normal).is_none());
    }
}
