//! Advisory output produced by the rule evaluator.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of guidance an advisory carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Trend-based outlook
    Prediction,
    /// Out-of-range reading that needs attention now
    Alert,
    /// Suggested action for a borderline reading
    Recommendation,
    /// Reading inside its healthy band
    Normal,
}

impl Category {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Prediction => "prediction",
            Self::Alert => "alert",
            Self::Recommendation => "recommendation",
            Self::Normal => "normal",
        }
    }

    /// Color tone a rendering surface should use for this category.
    #[must_use]
    pub const fn tone(&self) -> Tone {
        match self {
            Self::Alert => Tone::Danger,
            Self::Recommendation => Tone::Warning,
            Self::Prediction => Tone::Primary,
            Self::Normal => Tone::Success,
        }
    }

    /// Badge variant used next to the confidence score.
    #[must_use]
    pub const fn badge(&self) -> BadgeVariant {
        match self {
            Self::Alert => BadgeVariant::Destructive,
            Self::Prediction => BadgeVariant::Default,
            Self::Recommendation | Self::Normal => BadgeVariant::Secondary,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity levels used to route notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational - nothing to act on
    Info,
    /// Warning - something needs attention
    Warning,
    /// Critical - immediate action required
    Critical,
}

impl Severity {
    /// Get display name for this severity.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "Info",
            Self::Warning => "Warning",
            Self::Critical => "Critical",
        }
    }
}

/// Presentation tone for a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Danger,
    Warning,
    Primary,
    Success,
}

/// Badge style for a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeVariant {
    Destructive,
    Default,
    Secondary,
}

/// One piece of rule-derived guidance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advisory {
    /// Stable key of the rule that fired (e.g. `glucose-low`)
    pub id: String,
    pub category: Category,
    pub title: String,
    pub message: String,
    /// Fixed per-rule percentage, 0-100
    pub confidence: u8,
    pub severity: Severity,
}

impl Advisory {
    /// Whether this advisory can open a notification episode.
    #[must_use]
    pub fn is_alert(&self) -> bool {
        self.category == Category::Alert
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_tones() {
        assert_eq!(Category::Alert.tone(), Tone::Danger);
        assert_eq!(Category::Recommendation.tone(), Tone::Warning);
        assert_eq!(Category::Prediction.tone(), Tone::Primary);
        assert_eq!(Category::Normal.tone(), Tone::Success);
    }

    #[test]
    fn test_category_badges() {
        assert_eq!(Category::Alert.badge(), BadgeVariant::Destructive);
        assert_eq!(Category::Prediction.badge(), BadgeVariant::Default);
        assert_eq!(Category::Normal.badge(), BadgeVariant::Secondary);
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Critical > Severity::Warning);
        assert!(Severity::Warning > Severity::Info);
        assert_eq!(Severity::Critical.as_str(), "Critical");
    }
}
