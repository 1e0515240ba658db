use serde::{Deserialize, Serialize};

use super::observation::FuelType;

/// Declaration order is urgency order: `Critical` sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    OutlierHigh,
    OutlierLow,
    AboveAverage,
    BelowAverage,
    CompetitiveAdvantage,
}

impl RecommendationKind {
    /// Translation key prefix; `.title` and `.message` are appended.
    pub fn template_key(&self) -> &'static str {
        match self {
            RecommendationKind::OutlierHigh => "recommendation.outlier_high",
            RecommendationKind::OutlierLow => "recommendation.outlier_low",
            RecommendationKind::AboveAverage => "recommendation.above_average",
            RecommendationKind::BelowAverage => "recommendation.below_average",
            RecommendationKind::CompetitiveAdvantage => "recommendation.competitive_advantage",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub fuel_type: FuelType,
    pub kind: RecommendationKind,
    pub priority: Priority,
    pub title: String,
    pub message: String,
    pub current_price: f64,
    pub suggested_price: f64,
    pub confidence: f64,
}
