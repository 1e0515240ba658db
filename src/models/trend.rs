use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Rising,
    Falling,
    Stable,
}

// ---------------------------------------------------------------------------
// TrendResult: regression-based trend over a price window
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendResult {
    pub current: f64,
    pub avg: f64,
    pub min: f64,
    pub max: f64,
    pub volatility: f64,
    pub direction: Direction,
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination of the fit, within `[0, 1]`.
    pub confidence: f64,
    pub change_percent: f64,
    pub moving_average: Option<f64>,
    pub data_points: usize,
}

// ---------------------------------------------------------------------------
// Seasonality
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeasonalityPeriod {
    Weekly,
    Monthly,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalBucket {
    /// Weekday number (0 = Monday) or month number (1 = January).
    pub key: u32,
    pub label: String,
    pub avg: f64,
    pub samples: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalityResult {
    pub period: SeasonalityPeriod,
    pub buckets: Vec<SeasonalBucket>,
    /// Standard deviation across bucket averages.
    pub variance: f64,
    pub significant: bool,
    pub peak: Option<String>,
    pub trough: Option<String>,
}
