use serde::{Deserialize, Serialize};

use super::observation::FuelType;

// ---------------------------------------------------------------------------
// Quartile: which quarter of the competitor distribution a price falls in
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Quartile {
    Q1,
    Q2,
    Q3,
    Q4,
}

impl Quartile {
    /// Q1 and Q2 are the cheaper half of the market.
    pub fn is_lower_half(&self) -> bool {
        matches!(self, Quartile::Q1 | Quartile::Q2)
    }
}

// ---------------------------------------------------------------------------
// SpreadResult: statistics of a competitor set and a station's position in it
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketStats {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub avg: Option<f64>,
    pub median: Option<f64>,
    pub stddev: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Quartiles {
    pub q1: Option<f64>,
    pub q2: Option<f64>,
    pub q3: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub user_price: Option<f64>,
    pub from_min: Option<f64>,
    pub from_max: Option<f64>,
    pub from_avg: Option<f64>,
    pub from_avg_percent: Option<f64>,
    pub quartile: Option<Quartile>,
    pub is_outlier: bool,
}

/// Spread analysis for a single fuel type.
///
/// Monetary fields are rounded to 2 decimals; the empty analysis has every
/// field `None` and `is_outlier == false`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpreadResult {
    pub fuel_type: FuelType,
    pub competitor_count: usize,
    pub market: MarketStats,
    pub quartiles: Quartiles,
    pub position: Position,
}

impl SpreadResult {
    pub fn empty(fuel_type: FuelType) -> Self {
        Self {
            fuel_type,
            competitor_count: 0,
            market: MarketStats::default(),
            quartiles: Quartiles::default(),
            position: Position::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.market.avg.is_none() || self.position.user_price.is_none()
    }
}
