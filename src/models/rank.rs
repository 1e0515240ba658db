use serde::{Deserialize, Serialize};

use super::observation::FuelType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankTrend {
    New,
    Improving,
    Worsening,
    Maintaining,
}

impl RankTrend {
    /// Compare today's rank against yesterday's. A lower rank is a cheaper position.
    pub fn from_ranks(current: usize, previous: Option<usize>) -> Self {
        match previous {
            None => RankTrend::New,
            Some(prev) if current < prev => RankTrend::Improving,
            Some(prev) if current > prev => RankTrend::Worsening,
            Some(_) => RankTrend::Maintaining,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionLabel {
    Cheapest,
    VeryCompetitive,
    Competitive,
    AboveAverage,
    Expensive,
    MostExpensive,
}

impl PositionLabel {
    pub fn from_rank(rank: usize, total: usize, percentile: f64) -> Self {
        if rank == 1 {
            PositionLabel::Cheapest
        } else if percentile <= 25.0 {
            PositionLabel::VeryCompetitive
        } else if percentile <= 50.0 {
            PositionLabel::Competitive
        } else if percentile <= 75.0 {
            PositionLabel::AboveAverage
        } else if rank == total {
            PositionLabel::MostExpensive
        } else {
            PositionLabel::Expensive
        }
    }
}

// ---------------------------------------------------------------------------
// RankResult
// ---------------------------------------------------------------------------

/// Where a station sits among its competitors for one fuel.
///
/// `1 <= rank <= total`; ties share the lowest rank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankResult {
    pub station_id: String,
    pub fuel_type: FuelType,
    pub rank: usize,
    pub total: usize,
    pub percentile: f64,
    pub price: f64,
    pub diff_from_first: f64,
    pub position_label: PositionLabel,
    pub trend: RankTrend,
    pub previous_rank: Option<usize>,
}
