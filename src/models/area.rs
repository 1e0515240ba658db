use serde::{Deserialize, Serialize};

use super::observation::FuelType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AreaKind {
    Region,
    Municipality,
}

/// A named geographic area: a region (state) or a municipality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Area {
    pub name: String,
    pub kind: AreaKind,
    pub id: String,
}

impl Area {
    pub fn region(name: &str, id: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: AreaKind::Region,
            id: id.to_string(),
        }
    }

    pub fn municipality(name: &str, id: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: AreaKind::Municipality,
            id: id.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Per-area statistics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaFuelStats {
    pub fuel_type: FuelType,
    pub avg: f64,
    pub min: f64,
    pub max: f64,
    pub stddev: f64,
    pub station_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaStats {
    pub area: Area,
    /// Only fuels with at least one recent observation appear here.
    pub fuels: Vec<AreaFuelStats>,
}

impl AreaStats {
    pub fn fuel(&self, fuel: FuelType) -> Option<&AreaFuelStats> {
        self.fuels.iter().find(|s| s.fuel_type == fuel)
    }
}

// ---------------------------------------------------------------------------
// Comparison matrix, insights, ranking
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaDifference {
    pub from: String,
    pub to: String,
    pub fuel_type: FuelType,
    /// `avg(from) - avg(to)`.
    pub difference: f64,
    pub difference_percent: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaValue {
    pub area: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelInsight {
    pub fuel_type: FuelType,
    pub cheapest: AreaValue,
    pub most_expensive: AreaValue,
    /// Only reported when more than two areas carry data for the fuel.
    pub average_across_areas: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitionIndex {
    pub area: String,
    /// Mean coefficient of variation across fuels.
    pub index: f64,
    pub is_highest: bool,
    pub is_lowest: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AreaInsights {
    pub fuels: Vec<FuelInsight>,
    pub highest_disparity: Option<AreaValue>,
    pub lowest_disparity: Option<AreaValue>,
    pub competition: Vec<CompetitionIndex>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaRanking {
    pub rank: usize,
    pub area: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaReport {
    pub areas: Vec<AreaStats>,
    pub matrix: Vec<AreaDifference>,
    pub insights: AreaInsights,
    pub ranking: Vec<AreaRanking>,
}
