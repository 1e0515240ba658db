use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::observation::FuelType;
use crate::error::FuelMarketError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Hourly,
    Daily,
    Weekly,
    Monthly,
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Period::Hourly => "hourly",
            Period::Daily => "daily",
            Period::Weekly => "weekly",
            Period::Monthly => "monthly",
        };
        f.write_str(s)
    }
}

impl FromStr for Period {
    type Err = FuelMarketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hourly" => Ok(Period::Hourly),
            "daily" => Ok(Period::Daily),
            "weekly" => Ok(Period::Weekly),
            "monthly" => Ok(Period::Monthly),
            other => Err(FuelMarketError::InvalidArgument(format!(
                "Unknown period: {}",
                other
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// MarketAggregate: statistics for one period bucket and fuel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NationalComparison {
    pub national_avg: f64,
    pub difference: f64,
    pub difference_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketAggregate {
    pub period_key: String,
    pub fuel_type: FuelType,
    pub avg: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
    pub stddev: f64,
    pub station_count: usize,
    pub sample_size: usize,
    pub vs_national: Option<NationalComparison>,
}
