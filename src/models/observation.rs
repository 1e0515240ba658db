use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::FuelMarketError;

// ---------------------------------------------------------------------------
// FuelType
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FuelType {
    Regular,
    Premium,
    Diesel,
}

impl FuelType {
    pub const ALL: [FuelType; 3] = [FuelType::Regular, FuelType::Premium, FuelType::Diesel];

    pub fn as_str(&self) -> &'static str {
        match self {
            FuelType::Regular => "regular",
            FuelType::Premium => "premium",
            FuelType::Diesel => "diesel",
        }
    }
}

impl fmt::Display for FuelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FuelType {
    type Err = FuelMarketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "regular" => Ok(FuelType::Regular),
            "premium" => Ok(FuelType::Premium),
            "diesel" => Ok(FuelType::Diesel),
            other => Err(FuelMarketError::InvalidArgument(format!(
                "Unknown fuel type: {}",
                other
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// PriceObservation: one change-only price record
// ---------------------------------------------------------------------------

/// A stored price change for one station and fuel.
///
/// Rows are append-only and only written when the price differs from the
/// previous observation for the same `(station_id, fuel_type)` pair.
/// `observed_at` travels as epoch milliseconds on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceObservation {
    pub station_id: String,
    pub fuel_type: FuelType,
    pub price: f64,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub observed_at: DateTime<Utc>,
}
