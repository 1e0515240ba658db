use serde::{Deserialize, Serialize};

use super::observation::FuelType;
use super::station::Station;

// ---------------------------------------------------------------------------
// FuelPrices: latest price per fuel, `None` when never observed
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FuelPrices {
    pub regular: Option<f64>,
    pub premium: Option<f64>,
    pub diesel: Option<f64>,
}

impl FuelPrices {
    pub fn get(&self, fuel: FuelType) -> Option<f64> {
        match fuel {
            FuelType::Regular => self.regular,
            FuelType::Premium => self.premium,
            FuelType::Diesel => self.diesel,
        }
    }

    pub fn set(&mut self, fuel: FuelType, price: Option<f64>) {
        match fuel {
            FuelType::Regular => self.regular = price,
            FuelType::Premium => self.premium = price,
            FuelType::Diesel => self.diesel = price,
        }
    }

    pub fn is_empty(&self) -> bool {
        FuelType::ALL.iter().all(|f| self.get(*f).is_none())
    }
}

// ---------------------------------------------------------------------------
// Competitor: one entry of a competitor set
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Competitor {
    pub station_id: String,
    pub name: String,
    pub brand: Option<String>,
    pub distance_km: Option<f64>,
    pub prices: FuelPrices,
}

/// A resolved competitor station before prices are attached.
#[derive(Debug, Clone, PartialEq)]
pub struct CompetitorCandidate {
    pub station: Station,
    pub distance_km: Option<f64>,
}

impl CompetitorCandidate {
    pub fn with_prices(&self, prices: FuelPrices) -> Competitor {
        Competitor {
            station_id: self.station.id.clone(),
            name: self.station.name.clone(),
            brand: self.station.brand.clone(),
            distance_km: self.distance_km,
            prices,
        }
    }
}

/// Competitors in resolution order (nearest first for radius lookups).
pub type CompetitorSet = Vec<Competitor>;

/// How a competitor set is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompetitorMode {
    Radius,
    Municipality,
    Combined,
}

/// Prices for one fuel across a competitor set, skipping stations without one.
pub fn prices_for(competitors: &[Competitor], fuel: FuelType) -> Vec<f64> {
    competitors
        .iter()
        .filter_map(|c| c.prices.get(fuel))
        .collect()
}
