use serde::{Deserialize, Serialize};

use super::observation::FuelType;
use crate::geo::{BoundingBox, GeoPoint};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyStation {
    pub station_id: String,
    pub name: String,
    pub price: f64,
    pub distance_km: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatMapCell {
    pub bounds: BoundingBox,
    pub center: GeoPoint,
    pub price: f64,
    /// Position of `price` between the observed min and max, in `[0, 100]`.
    pub intensity: f64,
    /// `#rrggbb` on a green-yellow-red gradient.
    pub color: String,
    pub nearby_stations: Vec<NearbyStation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatMap {
    pub bounds: BoundingBox,
    pub zoom: u8,
    pub cell_size_deg: f64,
    pub fuel_type: FuelType,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub station_count: usize,
    pub cells: Vec<HeatMapCell>,
}
