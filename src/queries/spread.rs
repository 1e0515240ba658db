//! Per-fuel spread analysis of a station against its competitors.

use crate::analysis::spread;
use crate::config::AnalyticsConfig;
use crate::error::Result;
use crate::models::{prices_for, CompetitorMode, FuelType, SpreadResult};
use crate::queries::competitors::CompetitorQuery;
use crate::queries::prices::{assemble, PriceQuery};
use crate::store::MarketData;

pub struct SpreadQuery<'a> {
    data: &'a dyn MarketData,
    config: &'a AnalyticsConfig,
}

impl<'a> SpreadQuery<'a> {
    pub fn new(data: &'a dyn MarketData, config: &'a AnalyticsConfig) -> Self {
        Self { data, config }
    }

    /// One result per fuel (in [`FuelType::ALL`] order) against the radius competitors.
    pub fn for_station(&self, station_id: &str, radius_km: f64) -> Result<Vec<SpreadResult>> {
        self.for_station_with(station_id, radius_km, CompetitorMode::Radius)
    }

    /// Like [`for_station`](Self::for_station) with an explicit competitor mode.
    pub fn for_station_with(
        &self,
        station_id: &str,
        radius_km: f64,
        mode: CompetitorMode,
    ) -> Result<Vec<SpreadResult>> {
        // Resolution fails with NotFound for an unknown station.
        let candidates = CompetitorQuery::new(self.data).resolve(station_id, radius_km, mode)?;

        // The station's own prices ride along in the competitors' query.
        let mut ids: Vec<String> = candidates.iter().map(|c| c.station.id.clone()).collect();
        ids.push(station_id.to_string());
        let prices = PriceQuery::new(self.data).latest_prices(&ids, None)?;

        let competitors = assemble(&candidates, &prices);
        let own = prices.get(station_id).copied().unwrap_or_default();

        Ok(FuelType::ALL
            .iter()
            .map(|&fuel| {
                spread::analyze(
                    fuel,
                    own.get(fuel),
                    &prices_for(&competitors, fuel),
                    self.config,
                )
            })
            .collect())
    }

    /// Spread for a single fuel.
    pub fn for_fuel(
        &self,
        station_id: &str,
        fuel: FuelType,
        radius_km: f64,
    ) -> Result<SpreadResult> {
        let results = self.for_station(station_id, radius_km)?;
        Ok(results
            .into_iter()
            .find(|r| r.fuel_type == fuel)
            .unwrap_or_else(|| SpreadResult::empty(fuel)))
    }
}
