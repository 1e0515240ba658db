//! Latest-price lookups and competitor price enrichment.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::Result;
use crate::models::{CompetitorCandidate, CompetitorSet, FuelPrices, PriceObservation};
use crate::store::MarketData;

/// Fold latest observations into one [`FuelPrices`] per station.
pub fn prices_by_station(rows: &[PriceObservation]) -> HashMap<String, FuelPrices> {
    let mut map: HashMap<String, FuelPrices> = HashMap::new();
    for row in rows.iter().filter(|r| r.price.is_finite()) {
        map.entry(row.station_id.clone())
            .or_default()
            .set(row.fuel_type, Some(row.price));
    }
    map
}

/// Attach prices to candidates, keeping their order. Unpriced fuels stay `None`.
pub fn assemble(
    candidates: &[CompetitorCandidate],
    prices: &HashMap<String, FuelPrices>,
) -> CompetitorSet {
    candidates
        .iter()
        .map(|c| c.with_prices(prices.get(&c.station.id).copied().unwrap_or_default()))
        .collect()
}

// ---------------------------------------------------------------------------
// PriceQuery
// ---------------------------------------------------------------------------

pub struct PriceQuery<'a> {
    data: &'a dyn MarketData,
}

impl<'a> PriceQuery<'a> {
    pub fn new(data: &'a dyn MarketData) -> Self {
        Self { data }
    }

    /// Latest price per fuel for each station, optionally as of a point in time.
    ///
    /// Stations with no observations are absent from the map.
    pub fn latest_prices(
        &self,
        station_ids: &[String],
        as_of: Option<DateTime<Utc>>,
    ) -> Result<HashMap<String, FuelPrices>> {
        let rows = self.data.latest_prices(station_ids, None, as_of)?;
        Ok(prices_by_station(&rows))
    }

    /// Attach latest prices to every candidate with a single store query.
    pub fn enrich(
        &self,
        candidates: &[CompetitorCandidate],
        as_of: Option<DateTime<Utc>>,
    ) -> Result<CompetitorSet> {
        let ids: Vec<String> = candidates.iter().map(|c| c.station.id.clone()).collect();
        let prices = self.latest_prices(&ids, as_of)?;
        let set = assemble(candidates, &prices);
        debug!(
            competitors = set.len(),
            priced = prices.len(),
            "enriched competitor set"
        );
        Ok(set)
    }
}
