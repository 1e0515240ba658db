use chrono::{DateTime, Utc};

use crate::analysis::heatmap::{self, PricedStation};
use crate::config::AnalyticsConfig;
use crate::error::Result;
use crate::geo::BoundingBox;
use crate::models::{FuelType, HeatMap};
use crate::queries::prices::PriceQuery;
use crate::store::{MarketData, StationFilter};

pub struct HeatMapQuery<'a> {
    data: &'a dyn MarketData,
    config: &'a AnalyticsConfig,
}

impl<'a> HeatMapQuery<'a> {
    pub fn new(data: &'a dyn MarketData, config: &'a AnalyticsConfig) -> Self {
        Self { data, config }
    }

    /// Heat map of `fuel` prices as of `as_of` for the stations inside `bounds`.
    pub fn generate(
        &self,
        bounds: BoundingBox,
        zoom: u8,
        fuel: FuelType,
        as_of: DateTime<Utc>,
    ) -> Result<HeatMap> {
        bounds.validate()?;
        let stations = self.data.stations(&StationFilter::within(bounds))?;
        let ids: Vec<String> = stations.iter().map(|s| s.id.clone()).collect();
        let prices = PriceQuery::new(self.data).latest_prices(&ids, Some(as_of))?;

        let priced: Vec<PricedStation> = stations
            .into_iter()
            .filter_map(|s| {
                let price = prices.get(&s.id)?.get(fuel)?;
                Some(PricedStation {
                    station_id: s.id,
                    name: s.name,
                    lat: s.lat,
                    lng: s.lng,
                    price,
                })
            })
            .collect();

        Ok(heatmap::build(bounds, zoom, fuel, &priced, self.config))
    }
}
