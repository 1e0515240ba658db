//! Store-backed trend and seasonality queries.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::analysis::{aggregate, trend};
use crate::config::AnalyticsConfig;
use crate::error::Result;
use crate::models::{
    FuelType, Period, PriceObservation, SeasonalityPeriod, SeasonalityResult, TrendResult,
};
use crate::queries::competitors::require_station;
use crate::store::{MarketData, ObservationFilter};

pub struct TrendQuery<'a> {
    data: &'a dyn MarketData,
    config: &'a AnalyticsConfig,
}

impl<'a> TrendQuery<'a> {
    pub fn new(data: &'a dyn MarketData, config: &'a AnalyticsConfig) -> Self {
        Self { data, config }
    }

    fn station_prices(
        &self,
        station_id: &str,
        fuel: FuelType,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<PriceObservation>> {
        require_station(self.data, station_id)?;
        let filter = ObservationFilter::between(from, to)
            .stations(&[station_id.to_string()])
            .fuel(fuel);
        self.data.observations(&filter)
    }

    /// Trend of one station's recorded prices. `None` without observations.
    pub fn station_trend(
        &self,
        station_id: &str,
        fuel: FuelType,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Option<TrendResult>> {
        let observations = self.station_prices(station_id, fuel, from, to)?;
        let series: Vec<f64> = observations.iter().map(|o| o.price).collect();
        Ok(trend::analyze(&series, self.config))
    }

    pub fn station_seasonality(
        &self,
        station_id: &str,
        fuel: FuelType,
        period: SeasonalityPeriod,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<SeasonalityResult> {
        let observations = self.station_prices(station_id, fuel, from, to)?;
        Ok(trend::seasonality(&observations, period, self.config))
    }

    /// Trend of the daily market average over every observation matching `filter`.
    ///
    /// The fuel and time window arguments override those set on `filter`.
    pub fn market_trend(
        &self,
        filter: &ObservationFilter,
        fuel: FuelType,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Option<TrendResult>> {
        let filter = ObservationFilter {
            fuel_type: Some(fuel),
            from: Some(from),
            to: Some(to),
            ..filter.clone()
        };
        let observations = self.data.observations(&filter)?;
        let daily = aggregate::aggregate(&observations, Period::Daily);
        debug!(
            observations = observations.len(),
            days = daily.len(),
            "computed daily market averages"
        );
        let series: Vec<f64> = daily.iter().map(|d| d.avg).collect();
        Ok(trend::analyze(&series, self.config))
    }
}
