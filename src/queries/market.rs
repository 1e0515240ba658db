//! Market aggregates, national averages and station price correlation.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::analysis::{aggregate, correlation};
use crate::config::AnalyticsConfig;
use crate::error::{FuelMarketError, Result};
use crate::models::{FuelType, MarketAggregate, Period};
use crate::store::{MarketData, ObservationFilter, StationFilter};

pub struct MarketQuery<'a> {
    data: &'a dyn MarketData,
    config: &'a AnalyticsConfig,
}

impl<'a> MarketQuery<'a> {
    pub fn new(data: &'a dyn MarketData, config: &'a AnalyticsConfig) -> Self {
        Self { data, config }
    }

    /// Period aggregates of every observation matching `filter` inside
    /// `[from, to]`, each compared with the national average ending at `to`.
    pub fn aggregate(
        &self,
        filter: &ObservationFilter,
        period: Period,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<MarketAggregate>> {
        if from > to {
            return Err(FuelMarketError::InvalidArgument(format!(
                "from ({}) is after to ({})",
                from, to
            )));
        }
        let filter = ObservationFilter {
            from: Some(from),
            to: Some(to),
            ..filter.clone()
        };
        let observations = self.data.observations(&filter)?;
        let national = self.national_averages(to)?;
        let aggregates = aggregate::aggregate_against(&observations, period, &national);
        debug!(
            %period,
            observations = observations.len(),
            buckets = aggregates.len(),
            "aggregated market prices"
        );
        Ok(aggregates)
    }

    /// Mean price per fuel over the trailing national window ending at `as_of`.
    pub fn national_averages(&self, as_of: DateTime<Utc>) -> Result<HashMap<FuelType, f64>> {
        let from = as_of - Duration::days(self.config.national_window_days);
        Ok(self.data.average_prices(from, as_of)?.into_iter().collect())
    }

    /// Pearson correlation of two stations' daily average prices.
    ///
    /// The series are paired by calendar day rather than truncated to equal
    /// length, so only days on which both stations have observations count.
    /// Daily means are used unrounded; the coefficient is rounded to 4
    /// decimals. `None` when fewer than two days overlap or a series is flat.
    pub fn correlation(
        &self,
        station_a: &str,
        station_b: &str,
        fuel: FuelType,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Option<f64>> {
        let ids = vec![station_a.to_string(), station_b.to_string()];
        let known = self.data.stations(&StationFilter {
            ids: Some(ids.clone()),
            include_inactive: true,
            ..StationFilter::default()
        })?;
        for id in &ids {
            if !known.iter().any(|s| &s.id == id) {
                return Err(FuelMarketError::NotFound(format!("Station not found: {}", id)));
            }
        }

        let filter = ObservationFilter::between(from, to).stations(&ids).fuel(fuel);
        let observations = self.data.observations(&filter)?;

        let daily_avg = |station: &str| -> BTreeMap<String, f64> {
            let rows: Vec<_> = observations
                .iter()
                .filter(|o| o.station_id == station)
                .cloned()
                .collect();
            aggregate::bucket_means(&rows, Period::Daily)
                .into_iter()
                .map(|((day, _), avg)| (day, avg))
                .collect()
        };
        let series_a = daily_avg(station_a);
        let series_b = daily_avg(station_b);

        let (a, b): (Vec<f64>, Vec<f64>) = series_a
            .iter()
            .filter_map(|(day, pa)| series_b.get(day).map(|pb| (*pa, *pb)))
            .unzip();
        Ok(correlation::pearson(&a, &b).map(|r| (r * 10_000.0).round() / 10_000.0))
    }
}
