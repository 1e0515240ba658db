//! Comparison of regions and municipalities.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::analysis::area;
use crate::config::AnalyticsConfig;
use crate::error::{FuelMarketError, Result};
use crate::models::{Area, AreaKind, AreaReport, PriceObservation, Station};
use crate::store::{MarketData, StationFilter};

pub struct AreaQuery<'a> {
    data: &'a dyn MarketData,
    config: &'a AnalyticsConfig,
}

impl<'a> AreaQuery<'a> {
    pub fn new(data: &'a dyn MarketData, config: &'a AnalyticsConfig) -> Self {
        Self { data, config }
    }

    fn stations_in(&self, target: &Area) -> Result<Vec<Station>> {
        let filter = match target.kind {
            AreaKind::Region => StationFilter::in_region(&target.id),
            AreaKind::Municipality => StationFilter::in_municipality(&target.id),
        };
        self.data.stations(&filter)
    }

    /// Compare areas using each station's latest price inside the trailing
    /// `geo_window_hours` ending at `as_of`.
    ///
    /// Prices for every area are fetched in a single batched query.
    pub fn compare(&self, areas: &[Area], as_of: DateTime<Utc>) -> Result<AreaReport> {
        if areas.is_empty() {
            return Err(FuelMarketError::InvalidArgument(
                "at least one area is required".to_string(),
            ));
        }

        let mut members: Vec<Vec<String>> = Vec::with_capacity(areas.len());
        for target in areas {
            let ids: Vec<String> = self.stations_in(target)?.into_iter().map(|s| s.id).collect();
            members.push(ids);
        }

        let mut all_ids: Vec<String> = members.iter().flatten().cloned().collect();
        all_ids.sort();
        all_ids.dedup();

        let since = as_of - Duration::hours(self.config.geo_window_hours);
        let latest = self.data.latest_prices(&all_ids, Some(since), Some(as_of))?;
        let mut by_station: HashMap<&str, Vec<&PriceObservation>> = HashMap::new();
        for obs in &latest {
            by_station.entry(obs.station_id.as_str()).or_default().push(obs);
        }
        debug!(
            areas = areas.len(),
            stations = all_ids.len(),
            observations = latest.len(),
            "fetched area prices"
        );

        let stats = areas
            .iter()
            .zip(&members)
            .map(|(target, ids)| {
                let rows: Vec<&PriceObservation> = ids
                    .iter()
                    .filter_map(|id| by_station.get(id.as_str()))
                    .flatten()
                    .copied()
                    .collect();
                area::area_stats(target, &rows)
            })
            .collect();

        Ok(area::compare(stats))
    }
}
