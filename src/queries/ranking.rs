//! Price ranking of a station among its radius competitors, with day-over-day
//! rank trend from the rank cache.

use std::collections::HashMap;

use chrono::{DateTime, Duration, NaiveDate, Timelike, Utc};
use tracing::debug;

use crate::analysis::ranking::{rank_station, RankEntry};
use crate::cache::RankCache;
use crate::config::AnalyticsConfig;
use crate::error::Result;
use crate::models::{FuelPrices, FuelType, PositionLabel, RankResult, RankTrend};
use crate::queries::competitors::CompetitorQuery;
use crate::queries::prices::PriceQuery;
use crate::stats::round2;
use crate::store::MarketData;

/// Cache key holding a station's rank for one fuel on one day.
pub fn rank_cache_key(station_id: &str, fuel: FuelType, date: NaiveDate) -> String {
    format!("rank:{}:{}:{}", station_id, fuel, date.format("%Y-%m-%d"))
}

/// Lifetime of the rank stored for `as_of`'s day: the rest of that day plus `ttl`,
/// so tomorrow's lookup finds it at any hour.
pub fn rank_entry_ttl(as_of: DateTime<Utc>, ttl: std::time::Duration) -> std::time::Duration {
    let rest_of_day = 86_400 - u64::from(as_of.num_seconds_from_midnight());
    ttl + std::time::Duration::from_secs(rest_of_day)
}

pub struct RankingQuery<'a> {
    data: &'a dyn MarketData,
    cache: &'a dyn RankCache,
    config: &'a AnalyticsConfig,
}

impl<'a> RankingQuery<'a> {
    pub fn new(
        data: &'a dyn MarketData,
        cache: &'a dyn RankCache,
        config: &'a AnalyticsConfig,
    ) -> Self {
        Self {
            data,
            cache,
            config,
        }
    }

    /// Rank for one fuel. `Ok(None)` when the station has no price for it.
    pub fn rank(
        &self,
        station_id: &str,
        fuel: FuelType,
        radius_km: f64,
        as_of: DateTime<Utc>,
    ) -> Result<Option<RankResult>> {
        let prices = self.market_prices(station_id, radius_km, as_of)?;
        self.rank_in(station_id, fuel, &prices, as_of)
    }

    /// Ranks for every fuel the station sells, fetched in one pass.
    pub fn rank_all_fuels(
        &self,
        station_id: &str,
        radius_km: f64,
        as_of: DateTime<Utc>,
    ) -> Result<Vec<RankResult>> {
        let prices = self.market_prices(station_id, radius_km, as_of)?;
        let mut results = Vec::new();
        for fuel in FuelType::ALL {
            if let Some(r) = self.rank_in(station_id, fuel, &prices, as_of)? {
                results.push(r);
            }
        }
        Ok(results)
    }

    /// Latest prices as of `as_of` for the station and its radius competitors.
    fn market_prices(
        &self,
        station_id: &str,
        radius_km: f64,
        as_of: DateTime<Utc>,
    ) -> Result<HashMap<String, FuelPrices>> {
        let candidates = CompetitorQuery::new(self.data).by_radius(station_id, radius_km)?;
        let mut ids: Vec<String> = candidates.into_iter().map(|c| c.station.id).collect();
        ids.push(station_id.to_string());
        PriceQuery::new(self.data).latest_prices(&ids, Some(as_of))
    }

    fn rank_in(
        &self,
        station_id: &str,
        fuel: FuelType,
        prices: &HashMap<String, FuelPrices>,
        as_of: DateTime<Utc>,
    ) -> Result<Option<RankResult>> {
        let entries: Vec<RankEntry> = prices
            .iter()
            .filter_map(|(id, p)| p.get(fuel).map(|price| RankEntry::new(id, price)))
            .collect();
        let Some(position) = rank_station(station_id, &entries) else {
            debug!(station = station_id, %fuel, "no price to rank");
            return Ok(None);
        };

        let today = as_of.date_naive();
        let yesterday = (as_of - Duration::days(1)).date_naive();
        let previous_rank = self
            .cache
            .get(&rank_cache_key(station_id, fuel, yesterday))?
            .and_then(|r| usize::try_from(r).ok());
        self.cache.set(
            &rank_cache_key(station_id, fuel, today),
            position.rank as i64,
            rank_entry_ttl(as_of, self.config.rank_cache_ttl()),
        )?;

        let percentile = round2(position.percentile);
        Ok(Some(RankResult {
            station_id: station_id.to_string(),
            fuel_type: fuel,
            rank: position.rank,
            total: position.total,
            percentile,
            price: round2(position.price),
            diff_from_first: round2(position.diff_from_first),
            position_label: PositionLabel::from_rank(position.rank, position.total, percentile),
            trend: RankTrend::from_ranks(position.rank, previous_rank),
            previous_rank,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_key_format() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(
            rank_cache_key("st-1", FuelType::Premium, date),
            "rank:st-1:premium:2024-03-05"
        );
    }

    #[test]
    fn entry_outlives_the_following_day() {
        use chrono::TimeZone;
        let day = std::time::Duration::from_secs(86_400);

        let morning = Utc.with_ymd_and_hms(2024, 3, 5, 8, 0, 0).unwrap();
        assert_eq!(rank_entry_ttl(morning, day).as_secs(), 40 * 3600);

        let midnight = Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap();
        assert_eq!(rank_entry_ttl(midnight, day).as_secs(), 48 * 3600);

        let late = Utc.with_ymd_and_hms(2024, 3, 5, 23, 59, 59).unwrap();
        assert_eq!(rank_entry_ttl(late, day).as_secs(), 86_401);
    }
}
