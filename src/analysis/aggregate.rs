//! Period bucketing of price observations into market aggregates.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Datelike, Utc};

use crate::models::{FuelType, MarketAggregate, NationalComparison, Period, PriceObservation};
use crate::stats::{self, round2};

/// Canonical bucket key of a timestamp.
///
/// Keys sort lexicographically in time order within one period kind.
pub fn period_key(ts: &DateTime<Utc>, period: Period) -> String {
    match period {
        Period::Hourly => ts.format("%Y-%m-%d %H:00").to_string(),
        Period::Daily => ts.format("%Y-%m-%d").to_string(),
        Period::Weekly => {
            let week = ts.iso_week();
            format!("{:04}-W{:02}", week.year(), week.week())
        }
        Period::Monthly => ts.format("%Y-%m").to_string(),
    }
}

type Buckets<'a> = BTreeMap<(String, FuelType), (Vec<f64>, HashSet<&'a str>)>;

fn bucket<'a>(observations: &'a [PriceObservation], period: Period) -> Buckets<'a> {
    let mut buckets: Buckets<'a> = BTreeMap::new();
    for obs in observations.iter().filter(|o| o.price.is_finite()) {
        let entry = buckets
            .entry((period_key(&obs.observed_at, period), obs.fuel_type))
            .or_default();
        entry.0.push(obs.price);
        entry.1.insert(obs.station_id.as_str());
    }
    buckets
}

/// Unrounded mean price per `(period key, fuel)`.
pub fn bucket_means(
    observations: &[PriceObservation],
    period: Period,
) -> BTreeMap<(String, FuelType), f64> {
    bucket(observations, period)
        .into_iter()
        .filter_map(|(key, (prices, _))| stats::mean(&prices).map(|avg| (key, avg)))
        .collect()
}

/// Aggregate observations per `(period key, fuel)`, sorted by key then fuel.
///
/// The median is the true median of the raw prices in each bucket.
pub fn aggregate(observations: &[PriceObservation], period: Period) -> Vec<MarketAggregate> {
    aggregate_against(observations, period, &HashMap::new())
}

/// Like [`aggregate`], comparing each bucket with the national average for its fuel.
///
/// Fuels without a national average (or with a zero one) keep `vs_national = None`.
pub fn aggregate_against(
    observations: &[PriceObservation],
    period: Period,
    national: &HashMap<FuelType, f64>,
) -> Vec<MarketAggregate> {
    bucket(observations, period)
        .into_iter()
        .filter_map(|((period_key, fuel_type), (prices, stations))| {
            let summary = stats::Summary::of(&prices)?;
            let vs_national = national
                .get(&fuel_type)
                .copied()
                .filter(|avg| avg.is_finite() && *avg != 0.0)
                .map(|national_avg| compare_national(summary.avg, national_avg));
            Some(MarketAggregate {
                period_key,
                fuel_type,
                avg: round2(summary.avg),
                min: round2(summary.min),
                max: round2(summary.max),
                median: round2(summary.median),
                stddev: round2(summary.stddev),
                station_count: stations.len(),
                sample_size: summary.count,
                vs_national,
            })
        })
        .collect()
}

fn compare_national(avg: f64, national_avg: f64) -> NationalComparison {
    let difference = avg - national_avg;
    NationalComparison {
        national_avg: round2(national_avg),
        difference: round2(difference),
        difference_percent: round2(difference / national_avg * 100.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn obs(station: &str, fuel: FuelType, price: f64, ts: DateTime<Utc>) -> PriceObservation {
        PriceObservation {
            station_id: station.to_string(),
            fuel_type: fuel,
            price,
            observed_at: ts,
        }
    }

    #[test]
    fn period_keys() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 5, 14, 37, 12).unwrap();
        assert_eq!(period_key(&ts, Period::Hourly), "2024-03-05 14:00");
        assert_eq!(period_key(&ts, Period::Daily), "2024-03-05");
        assert_eq!(period_key(&ts, Period::Weekly), "2024-W10");
        assert_eq!(period_key(&ts, Period::Monthly), "2024-03");
    }

    #[test]
    fn iso_week_crosses_year_boundary() {
        // 2024-12-30 is a Monday in ISO week 1 of 2025.
        let ts = Utc.with_ymd_and_hms(2024, 12, 30, 8, 0, 0).unwrap();
        assert_eq!(period_key(&ts, Period::Weekly), "2025-W01");
    }

    #[test]
    fn aggregates_per_day_and_fuel() {
        let d1 = Utc.with_ymd_and_hms(2024, 3, 5, 8, 0, 0).unwrap();
        let d1_late = Utc.with_ymd_and_hms(2024, 3, 5, 20, 0, 0).unwrap();
        let d2 = Utc.with_ymd_and_hms(2024, 3, 6, 8, 0, 0).unwrap();
        let observations = vec![
            obs("a", FuelType::Regular, 20.0, d1),
            obs("b", FuelType::Regular, 22.0, d1),
            obs("a", FuelType::Regular, 21.0, d1_late),
            obs("c", FuelType::Regular, 100.0, d1_late),
            obs("a", FuelType::Diesel, 23.0, d1),
            obs("a", FuelType::Regular, 21.5, d2),
        ];

        let result = aggregate(&observations, Period::Daily);
        let keys: Vec<(&str, FuelType)> = result
            .iter()
            .map(|a| (a.period_key.as_str(), a.fuel_type))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("2024-03-05", FuelType::Regular),
                ("2024-03-05", FuelType::Diesel),
                ("2024-03-06", FuelType::Regular),
            ]
        );

        let regular = &result[0];
        assert_eq!(regular.sample_size, 4);
        assert_eq!(regular.station_count, 3);
        assert_eq!(regular.min, 20.0);
        assert_eq!(regular.max, 100.0);
        // True median of [20, 21, 22, 100], unaffected by the outlier.
        assert_eq!(regular.median, 21.5);
        assert_eq!(regular.avg, 40.75);
        assert!(regular.vs_national.is_none());
    }

    #[test]
    fn empty_input_has_no_buckets() {
        assert!(aggregate(&[], Period::Monthly).is_empty());
    }

    #[test]
    fn national_comparison_skips_missing_and_zero_averages() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 5, 8, 0, 0).unwrap();
        let observations = vec![
            obs("a", FuelType::Regular, 22.0, ts),
            obs("a", FuelType::Premium, 24.0, ts),
            obs("a", FuelType::Diesel, 25.0, ts),
        ];
        let mut national = HashMap::new();
        national.insert(FuelType::Regular, 20.0);
        national.insert(FuelType::Diesel, 0.0);
        let result = aggregate_against(&observations, Period::Daily, &national);

        let regular = result.iter().find(|a| a.fuel_type == FuelType::Regular).unwrap();
        let cmp = regular.vs_national.as_ref().unwrap();
        assert_eq!(cmp.difference, 2.0);
        assert_eq!(cmp.difference_percent, 10.0);

        for fuel in [FuelType::Premium, FuelType::Diesel] {
            let agg = result.iter().find(|a| a.fuel_type == fuel).unwrap();
            assert!(agg.vs_national.is_none());
        }
    }

    #[test]
    fn national_difference_uses_unrounded_mean() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 5, 8, 0, 0).unwrap();
        let observations = vec![
            obs("a", FuelType::Regular, 20.004, ts),
            obs("b", FuelType::Regular, 20.004, ts),
        ];
        let national = HashMap::from([(FuelType::Regular, 19.996)]);

        let result = aggregate_against(&observations, Period::Daily, &national);
        assert_eq!(result[0].avg, 20.0);
        let cmp = result[0].vs_national.as_ref().unwrap();
        assert_eq!(cmp.difference, 0.01);
        assert_eq!(cmp.difference_percent, 0.04);
    }

    #[test]
    fn bucket_means_are_not_rounded() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 5, 8, 0, 0).unwrap();
        let observations = vec![
            obs("a", FuelType::Diesel, 23.001, ts),
            obs("b", FuelType::Diesel, 23.002, ts),
        ];
        let means = bucket_means(&observations, Period::Daily);
        let mean = means[&("2024-03-05".to_string(), FuelType::Diesel)];
        assert!((mean - 23.0015).abs() < 1e-9);
    }
}
