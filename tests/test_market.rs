//! Period aggregates, national averages and station correlation.

mod common;

use fuel_market_sdk::{FuelMarketError, FuelType, ObservationFilter, Period, PriceObservation};

fn cdmx() -> ObservationFilter {
    ObservationFilter {
        region_id: Some("cdmx".to_string()),
        ..ObservationFilter::default()
    }
}

// ---------------------------------------------------------------------------
// Aggregates
// ---------------------------------------------------------------------------

#[test]
fn daily_aggregates_ordered_by_day_then_fuel() {
    let (market, _tmp) = common::setup_sample_market();

    let aggregates = market
        .market()
        .aggregate(&cdmx(), Period::Daily, common::ts(10, 0), common::now())
        .unwrap();

    let first = &aggregates[0];
    assert_eq!(first.period_key, "2024-06-10");
    assert_eq!(first.fuel_type, FuelType::Regular);
    assert_eq!(first.avg, 19.85);
    assert_eq!(first.min, 19.6);
    assert_eq!(first.max, 20.1);
    assert_eq!(first.station_count, 2);
    assert_eq!(first.sample_size, 2);

    let keys: Vec<(&str, FuelType)> = aggregates
        .iter()
        .map(|a| (a.period_key.as_str(), a.fuel_type))
        .collect();
    assert_eq!(
        keys,
        vec![
            ("2024-06-10", FuelType::Regular),
            ("2024-06-11", FuelType::Regular),
            ("2024-06-12", FuelType::Regular),
            ("2024-06-13", FuelType::Regular),
            ("2024-06-15", FuelType::Regular),
            ("2024-06-15", FuelType::Premium),
            ("2024-06-15", FuelType::Diesel),
        ]
    );
}

#[test]
fn weekly_aggregate_uses_iso_week() {
    let (market, _tmp) = common::setup_sample_market();

    let filter = ObservationFilter {
        region_id: Some("edomex".to_string()),
        fuel_type: Some(FuelType::Regular),
        ..ObservationFilter::default()
    };
    let aggregates = market
        .market()
        .aggregate(&filter, Period::Weekly, common::ts(1, 0), common::now())
        .unwrap();
    assert_eq!(aggregates.len(), 1);
    assert_eq!(aggregates[0].period_key, "2024-W24");
    assert_eq!(aggregates[0].avg, 21.9);
    assert_eq!(aggregates[0].median, 21.9);
}

#[test]
fn aggregates_compare_with_national_average() {
    let (market, _tmp) = common::setup_sample_market();

    let filter = ObservationFilter {
        region_id: Some("edomex".to_string()),
        fuel_type: Some(FuelType::Diesel),
        ..ObservationFilter::default()
    };
    let aggregates = market
        .market()
        .aggregate(&filter, Period::Daily, common::ts(15, 0), common::now())
        .unwrap();
    let national = aggregates[0].vs_national.as_ref().unwrap();
    // National diesel mean is 23.73; edomex sits at 24.40.
    assert_eq!(national.national_avg, 23.73);
    assert!(national.difference > 0.6);
    assert!(national.difference_percent > 2.0);
}

#[test]
fn reversed_window_is_rejected() {
    let (market, _tmp) = common::setup_sample_market();

    let err = market
        .market()
        .aggregate(&cdmx(), Period::Daily, common::now(), common::ts(10, 0))
        .unwrap_err();
    assert!(matches!(err, FuelMarketError::InvalidArgument(_)));
}

#[test]
fn national_averages_cover_every_fuel() {
    let (market, _tmp) = common::setup_sample_market();

    let averages = market.market().national_averages(common::now()).unwrap();
    assert_eq!(averages.len(), 3);
    assert!(averages[&FuelType::Premium] > 22.0);
}

// ---------------------------------------------------------------------------
// Correlation
// ---------------------------------------------------------------------------

#[test]
fn parallel_histories_correlate_perfectly() {
    let (market, _tmp) = common::setup_sample_market();

    let r = market
        .market()
        .correlation("st-001", "st-002", FuelType::Regular, common::ts(1, 0), common::now())
        .unwrap();
    assert_eq!(r, Some(1.0));
}

#[test]
fn one_shared_day_is_not_enough() {
    let (market, _tmp) = common::setup_sample_market();

    let r = market
        .market()
        .correlation("st-001", "st-003", FuelType::Regular, common::ts(1, 0), common::now())
        .unwrap();
    assert_eq!(r, None);
}

#[test]
fn correlation_sees_sub_cent_moves() {
    let (market, _tmp) = common::setup_sample_market();

    // Daily means that would all round to 20.00.
    let series = [
        ("st-003", [20.001, 20.002, 20.003]),
        ("st-004", [30.1, 30.2, 30.3]),
    ];
    for (station, prices) in series {
        for (i, price) in prices.into_iter().enumerate() {
            market
                .record_observation(&PriceObservation {
                    station_id: station.to_string(),
                    fuel_type: FuelType::Regular,
                    price,
                    observed_at: common::ts(1 + i as u32, 9),
                })
                .unwrap();
        }
    }

    let r = market
        .market()
        .correlation("st-003", "st-004", FuelType::Regular, common::ts(1, 0), common::ts(4, 0))
        .unwrap();
    assert_eq!(r, Some(1.0));
}

#[test]
fn correlation_with_unknown_station_fails() {
    let (market, _tmp) = common::setup_sample_market();

    let err = market
        .market()
        .correlation("st-001", "st-404", FuelType::Regular, common::ts(1, 0), common::now())
        .unwrap_err();
    assert!(matches!(err, FuelMarketError::NotFound(_)));
}
