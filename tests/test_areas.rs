//! Region and municipality comparison.

mod common;

use chrono::Duration;
use fuel_market_sdk::{Area, FuelMarketError, FuelType};

fn regions() -> Vec<Area> {
    vec![
        Area::region("Ciudad de Mexico", "cdmx"),
        Area::region("Estado de Mexico", "edomex"),
    ]
}

#[test]
fn per_area_statistics_from_latest_prices() {
    let (market, _tmp) = common::setup_sample_market();

    let report = market.areas().compare(&regions(), common::now()).unwrap();
    assert_eq!(report.areas.len(), 2);

    let cdmx = report.areas[0].fuel(FuelType::Regular).unwrap();
    // Closed st-005 is not part of the area.
    assert_eq!(cdmx.station_count, 6);
    assert_eq!(cdmx.avg, 20.57);
    assert_eq!(cdmx.min, 19.5);
    assert_eq!(cdmx.max, 21.5);

    let edomex = report.areas[1].fuel(FuelType::Regular).unwrap();
    assert_eq!(edomex.station_count, 2);
    assert_eq!(edomex.avg, 21.9);
}

#[test]
fn matrix_and_insights() {
    let (market, _tmp) = common::setup_sample_market();

    let report = market.areas().compare(&regions(), common::now()).unwrap();

    // Two ordered pairs times three shared fuels.
    assert_eq!(report.matrix.len(), 6);
    let diff = report
        .matrix
        .iter()
        .find(|d| d.from == "Ciudad de Mexico" && d.fuel_type == FuelType::Regular)
        .unwrap();
    assert_eq!(diff.to, "Estado de Mexico");
    assert_eq!(diff.difference, -1.33);

    let regular = &report.insights.fuels[0];
    assert_eq!(regular.fuel_type, FuelType::Regular);
    assert_eq!(regular.cheapest.area, "Ciudad de Mexico");
    assert_eq!(regular.most_expensive.area, "Estado de Mexico");
    // Needs at least three areas.
    assert!(regular.average_across_areas.is_none());

    let disparity = report.insights.highest_disparity.as_ref().unwrap();
    assert_eq!(disparity.area, "Ciudad de Mexico");
    assert_eq!(disparity.value, 2.0);
}

#[test]
fn cheaper_area_ranks_first() {
    let (market, _tmp) = common::setup_sample_market();

    let report = market.areas().compare(&regions(), common::now()).unwrap();
    let order: Vec<&str> = report.ranking.iter().map(|r| r.area.as_str()).collect();
    assert_eq!(order, vec!["Ciudad de Mexico", "Estado de Mexico"]);
    assert_eq!(report.ranking[0].rank, 1);
}

#[test]
fn municipalities_and_empty_areas() {
    let (market, _tmp) = common::setup_sample_market();

    let areas = vec![
        Area::municipality("Coyoacan", "coyoacan"),
        Area::municipality("Nowhere", "nowhere"),
        Area::municipality("Naucalpan", "naucalpan"),
    ];
    let report = market.areas().compare(&areas, common::now()).unwrap();

    assert!(report.areas[1].fuels.is_empty());
    assert_eq!(report.ranking.last().unwrap().area, "Nowhere");
    assert_eq!(report.ranking.last().unwrap().score, 0.0);

    // Two priced areas only, so still no across-area average.
    assert!(report.insights.fuels[0].average_across_areas.is_none());
}

#[test]
fn prices_outside_the_window_are_ignored() {
    let (market, _tmp) = common::setup_sample_market();

    let report = market
        .areas()
        .compare(&regions(), common::now() + Duration::days(3))
        .unwrap();
    assert!(report.areas.iter().all(|a| a.fuels.is_empty()));
    assert!(report.matrix.is_empty());
}

#[test]
fn no_areas_is_rejected() {
    let (market, _tmp) = common::setup_sample_market();

    let err = market.areas().compare(&[], common::now()).unwrap_err();
    assert!(matches!(err, FuelMarketError::InvalidArgument(_)));
}
