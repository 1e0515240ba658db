//! Heat map generation over the sample market.

mod common;

use fuel_market_sdk::{AnalyticsConfig, BoundingBox, FuelMarket, FuelMarketError, FuelType};

fn city() -> BoundingBox {
    BoundingBox::new(19.52, 19.34, -99.12, -99.25).unwrap()
}

#[test]
fn grid_covers_bounds_at_zoom_cell_size() {
    let (market, _tmp) = common::setup_sample_market();

    let map = market
        .heatmap()
        .generate(city(), 11, FuelType::Regular, common::now())
        .unwrap();
    assert_eq!(map.cell_size_deg, 0.1);
    assert_eq!(map.cells.len(), 4);
    assert_eq!(map.station_count, 8);
    assert_eq!(map.min_price, Some(19.5));
    assert_eq!(map.max_price, Some(22.0));
}

#[test]
fn cells_stay_within_price_range() {
    let (market, _tmp) = common::setup_sample_market();

    let map = market
        .heatmap()
        .generate(city(), 11, FuelType::Regular, common::now())
        .unwrap();
    for cell in &map.cells {
        assert!(cell.price >= 19.5 && cell.price <= 22.0);
        assert!((0.0..=100.0).contains(&cell.intensity));
        assert!(cell.color.starts_with('#') && cell.color.len() == 7);
        assert_eq!(cell.nearby_stations.len(), 3);
        assert!(city().contains(cell.center.lat, cell.center.lng));
    }
}

#[test]
fn northern_cells_are_pricier() {
    let (market, _tmp) = common::setup_sample_market();

    let map = market
        .heatmap()
        .generate(city(), 11, FuelType::Regular, common::now())
        .unwrap();
    // Row-major from the south-west corner.
    let (south_west, south_east) = (&map.cells[0], &map.cells[1]);
    let (north_west, north_east) = (&map.cells[2], &map.cells[3]);
    assert!(north_west.price > south_west.price);
    assert!(north_east.price > south_east.price);
    assert_eq!(north_west.nearby_stations[0].station_id, "st-007");
    assert_eq!(north_east.nearby_stations[0].station_id, "st-009");
    assert_eq!(north_east.nearby_stations[0].distance_km, 0.52);
}

#[test]
fn no_prices_gives_empty_map() {
    let (market, _tmp) = common::setup_sample_market();

    let map = market
        .heatmap()
        .generate(city(), 11, FuelType::Diesel, common::ts(1, 0))
        .unwrap();
    assert!(map.cells.is_empty());
    assert_eq!(map.station_count, 0);
    assert!(map.min_price.is_none());
}

#[test]
fn cell_budget_coarsens_grid() {
    let tmp_dir = tempfile::tempdir().unwrap();
    let (stations, observations) = common::write_sample_files(tmp_dir.path());
    let market = FuelMarket::builder()
        .config(AnalyticsConfig {
            heatmap_max_cells: 4,
            ..AnalyticsConfig::default()
        })
        .build()
        .unwrap();
    market.load_stations(&stations).unwrap();
    market.load_observations(&observations).unwrap();

    // Zoom 14 would ask for a 0.02 degree grid of 9 x 7 cells.
    let map = market
        .heatmap()
        .generate(city(), 14, FuelType::Premium, common::now())
        .unwrap();
    assert!(map.cell_size_deg > 0.02);
    assert!(map.cells.len() <= 4);
    assert!(!map.cells.is_empty());
}

#[test]
fn invalid_bounds_are_rejected() {
    let (market, _tmp) = common::setup_sample_market();

    let inverted = BoundingBox {
        north: 19.34,
        south: 19.52,
        east: -99.12,
        west: -99.25,
    };
    let err = market
        .heatmap()
        .generate(inverted, 11, FuelType::Regular, common::now())
        .unwrap_err();
    assert!(matches!(err, FuelMarketError::InvalidArgument(_)));
}
