//! Grid heat map of interpolated prices over a bounding box.
//!
//! Each cell's price is an inverse-distance-weighted average of station
//! prices around its center. Cell size follows the zoom level and is
//! coarsened until the grid fits within the configured cell budget.

use tracing::{debug, warn};

use crate::config::AnalyticsConfig;
use crate::geo::{haversine_km, BoundingBox, GeoPoint};
use crate::models::{FuelType, HeatMap, HeatMapCell, NearbyStation};
use crate::stats::{self, round2};

/// A station with its current price for the mapped fuel.
#[derive(Debug, Clone, PartialEq)]
pub struct PricedStation {
    pub station_id: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub price: f64,
}

/// Cell edge in degrees for a map zoom level.
pub fn cell_size_for_zoom(zoom: u8) -> f64 {
    match zoom {
        0..=5 => 1.0,
        6..=7 => 0.5,
        8..=9 => 0.25,
        10..=11 => 0.1,
        12..=13 => 0.05,
        _ => 0.02,
    }
}

/// Slack absorbing decimal-degree rounding before taking the ceiling.
const GRID_EPSILON: f64 = 1e-9;

fn grid_dimensions(bounds: &BoundingBox, cell_size: f64) -> (usize, usize) {
    let span = |deg: f64| (deg / cell_size - GRID_EPSILON).ceil().max(1.0) as usize;
    (span(bounds.height_deg()), span(bounds.width_deg()))
}

/// Zoom cell size, doubled until `rows * cols <= max_cells`.
pub fn fit_cell_size(bounds: &BoundingBox, zoom: u8, max_cells: usize) -> f64 {
    let requested = cell_size_for_zoom(zoom);
    let max_cells = max_cells.max(1);
    let mut cell_size = requested;
    loop {
        let (rows, cols) = grid_dimensions(bounds, cell_size);
        if rows.saturating_mul(cols) <= max_cells {
            break;
        }
        debug!(rows, cols, cell_size, "heat map grid too large, coarsening");
        cell_size *= 2.0;
    }
    if cell_size != requested {
        warn!(
            zoom,
            requested, cell_size, max_cells, "heat map cell size coarsened to fit the cell budget"
        );
    }
    cell_size
}

/// Inverse-distance-weighted price at `point`.
///
/// Stations farther than `idw_max_radius_km` are ignored; distances are
/// floored at `idw_min_distance_km`. With no station in range the plain mean
/// of all station prices is used.
pub fn interpolate(
    point: &GeoPoint,
    stations: &[PricedStation],
    config: &AnalyticsConfig,
) -> Option<f64> {
    let mut weighted = 0.0;
    let mut weights = 0.0;
    for s in stations {
        let distance = haversine_km(point.lat, point.lng, s.lat, s.lng);
        if !distance.is_finite() || distance > config.idw_max_radius_km {
            continue;
        }
        let d = distance.max(config.idw_min_distance_km);
        let w = 1.0 / (d * d);
        weighted += w * s.price;
        weights += w;
    }

    if weights > 0.0 {
        Some(weighted / weights)
    } else {
        let prices: Vec<f64> = stations.iter().map(|s| s.price).collect();
        stats::mean(&prices)
    }
}

/// Position of `price` between the observed extremes, in `[0, 100]`.
pub fn intensity(price: f64, min: f64, max: f64) -> f64 {
    if max <= min {
        return 50.0;
    }
    ((price - min) / (max - min) * 100.0).clamp(0.0, 100.0)
}

/// Green at 0, yellow at 50, red at 100, as `#rrggbb`.
pub fn color_for(intensity: f64) -> String {
    let i = intensity.clamp(0.0, 100.0);
    let (r, g) = if i <= 50.0 {
        (255.0 * i / 50.0, 255.0)
    } else {
        (255.0, 255.0 * (1.0 - (i - 50.0) / 50.0))
    };
    format!("#{:02x}{:02x}00", r.round() as u8, g.round() as u8)
}

fn nearest(point: &GeoPoint, stations: &[PricedStation], limit: usize) -> Vec<NearbyStation> {
    let mut by_distance: Vec<(f64, &PricedStation)> = stations
        .iter()
        .map(|s| (haversine_km(point.lat, point.lng, s.lat, s.lng), s))
        .filter(|(d, _)| d.is_finite())
        .collect();
    by_distance.sort_by(|a, b| a.0.total_cmp(&b.0));

    by_distance
        .into_iter()
        .take(limit)
        .map(|(distance, s)| NearbyStation {
            station_id: s.station_id.clone(),
            name: s.name.clone(),
            price: round2(s.price),
            distance_km: round2(distance),
        })
        .collect()
}

/// Build the heat map grid. Stations with a non-finite price are ignored.
pub fn build(
    bounds: BoundingBox,
    zoom: u8,
    fuel: FuelType,
    stations: &[PricedStation],
    config: &AnalyticsConfig,
) -> HeatMap {
    let stations: Vec<PricedStation> = stations
        .iter()
        .filter(|s| s.price.is_finite() && s.lat.is_finite() && s.lng.is_finite())
        .cloned()
        .collect();
    let cell_size = fit_cell_size(&bounds, zoom, config.heatmap_max_cells);

    let prices: Vec<f64> = stations.iter().map(|s| s.price).collect();
    let min_price = prices.iter().copied().reduce(f64::min);
    let max_price = prices.iter().copied().reduce(f64::max);

    let mut heatmap = HeatMap {
        bounds,
        zoom,
        cell_size_deg: cell_size,
        fuel_type: fuel,
        min_price: min_price.map(round2),
        max_price: max_price.map(round2),
        station_count: stations.len(),
        cells: Vec::new(),
    };
    let (Some(min), Some(max)) = (min_price, max_price) else {
        debug!(%fuel, "no priced stations in bounds, empty heat map");
        return heatmap;
    };

    let (rows, cols) = grid_dimensions(&bounds, cell_size);
    heatmap.cells.reserve(rows * cols);
    for row in 0..rows {
        let south = bounds.south + row as f64 * cell_size;
        let north = (south + cell_size).min(bounds.north);
        for col in 0..cols {
            let west = bounds.west + col as f64 * cell_size;
            let east = (west + cell_size).min(bounds.east);
            let cell_bounds = BoundingBox {
                north,
                south,
                east,
                west,
            };
            let center = cell_bounds.center();
            let Some(price) = interpolate(&center, &stations, config) else {
                continue;
            };
            let cell_intensity = intensity(price, min, max);
            heatmap.cells.push(HeatMapCell {
                bounds: cell_bounds,
                center,
                price: round2(price),
                intensity: round2(cell_intensity),
                color: color_for(cell_intensity),
                nearby_stations: nearest(&center, &stations, config.heatmap_nearby_stations),
            });
        }
    }

    debug!(rows, cols, cells = heatmap.cells.len(), "built heat map");
    heatmap
}
