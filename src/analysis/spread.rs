//! Price spread of a competitor set and a station's position inside it.

use crate::config::AnalyticsConfig;
use crate::models::{FuelType, MarketStats, Position, Quartile, Quartiles, SpreadResult};
use crate::stats::{self, round2};

/// Analyze one fuel: market statistics over `competitor_prices` and where
/// `user_price` falls in that distribution.
///
/// Returns [`SpreadResult::empty`] when there are no (finite) competitor
/// prices or the station has no price for this fuel.
pub fn analyze(
    fuel: FuelType,
    user_price: Option<f64>,
    competitor_prices: &[f64],
    config: &AnalyticsConfig,
) -> SpreadResult {
    let prices: Vec<f64> = competitor_prices
        .iter()
        .copied()
        .filter(|p| p.is_finite())
        .collect();

    let user_price = match user_price {
        Some(p) if p.is_finite() => p,
        _ => return SpreadResult::empty(fuel),
    };
    let summary = match stats::Summary::of(&prices) {
        Some(s) => s,
        None => return SpreadResult::empty(fuel),
    };

    let sorted = stats::sorted(&prices);
    // Non-empty input, so every percentile exists.
    let q1 = stats::percentile_sorted(&sorted, 25.0).unwrap_or(summary.min);
    let q2 = stats::percentile_sorted(&sorted, 50.0).unwrap_or(summary.median);
    let q3 = stats::percentile_sorted(&sorted, 75.0).unwrap_or(summary.max);

    let quartile = quartile_of(user_price, q1, q2, q3);
    let is_outlier = summary.stddev > 0.0
        && (user_price - summary.avg).abs() > config.outlier_sigma * summary.stddev;

    let from_avg = user_price - summary.avg;
    let from_avg_percent = if summary.avg != 0.0 {
        Some(round2(from_avg / summary.avg * 100.0))
    } else {
        None
    };

    SpreadResult {
        fuel_type: fuel,
        competitor_count: prices.len(),
        market: MarketStats {
            min: Some(round2(summary.min)),
            max: Some(round2(summary.max)),
            avg: Some(round2(summary.avg)),
            median: Some(round2(summary.median)),
            stddev: Some(round2(summary.stddev)),
        },
        quartiles: Quartiles {
            q1: Some(round2(q1)),
            q2: Some(round2(q2)),
            q3: Some(round2(q3)),
        },
        position: Position {
            user_price: Some(round2(user_price)),
            from_min: Some(round2(user_price - summary.min)),
            from_max: Some(round2(user_price - summary.max)),
            from_avg: Some(round2(from_avg)),
            from_avg_percent,
            quartile: Some(quartile),
            is_outlier,
        },
    }
}

/// First quartile boundary the price is less than or equal to.
pub fn quartile_of(price: f64, q1: f64, q2: f64, q3: f64) -> Quartile {
    if price <= q1 {
        Quartile::Q1
    } else if price <= q2 {
        Quartile::Q2
    } else if price <= q3 {
        Quartile::Q3
    } else {
        Quartile::Q4
    }
}
