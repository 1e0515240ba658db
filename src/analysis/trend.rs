//! Regression trend, volatility, moving average and seasonality of price series.
//!
//! Short or degenerate series never error: regression on fewer than two
//! points reports a flat, zero-confidence fit, and seasonality with fewer than
//! two buckets reports no variance.

use chrono::Datelike;

use crate::config::AnalyticsConfig;
use crate::models::{
    Direction, PriceObservation, SeasonalBucket, SeasonalityPeriod, SeasonalityResult, TrendResult,
};
use crate::stats::{self, round2};

/// Sum of squares treated as zero.
const SS_EPSILON: f64 = 1e-12;

/// Ordinary least squares fit of `price = slope * index + intercept`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Regression {
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination, clamped to `[0, 1]`.
    pub r_squared: f64,
}

/// Fit a line over `x = 0..n-1`.
pub fn linear_regression(series: &[f64]) -> Regression {
    let n = series.len();
    if n == 0 {
        return Regression {
            slope: 0.0,
            intercept: 0.0,
            r_squared: 0.0,
        };
    }

    let x_mean = (n - 1) as f64 / 2.0;
    let y_mean = series.iter().sum::<f64>() / n as f64;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    for (i, y) in series.iter().enumerate() {
        let dx = i as f64 - x_mean;
        sxy += dx * (y - y_mean);
        sxx += dx * dx;
    }

    if sxx < SS_EPSILON {
        return Regression {
            slope: 0.0,
            intercept: y_mean,
            r_squared: 0.0,
        };
    }

    let slope = sxy / sxx;
    let intercept = y_mean - slope * x_mean;

    let mut ss_tot = 0.0;
    let mut ss_res = 0.0;
    for (i, y) in series.iter().enumerate() {
        let predicted = slope * i as f64 + intercept;
        ss_tot += (y - y_mean).powi(2);
        ss_res += (y - predicted).powi(2);
    }

    let r_squared = if ss_tot < SS_EPSILON {
        // A flat series is perfectly explained by a flat line.
        if ss_res < SS_EPSILON {
            1.0
        } else {
            0.0
        }
    } else {
        1.0 - ss_res / ss_tot
    };

    Regression {
        slope,
        intercept,
        r_squared: if r_squared.is_finite() {
            r_squared.clamp(0.0, 1.0)
        } else {
            0.0
        },
    }
}

/// Population standard deviation of the series; 0 for fewer than two points.
pub fn volatility(series: &[f64]) -> f64 {
    stats::population_stddev(series)
}

pub fn direction(slope: f64, threshold: f64) -> Direction {
    if slope > threshold {
        Direction::Rising
    } else if slope < -threshold {
        Direction::Falling
    } else {
        Direction::Stable
    }
}

/// Mean of the last `window` points, `None` when the series is shorter.
pub fn moving_average(series: &[f64], window: usize) -> Option<f64> {
    if window == 0 || series.len() < window {
        return None;
    }
    stats::mean(&series[series.len() - window..])
}

/// Full trend summary of an ordered series. `None` for an empty series.
pub fn analyze(series: &[f64], config: &AnalyticsConfig) -> Option<TrendResult> {
    let prices: Vec<f64> = series.iter().copied().filter(|p| p.is_finite()).collect();
    let summary = stats::Summary::of(&prices)?;
    let first = prices[0];
    let current = prices[prices.len() - 1];

    let fit = linear_regression(&prices);
    let change_percent = if first != 0.0 {
        (current - first) / first * 100.0
    } else {
        0.0
    };

    Some(TrendResult {
        current: round2(current),
        avg: round2(summary.avg),
        min: round2(summary.min),
        max: round2(summary.max),
        volatility: round2(summary.stddev),
        direction: direction(fit.slope, config.trend_direction_threshold),
        slope: fit.slope,
        intercept: fit.intercept,
        confidence: fit.r_squared,
        change_percent: round2(change_percent),
        moving_average: moving_average(&prices, config.moving_average_window).map(round2),
        data_points: prices.len(),
    })
}

// ---------------------------------------------------------------------------
// Seasonality
// ---------------------------------------------------------------------------

const WEEKDAY_LABELS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

const MONTH_LABELS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

fn bucket_key(obs: &PriceObservation, period: SeasonalityPeriod) -> u32 {
    match period {
        SeasonalityPeriod::Weekly => obs.observed_at.weekday().num_days_from_monday(),
        SeasonalityPeriod::Monthly => obs.observed_at.month(),
    }
}

fn bucket_label(key: u32, period: SeasonalityPeriod) -> String {
    match period {
        SeasonalityPeriod::Weekly => WEEKDAY_LABELS
            .get(key as usize)
            .map(|s| s.to_string())
            .unwrap_or_else(|| key.to_string()),
        SeasonalityPeriod::Monthly => MONTH_LABELS
            .get(key.saturating_sub(1) as usize)
            .map(|s| s.to_string())
            .unwrap_or_else(|| key.to_string()),
    }
}

/// Average prices per weekday or month and measure how much those averages differ.
pub fn seasonality(
    observations: &[PriceObservation],
    period: SeasonalityPeriod,
    config: &AnalyticsConfig,
) -> SeasonalityResult {
    let slots = match period {
        SeasonalityPeriod::Weekly => 7,
        SeasonalityPeriod::Monthly => 13,
    };
    let mut sums = vec![(0.0_f64, 0_usize); slots];
    for obs in observations.iter().filter(|o| o.price.is_finite()) {
        let slot = &mut sums[bucket_key(obs, period) as usize];
        slot.0 += obs.price;
        slot.1 += 1;
    }

    let buckets: Vec<SeasonalBucket> = sums
        .iter()
        .enumerate()
        .filter(|(_, (_, count))| *count > 0)
        .map(|(key, (sum, count))| SeasonalBucket {
            key: key as u32,
            label: bucket_label(key as u32, period),
            avg: round2(sum / *count as f64),
            samples: *count,
        })
        .collect();

    let averages: Vec<f64> = sums
        .iter()
        .filter(|(_, count)| *count > 0)
        .map(|(sum, count)| sum / *count as f64)
        .collect();
    let variance = if averages.len() < 2 {
        0.0
    } else {
        stats::population_stddev(&averages)
    };

    let threshold = match period {
        SeasonalityPeriod::Weekly => config.weekly_seasonality_threshold,
        SeasonalityPeriod::Monthly => config.monthly_seasonality_threshold,
    };

    // Ties go to the earliest bucket for both peak and trough.
    let peak = buckets
        .iter()
        .max_by(|a, b| a.avg.total_cmp(&b.avg).then(b.key.cmp(&a.key)))
        .filter(|_| buckets.len() > 1)
        .map(|b| b.label.clone());
    let trough = buckets
        .iter()
        .min_by(|a, b| a.avg.total_cmp(&b.avg).then(a.key.cmp(&b.key)))
        .filter(|_| buckets.len() > 1)
        .map(|b| b.label.clone());

    SeasonalityResult {
        period,
        buckets,
        variance: round2(variance),
        significant: variance > threshold,
        peak,
        trough,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FuelType;
    use chrono::{Duration, TimeZone, Utc};

    fn config() -> AnalyticsConfig {
        AnalyticsConfig::default()
    }

    #[test]
    fn constant_series_is_stable_with_full_confidence() {
        let result = analyze(&[20.0, 20.0, 20.0, 20.0], &config()).unwrap();
        assert_eq!(result.direction, Direction::Stable);
        assert_eq!(result.volatility, 0.0);
        assert_eq!(result.confidence, 1.0);
        assert_eq!(result.slope, 0.0);
        assert_eq!(result.change_percent, 0.0);
    }

    #[test]
    fn perfect_line_has_full_confidence() {
        let fit = linear_regression(&[20.0, 20.5, 21.0, 21.5]);
        assert!((fit.slope - 0.5).abs() < 1e-12);
        assert!((fit.intercept - 20.0).abs() < 1e-12);
        assert!((fit.r_squared - 1.0).abs() < 1e-12);
    }

    #[test]
    fn rising_and_falling_series() {
        let rising = analyze(&[20.0, 20.2, 20.1, 20.5, 20.8], &config()).unwrap();
        assert_eq!(rising.direction, Direction::Rising);
        assert!(rising.confidence > 0.0 && rising.confidence <= 1.0);

        let falling = analyze(&[22.0, 21.7, 21.5, 21.0], &config()).unwrap();
        assert_eq!(falling.direction, Direction::Falling);
        assert!(falling.change_percent < 0.0);
    }

    #[test]
    fn small_slope_is_stable() {
        assert_eq!(direction(0.005, 0.01), Direction::Stable);
        assert_eq!(direction(-0.005, 0.01), Direction::Stable);
        assert_eq!(direction(0.011, 0.01), Direction::Rising);
    }

    #[test]
    fn single_point_has_no_confidence() {
        let fit = linear_regression(&[21.0]);
        assert_eq!(fit.slope, 0.0);
        assert_eq!(fit.r_squared, 0.0);
        assert_eq!(volatility(&[21.0]), 0.0);

        let result = analyze(&[21.0], &config()).unwrap();
        assert_eq!(result.direction, Direction::Stable);
        assert_eq!(result.data_points, 1);
    }

    #[test]
    fn empty_series_has_no_trend() {
        assert!(analyze(&[], &config()).is_none());
    }

    #[test]
    fn moving_average_needs_a_full_window() {
        assert_eq!(moving_average(&[1.0, 2.0], 3), None);
        assert_eq!(moving_average(&[1.0, 2.0, 3.0, 4.0], 2), Some(3.5));
        assert_eq!(moving_average(&[1.0], 0), None);
    }

    #[test]
    fn noisy_series_confidence_stays_in_range() {
        let series = [20.0, 22.0, 19.0, 23.0, 18.0, 24.0, 20.5];
        let fit = linear_regression(&series);
        assert!((0.0..=1.0).contains(&fit.r_squared));
    }

    fn obs_at(day_offset: i64, price: f64) -> PriceObservation {
        // 2024-01-01 is a Monday.
        PriceObservation {
            station_id: "st-1".to_string(),
            fuel_type: FuelType::Regular,
            price,
            observed_at: Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
                + Duration::days(day_offset),
        }
    }

    #[test]
    fn weekend_spike_is_significant_weekly_seasonality() {
        let mut observations = Vec::new();
        for week in 0..4 {
            for day in 0..7 {
                let price = if day >= 5 { 23.0 } else { 21.0 };
                observations.push(obs_at(week * 7 + day, price));
            }
        }

        let result = seasonality(&observations, SeasonalityPeriod::Weekly, &config());
        assert_eq!(result.buckets.len(), 7);
        assert_eq!(result.buckets[0].label, "Monday");
        assert_eq!(result.buckets[0].samples, 4);
        assert!(result.significant, "variance {}", result.variance);
        assert_eq!(result.trough.as_deref(), Some("Monday"));
        assert_eq!(result.peak.as_deref(), Some("Saturday"));
    }

    #[test]
    fn tied_buckets_report_the_earliest_day() {
        // Mon..Sun: Tue and Thu share the low, Wed and Fri share the high.
        let prices = [21.0, 20.0, 22.0, 20.0, 22.0, 21.0, 21.0];
        let observations: Vec<PriceObservation> = prices
            .iter()
            .enumerate()
            .map(|(day, price)| obs_at(day as i64, *price))
            .collect();

        let result = seasonality(&observations, SeasonalityPeriod::Weekly, &config());
        assert_eq!(result.trough.as_deref(), Some("Tuesday"));
        assert_eq!(result.peak.as_deref(), Some("Wednesday"));
    }

    #[test]
    fn flat_prices_are_not_seasonal() {
        let observations: Vec<PriceObservation> = (0..14).map(|d| obs_at(d, 21.0)).collect();
        let result = seasonality(&observations, SeasonalityPeriod::Weekly, &config());
        assert_eq!(result.variance, 0.0);
        assert!(!result.significant);
    }

    #[test]
    fn monthly_buckets_use_calendar_months() {
        let observations = vec![obs_at(0, 20.0), obs_at(40, 22.0), obs_at(70, 26.0)];
        let result = seasonality(&observations, SeasonalityPeriod::Monthly, &config());
        let labels: Vec<&str> = result.buckets.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["January", "February", "March"]);
        assert!(result.significant);
    }

    #[test]
    fn single_bucket_has_no_variance() {
        let result = seasonality(&[obs_at(0, 20.0)], SeasonalityPeriod::Monthly, &config());
        assert_eq!(result.variance, 0.0);
        assert!(result.peak.is_none());
    }
}
