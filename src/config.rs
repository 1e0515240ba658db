//! Constants and tunable analysis thresholds.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{FuelMarketError, Result};

/// Mean Earth radius used by the haversine distance.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

pub const STATIONS_TABLE: &str = "stations";
pub const OBSERVATIONS_TABLE: &str = "price_observations";

/// How long a cached daily rank stays readable.
pub const RANK_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

pub fn default_cache_dir() -> PathBuf {
    if let Some(cache) = dirs::cache_dir() {
        cache.join("fuel-market-sdk")
    } else {
        PathBuf::from(".fuel-market-sdk-cache")
    }
}

/// Every threshold the analyzers depend on.
///
/// Missing fields in a JSON config file fall back to [`AnalyticsConfig::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Regression slope (price units per observation) above which a series is rising.
    pub trend_direction_threshold: f64,
    pub weekly_seasonality_threshold: f64,
    pub monthly_seasonality_threshold: f64,
    pub moving_average_window: usize,
    /// Number of standard deviations a price must sit from the mean to be an outlier.
    pub outlier_sigma: f64,
    pub recommendation_threshold_percent: f64,
    pub max_recommendations: usize,
    pub idw_max_radius_km: f64,
    pub idw_min_distance_km: f64,
    pub heatmap_nearby_stations: usize,
    pub heatmap_max_cells: usize,
    pub geo_window_hours: i64,
    pub national_window_days: i64,
    pub rank_cache_ttl_secs: u64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            trend_direction_threshold: 0.01,
            weekly_seasonality_threshold: 0.5,
            monthly_seasonality_threshold: 1.0,
            moving_average_window: 7,
            outlier_sigma: 2.0,
            recommendation_threshold_percent: 3.0,
            max_recommendations: 5,
            idw_max_radius_km: 50.0,
            idw_min_distance_km: 0.1,
            heatmap_nearby_stations: 3,
            heatmap_max_cells: 2500,
            geo_window_hours: 24,
            national_window_days: 7,
            rank_cache_ttl_secs: RANK_CACHE_TTL.as_secs(),
        }
    }
}

impl AnalyticsConfig {
    /// Load a config from a JSON file and validate it.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        let config: AnalyticsConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        info!(path = %path.as_ref().display(), "analytics config loaded");
        Ok(config)
    }

    pub fn rank_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.rank_cache_ttl_secs)
    }

    /// Reject values that would make the analyzers divide by zero or loop forever.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("trend_direction_threshold", self.trend_direction_threshold),
            ("weekly_seasonality_threshold", self.weekly_seasonality_threshold),
            ("monthly_seasonality_threshold", self.monthly_seasonality_threshold),
            ("outlier_sigma", self.outlier_sigma),
            ("recommendation_threshold_percent", self.recommendation_threshold_percent),
            ("idw_max_radius_km", self.idw_max_radius_km),
            ("idw_min_distance_km", self.idw_min_distance_km),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(FuelMarketError::InvalidArgument(format!(
                    "{} must be a positive number, got {}",
                    name, value
                )));
            }
        }
        if self.moving_average_window == 0 {
            return Err(FuelMarketError::InvalidArgument(
                "moving_average_window must be at least 1".to_string(),
            ));
        }
        if self.heatmap_max_cells == 0 {
            return Err(FuelMarketError::InvalidArgument(
                "heatmap_max_cells must be at least 1".to_string(),
            ));
        }
        if self.geo_window_hours <= 0 || self.national_window_days <= 0 {
            return Err(FuelMarketError::InvalidArgument(
                "geo_window_hours and national_window_days must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
