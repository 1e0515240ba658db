//! Fuel market analytics SDK for Rust.
//!
//! Answers the questions a fuel station operator asks about its market: who
//! its competitors are, where its price sits among theirs, how prices are
//! trending, how areas compare, and what to do about it. Station and price
//! observation data lives in DuckDB and is queried in-process; the
//! statistics run on plain Rust data in [`analysis`].
//!
//! # Quick start
//!
//! ```no_run
//! use fuel_market_sdk::{FuelMarket, FuelType};
//!
//! let market = FuelMarket::builder().build().unwrap();
//! market.load_stations("stations.ndjson").unwrap();
//! market.load_observations("observations.ndjson").unwrap();
//!
//! // Spread of every fuel against competitors within 5 km
//! let spreads = market.spread().for_station("st-001", 5.0).unwrap();
//!
//! // Where the station ranks for regular today
//! let rank = market
//!     .ranking()
//!     .rank("st-001", FuelType::Regular, 5.0, chrono::Utc::now())
//!     .unwrap();
//! ```

pub mod analysis;
#[cfg(feature = "async")]
pub mod async_client;
pub mod cache;
pub mod config;
pub mod connection;
pub mod error;
pub mod geo;
pub mod locale;
pub mod models;
pub mod queries;
pub mod sql_builder;
pub mod stats;
pub mod store;

#[cfg(feature = "async")]
pub use async_client::AsyncFuelMarket;
pub use cache::{FileRankCache, MemoryRankCache, RankCache};
pub use config::AnalyticsConfig;
pub use connection::Connection;
pub use error::{FuelMarketError, Result};
pub use geo::{BoundingBox, GeoPoint};
pub use locale::{Catalog, Translator};
pub use models::*;
pub use sql_builder::SqlBuilder;
pub use store::{MarketData, ObservationFilter, ObservationStore, StationDirectory, StationFilter};

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use tracing::info;

fn database_label(path: Option<&Path>) -> String {
    path.map(|p| p.display().to_string())
        .unwrap_or_else(|| ":memory:".to_string())
}

// ---------------------------------------------------------------------------
// FuelMarketBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing a [`FuelMarket`] instance.
///
/// Use [`FuelMarket::builder()`] to obtain a builder, chain configuration
/// methods, and call [`build()`](FuelMarketBuilder::build) to create the SDK.
#[derive(Default)]
pub struct FuelMarketBuilder {
    database: Option<PathBuf>,
    config: Option<AnalyticsConfig>,
    rank_cache: Option<Box<dyn RankCache>>,
    rank_cache_dir: Option<PathBuf>,
    translator: Option<Box<dyn Translator + Send + Sync>>,
}

impl FuelMarketBuilder {
    /// Use a DuckDB database file instead of an in-memory database.
    pub fn database<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.database = Some(path.as_ref().to_path_buf());
        self
    }

    /// Override the analytics thresholds. Defaults to [`AnalyticsConfig::default`].
    pub fn config(mut self, config: AnalyticsConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Inject a rank cache. Takes precedence over [`rank_cache_dir`](Self::rank_cache_dir).
    pub fn rank_cache(mut self, cache: Box<dyn RankCache>) -> Self {
        self.rank_cache = Some(cache);
        self
    }

    /// Persist daily ranks as JSON files under `path`.
    ///
    /// Without this (or [`rank_cache`](Self::rank_cache)) ranks are kept in
    /// memory and rank trends reset with the process.
    pub fn rank_cache_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.rank_cache_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Message catalog for recommendations. Defaults to [`Catalog::english`].
    pub fn translator(mut self, translator: Box<dyn Translator + Send + Sync>) -> Self {
        self.translator = Some(translator);
        self
    }

    /// Build the SDK: validate the config, open DuckDB and create the schema.
    pub fn build(self) -> Result<FuelMarket> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let conn = match &self.database {
            Some(path) => Connection::open(path)?,
            None => Connection::open_in_memory()?,
        };

        let rank_cache: Box<dyn RankCache> = match (self.rank_cache, self.rank_cache_dir) {
            (Some(cache), _) => cache,
            (None, Some(dir)) => Box::new(FileRankCache::new(Some(dir))?),
            (None, None) => Box::new(MemoryRankCache::new()),
        };
        let translator = match self.translator {
            Some(translator) => translator,
            None => Box::new(Catalog::english()),
        };

        info!(
            database = %database_label(self.database.as_deref()),
            "fuel market SDK ready"
        );
        Ok(FuelMarket {
            conn,
            database: self.database,
            config,
            rank_cache,
            translator,
        })
    }
}

// ---------------------------------------------------------------------------
// FuelMarket
// ---------------------------------------------------------------------------

/// The main entry point for the fuel market SDK.
///
/// Owns the DuckDB [`Connection`], the [`AnalyticsConfig`], the rank cache
/// and the message catalog, and exposes the analyses as lightweight
/// borrowing query wrappers.
///
/// Created via [`FuelMarket::builder()`].
pub struct FuelMarket {
    conn: Connection,
    database: Option<PathBuf>,
    config: AnalyticsConfig,
    rank_cache: Box<dyn RankCache>,
    translator: Box<dyn Translator + Send + Sync>,
}

impl FuelMarket {
    /// Create a new builder for configuring the SDK.
    pub fn builder() -> FuelMarketBuilder {
        FuelMarketBuilder::default()
    }

    fn data(&self) -> &dyn MarketData {
        &self.conn
    }

    // -- Query accessors ---------------------------------------------------

    /// Competitor resolution by radius, municipality, or both.
    pub fn competitors(&self) -> queries::CompetitorQuery<'_> {
        queries::CompetitorQuery::new(self.data())
    }

    /// Latest prices and competitor price enrichment.
    pub fn prices(&self) -> queries::PriceQuery<'_> {
        queries::PriceQuery::new(self.data())
    }

    pub fn spread(&self) -> queries::SpreadQuery<'_> {
        queries::SpreadQuery::new(self.data(), &self.config)
    }

    /// Price ranking among competitors.
    ///
    /// Every ranking records today's rank in the rank cache so tomorrow's
    /// ranking can report a trend.
    pub fn ranking(&self) -> queries::RankingQuery<'_> {
        queries::RankingQuery::new(self.data(), &*self.rank_cache, &self.config)
    }

    pub fn trends(&self) -> queries::TrendQuery<'_> {
        queries::TrendQuery::new(self.data(), &self.config)
    }

    /// Period aggregates, national averages and price correlation.
    pub fn market(&self) -> queries::MarketQuery<'_> {
        queries::MarketQuery::new(self.data(), &self.config)
    }

    pub fn areas(&self) -> queries::AreaQuery<'_> {
        queries::AreaQuery::new(self.data(), &self.config)
    }

    pub fn heatmap(&self) -> queries::HeatMapQuery<'_> {
        queries::HeatMapQuery::new(self.data(), &self.config)
    }

    /// Localized pricing recommendations.
    pub fn recommendations(&self) -> queries::RecommendationQuery<'_> {
        queries::RecommendationQuery::new(self.data(), &*self.translator, &self.config)
    }

    // -- Data loading and utility methods ----------------------------------

    /// Load stations from an NDJSON, CSV or parquet file. See [`Connection::load_stations`].
    pub fn load_stations<P: AsRef<Path>>(&self, path: P) -> Result<usize> {
        self.conn.load_stations(path)
    }

    /// Load price observations from an NDJSON, CSV or parquet file.
    pub fn load_observations<P: AsRef<Path>>(&self, path: P) -> Result<usize> {
        self.conn.load_observations(path)
    }

    /// Append one observation if the price changed. Returns whether a row was stored.
    pub fn record_observation(&self, observation: &PriceObservation) -> Result<bool> {
        self.conn.record_observation(observation)
    }

    /// Execute a raw SQL query against the DuckDB database.
    ///
    /// Provides escape-hatch access for queries not covered by the
    /// domain-specific interfaces.
    ///
    /// # Arguments
    ///
    /// * `query` - SQL string with `?` positional placeholders.
    /// * `params` - Parameter values corresponding to the placeholders.
    pub fn sql(
        &self,
        query: &str,
        params: &[String],
    ) -> Result<Vec<HashMap<String, serde_json::Value>>> {
        self.conn.execute(query, params)
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    /// Consume the SDK and release all resources.
    pub fn close(self) {
        drop(self);
    }

    /// Return a reference to the underlying [`Connection`] for advanced usage.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn connection_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl fmt::Display for FuelMarket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stations = self.conn.row_count(config::STATIONS_TABLE).unwrap_or(0);
        let observations = self.conn.row_count(config::OBSERVATIONS_TABLE).unwrap_or(0);
        write!(
            f,
            "FuelMarket(database={}, stations={}, observations={})",
            database_label(self.database.as_deref()),
            stations,
            observations
        )
    }
}
