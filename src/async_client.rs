//! Async wrapper around [`FuelMarket`] for use in async runtimes (Tokio, etc.).
//!
//! Runs all SDK operations on a blocking thread pool via
//! [`tokio::task::spawn_blocking`], keeping the async event loop free.
//! DuckDB queries and the analytics are CPU-bound but fast, making this
//! approach efficient.
//!
//! # Example
//!
//! ```no_run
//! use fuel_market_sdk::AsyncFuelMarket;
//!
//! #[tokio::main]
//! async fn main() {
//!     let market = AsyncFuelMarket::builder().build().await.unwrap();
//!
//!     // Run any sync SDK method via closure
//!     let spreads = market
//!         .run(|m| m.spread().for_station("st-001", 5.0))
//!         .await
//!         .unwrap();
//! }
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::cache::RankCache;
use crate::config::AnalyticsConfig;
use crate::error::{FuelMarketError, Result};
use crate::locale::Translator;
use crate::FuelMarket;

// ---------------------------------------------------------------------------
// AsyncFuelMarketBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing an [`AsyncFuelMarket`] instance.
///
/// Mirrors [`FuelMarketBuilder`](crate::FuelMarketBuilder).
#[derive(Default)]
pub struct AsyncFuelMarketBuilder {
    database: Option<PathBuf>,
    config: Option<AnalyticsConfig>,
    rank_cache: Option<Box<dyn RankCache>>,
    rank_cache_dir: Option<PathBuf>,
    translator: Option<Box<dyn Translator + Send + Sync>>,
}

impl AsyncFuelMarketBuilder {
    pub fn database<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.database = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn config(mut self, config: AnalyticsConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn rank_cache(mut self, cache: Box<dyn RankCache>) -> Self {
        self.rank_cache = Some(cache);
        self
    }

    pub fn rank_cache_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.rank_cache_dir = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn translator(mut self, translator: Box<dyn Translator + Send + Sync>) -> Self {
        self.translator = Some(translator);
        self
    }

    /// Build the async SDK, opening DuckDB on the blocking thread pool so it
    /// won't block the async event loop.
    pub async fn build(self) -> Result<AsyncFuelMarket> {
        tokio::task::spawn_blocking(move || {
            let mut builder = FuelMarket::builder();
            if let Some(path) = self.database {
                builder = builder.database(path);
            }
            if let Some(config) = self.config {
                builder = builder.config(config);
            }
            if let Some(cache) = self.rank_cache {
                builder = builder.rank_cache(cache);
            }
            if let Some(dir) = self.rank_cache_dir {
                builder = builder.rank_cache_dir(dir);
            }
            if let Some(translator) = self.translator {
                builder = builder.translator(translator);
            }
            let market = builder.build()?;
            Ok(AsyncFuelMarket {
                inner: Arc::new(Mutex::new(market)),
            })
        })
        .await
        .map_err(|e| FuelMarketError::InvalidArgument(format!("Task join error: {e}")))?
    }
}

// ---------------------------------------------------------------------------
// AsyncFuelMarket
// ---------------------------------------------------------------------------

/// Async wrapper around [`FuelMarket`].
///
/// All operations are dispatched to a blocking thread pool via
/// [`tokio::task::spawn_blocking`]. The underlying [`FuelMarket`] is
/// protected by a [`Mutex`] since a DuckDB connection is not `Sync`.
pub struct AsyncFuelMarket {
    inner: Arc<Mutex<FuelMarket>>,
}

impl AsyncFuelMarket {
    /// Create a new builder for configuring the async SDK.
    pub fn builder() -> AsyncFuelMarketBuilder {
        AsyncFuelMarketBuilder::default()
    }

    /// Wrap an already built [`FuelMarket`].
    pub fn from_market(market: FuelMarket) -> Self {
        Self {
            inner: Arc::new(Mutex::new(market)),
        }
    }

    /// Run a sync SDK operation on the blocking thread pool.
    ///
    /// The closure receives an `&FuelMarket` reference and should return
    /// a `Result<T>`.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use fuel_market_sdk::{AsyncFuelMarket, FuelType};
    /// # async fn example() -> fuel_market_sdk::Result<()> {
    /// # let market = AsyncFuelMarket::builder().build().await?;
    /// let rank = market
    ///     .run(|m| m.ranking().rank("st-001", FuelType::Diesel, 5.0, chrono::Utc::now()))
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&FuelMarket) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let market = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let guard = market
                .lock()
                .map_err(|_| FuelMarketError::InvalidArgument("SDK lock poisoned".into()))?;
            f(&guard)
        })
        .await
        .map_err(|e| FuelMarketError::InvalidArgument(format!("Task join error: {e}")))?
    }

    /// Execute a raw SQL query asynchronously.
    pub async fn sql(
        &self,
        query: &str,
        params: &[String],
    ) -> Result<Vec<HashMap<String, serde_json::Value>>> {
        let query = query.to_string();
        let params = params.to_vec();
        self.run(move |m| m.sql(&query, &params)).await
    }

    /// Load stations from a file asynchronously.
    pub async fn load_stations<P: AsRef<Path>>(&self, path: P) -> Result<usize> {
        let path = path.as_ref().to_path_buf();
        self.run(move |m| m.load_stations(&path)).await
    }

    /// Load price observations from a file asynchronously.
    pub async fn load_observations<P: AsRef<Path>>(&self, path: P) -> Result<usize> {
        let path = path.as_ref().to_path_buf();
        self.run(move |m| m.load_observations(&path)).await
    }

    /// Close the SDK, releasing all resources.
    pub async fn close(self) -> Result<()> {
        tokio::task::spawn_blocking(move || {
            let market = self
                .inner
                .lock()
                .map_err(|_| FuelMarketError::InvalidArgument("SDK lock poisoned".into()))?;
            // Dropping the MutexGuard drops the SDK
            drop(market);
            Ok(())
        })
        .await
        .map_err(|e| FuelMarketError::InvalidArgument(format!("Task join error: {e}")))?
    }
}
