//! Read ports the analyzers consume, and their DuckDB implementation.
//!
//! Every method is a single bulk query: callers resolve whole station sets
//! and look rows up in memory rather than issuing one query per station.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::config::{OBSERVATIONS_TABLE, STATIONS_TABLE};
use crate::connection::Connection;
use crate::error::Result;
use crate::geo::BoundingBox;
use crate::models::{FuelType, PriceObservation, Station};
use crate::sql_builder::SqlBuilder;

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

/// Station directory filter. All set fields must match.
#[derive(Debug, Clone, Default)]
pub struct StationFilter {
    pub ids: Option<Vec<String>>,
    pub region_id: Option<String>,
    pub municipality_id: Option<String>,
    pub bounds: Option<BoundingBox>,
    /// Inactive stations are skipped unless this is set.
    pub include_inactive: bool,
}

impl StationFilter {
    pub fn in_region(region_id: &str) -> Self {
        Self {
            region_id: Some(region_id.to_string()),
            ..Self::default()
        }
    }

    pub fn in_municipality(municipality_id: &str) -> Self {
        Self {
            municipality_id: Some(municipality_id.to_string()),
            ..Self::default()
        }
    }

    pub fn within(bounds: BoundingBox) -> Self {
        Self {
            bounds: Some(bounds),
            ..Self::default()
        }
    }
}

/// Observation history filter. Results are ordered by station, fuel, then time.
#[derive(Debug, Clone, Default)]
pub struct ObservationFilter {
    pub station_ids: Option<Vec<String>>,
    pub region_id: Option<String>,
    pub municipality_id: Option<String>,
    pub fuel_type: Option<FuelType>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl ObservationFilter {
    pub fn between(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
            ..Self::default()
        }
    }

    pub fn stations(mut self, ids: &[String]) -> Self {
        self.station_ids = Some(ids.to_vec());
        self
    }

    pub fn fuel(mut self, fuel: FuelType) -> Self {
        self.fuel_type = Some(fuel);
        self
    }
}

// ---------------------------------------------------------------------------
// Ports
// ---------------------------------------------------------------------------

pub trait StationDirectory {
    fn station(&self, id: &str) -> Result<Option<Station>>;
    fn stations(&self, filter: &StationFilter) -> Result<Vec<Station>>;
}

pub trait ObservationStore {
    /// Latest observation per `(station_id, fuel_type)` for the given stations,
    /// considering only rows observed inside `[since, until]` when set.
    fn latest_prices(
        &self,
        station_ids: &[String],
        since: Option<DateTime<Utc>>,
        until: Option<DateTime<Utc>>,
    ) -> Result<Vec<PriceObservation>>;

    fn observations(&self, filter: &ObservationFilter) -> Result<Vec<PriceObservation>>;

    /// Mean observed price per fuel across every station inside `[from, to]`.
    fn average_prices(&self, from: DateTime<Utc>, to: DateTime<Utc>)
        -> Result<Vec<(FuelType, f64)>>;
}

/// Everything the analyzers read.
pub trait MarketData: StationDirectory + ObservationStore {}

impl<T: StationDirectory + ObservationStore + ?Sized> MarketData for T {}

// ---------------------------------------------------------------------------
// DuckDB implementation
// ---------------------------------------------------------------------------

const STATION_COLUMNS: [&str; 8] = [
    "id",
    "name",
    "lat",
    "lng",
    "municipality_id",
    "region_id",
    "brand",
    "active",
];

impl StationDirectory for Connection {
    fn station(&self, id: &str) -> Result<Option<Station>> {
        let (sql, params) = SqlBuilder::new(STATIONS_TABLE)
            .select(&STATION_COLUMNS)
            .where_eq("id", id)
            .limit(1)
            .build();
        Ok(self.execute_into::<Station>(&sql, &params)?.into_iter().next())
    }

    fn stations(&self, filter: &StationFilter) -> Result<Vec<Station>> {
        let mut qb = SqlBuilder::new(STATIONS_TABLE);
        qb.select(&STATION_COLUMNS);

        if let Some(ids) = &filter.ids {
            qb.where_in("id", ids);
        }
        if let Some(region) = &filter.region_id {
            qb.where_eq("region_id", region);
        }
        if let Some(municipality) = &filter.municipality_id {
            qb.where_eq("municipality_id", municipality);
        }
        if let Some(bounds) = &filter.bounds {
            qb.where_between("lat", bounds.south, bounds.north);
            qb.where_between_any("lng", &bounds.longitude_ranges());
        }
        if !filter.include_inactive {
            qb.where_clause("active", &[]);
        }
        qb.order_by(&["id ASC"]);

        let (sql, params) = qb.build();
        self.execute_into(&sql, &params)
    }
}

impl ObservationStore for Connection {
    fn latest_prices(
        &self,
        station_ids: &[String],
        since: Option<DateTime<Utc>>,
        until: Option<DateTime<Utc>>,
    ) -> Result<Vec<PriceObservation>> {
        if station_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut qb = SqlBuilder::new(OBSERVATIONS_TABLE);
        qb.select(&[
            "station_id",
            "fuel_type",
            "arg_max(price, observed_at) AS price",
            "epoch_ms(max(observed_at)) AS observed_at",
        ]);
        qb.where_in("station_id", station_ids);
        if let Some(ts) = since {
            qb.where_since("observed_at", &ts);
        }
        if let Some(ts) = until {
            qb.where_until("observed_at", &ts);
        }
        qb.group_by(&["station_id", "fuel_type"]);
        qb.order_by(&["station_id ASC", "fuel_type ASC"]);

        let (sql, params) = qb.build();
        let rows: Vec<PriceObservation> = self.execute_into(&sql, &params)?;
        debug!(
            stations = station_ids.len(),
            rows = rows.len(),
            "fetched latest prices"
        );
        Ok(rows)
    }

    fn observations(&self, filter: &ObservationFilter) -> Result<Vec<PriceObservation>> {
        let mut qb = SqlBuilder::new(&format!("{} o", OBSERVATIONS_TABLE));
        qb.select(&[
            "o.station_id",
            "o.fuel_type",
            "o.price",
            "epoch_ms(o.observed_at) AS observed_at",
        ]);

        if filter.region_id.is_some() || filter.municipality_id.is_some() {
            qb.join(&format!("JOIN {} s ON s.id = o.station_id", STATIONS_TABLE));
        }
        if let Some(ids) = &filter.station_ids {
            qb.where_in("o.station_id", ids);
        }
        if let Some(region) = &filter.region_id {
            qb.where_eq("s.region_id", region);
        }
        if let Some(municipality) = &filter.municipality_id {
            qb.where_eq("s.municipality_id", municipality);
        }
        if let Some(fuel) = filter.fuel_type {
            qb.where_eq("o.fuel_type", fuel.as_str());
        }
        if let Some(from) = &filter.from {
            qb.where_since("o.observed_at", from);
        }
        if let Some(to) = &filter.to {
            qb.where_until("o.observed_at", to);
        }
        qb.order_by(&["o.station_id ASC", "o.fuel_type ASC", "o.observed_at ASC"]);

        let (sql, params) = qb.build();
        self.execute_into(&sql, &params)
    }

    fn average_prices(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<(FuelType, f64)>> {
        #[derive(Deserialize)]
        struct AverageRow {
            fuel_type: FuelType,
            avg_price: Option<f64>,
        }

        let (sql, params) = SqlBuilder::new(OBSERVATIONS_TABLE)
            .select(&["fuel_type", "AVG(price) AS avg_price"])
            .where_since("observed_at", &from)
            .where_until("observed_at", &to)
            .group_by(&["fuel_type"])
            .order_by(&["fuel_type ASC"])
            .build();

        let rows: Vec<AverageRow> = self.execute_into(&sql, &params)?;
        Ok(rows
            .into_iter()
            .filter_map(|r| r.avg_price.map(|avg| (r.fuel_type, avg)))
            .collect())
    }
}
