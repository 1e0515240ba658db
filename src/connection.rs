//! DuckDB connection wrapper holding the station directory and the
//! change-only price observation log.
//!
//! Two tables are created on open:
//! - `stations(id, name, lat, lng, municipality_id, region_id, brand, active)`
//! - `price_observations(station_id, fuel_type, price, observed_at)`
//!
//! Bulk loads read NDJSON, CSV or parquet files with explicit column types so
//! the analyzers never see an inferred schema.

use std::path::Path;

use duckdb::{params, types::ValueRef, Connection as DuckDbConnection};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use tracing::{debug, info};

use crate::config::{OBSERVATIONS_TABLE, STATIONS_TABLE};
use crate::error::{FuelMarketError, Result};
use crate::models::{PriceObservation, Station};
use crate::sql_builder::sql_timestamp;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS stations (
        id VARCHAR PRIMARY KEY,
        name VARCHAR NOT NULL,
        lat DOUBLE NOT NULL,
        lng DOUBLE NOT NULL,
        municipality_id VARCHAR NOT NULL,
        region_id VARCHAR NOT NULL,
        brand VARCHAR,
        active BOOLEAN NOT NULL DEFAULT TRUE
    );
    CREATE TABLE IF NOT EXISTS price_observations (
        station_id VARCHAR NOT NULL,
        fuel_type VARCHAR NOT NULL,
        price DOUBLE NOT NULL,
        observed_at TIMESTAMP NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_observations_station_fuel
        ON price_observations (station_id, fuel_type, observed_at);
";

/// Two prices closer than this are the same price for change-only storage.
const PRICE_EPSILON: f64 = 1e-9;

/// Wraps a DuckDB connection that stores stations and price observations.
pub struct Connection {
    conn: DuckDbConnection,
}

impl Connection {
    /// Open an in-memory database with an empty schema.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(DuckDbConnection::open_in_memory()?)
    }

    /// Open (or create) a database file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::init(DuckDbConnection::open(path.as_ref())?)
    }

    fn init(conn: DuckDbConnection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Execute SQL and return results as a `Vec` of `HashMap`s.
    ///
    /// Each row is represented as a `HashMap<String, serde_json::Value>`.
    pub fn execute(
        &self,
        sql: &str,
        params: &[String],
    ) -> Result<Vec<HashMap<String, serde_json::Value>>> {
        let mut stmt = self.conn.prepare(sql)?;

        let param_values: Vec<&dyn duckdb::ToSql> = params
            .iter()
            .map(|p| p as &dyn duckdb::ToSql)
            .collect();

        let mut rows_result = stmt.query(param_values.as_slice())?;

        // Column metadata is only available once the statement has run.
        let statement = rows_result.as_ref().ok_or_else(|| {
            FuelMarketError::InvalidArgument("statement produced no result set".to_string())
        })?;
        let column_names: Vec<String> = statement
            .column_names()
            .into_iter()
            .map(|s| s.to_string())
            .collect();
        let column_count = statement.column_count();

        let mut out: Vec<HashMap<String, serde_json::Value>> = Vec::new();

        while let Some(row) = rows_result.next()? {
            let mut map = HashMap::with_capacity(column_count);
            for (i, col_name) in column_names.iter().enumerate().take(column_count) {
                map.insert(col_name.clone(), convert_value_ref(row.get_ref(i)?));
            }
            out.push(map);
        }

        Ok(out)
    }

    /// Execute SQL and deserialize each row into type `T`.
    pub fn execute_into<T: DeserializeOwned>(
        &self,
        sql: &str,
        params: &[String],
    ) -> Result<Vec<T>> {
        let rows = self.execute(sql, params)?;
        let mut results = Vec::with_capacity(rows.len());
        for row in rows {
            let value = serde_json::Value::Object(row.into_iter().collect());
            results.push(serde_json::from_value(value)?);
        }
        Ok(results)
    }

    /// Execute SQL and return the first column of the first row.
    ///
    /// Returns `None` if the result set is empty.
    pub fn execute_scalar(
        &self,
        sql: &str,
        params: &[String],
    ) -> Result<Option<serde_json::Value>> {
        let mut stmt = self.conn.prepare(sql)?;
        let param_values: Vec<&dyn duckdb::ToSql> = params
            .iter()
            .map(|p| p as &dyn duckdb::ToSql)
            .collect();

        let mut rows = stmt.query(param_values.as_slice())?;

        if let Some(row) = rows.next()? {
            Ok(Some(convert_value_ref(row.get_ref(0)?)))
        } else {
            Ok(None)
        }
    }

    // -- Loading -----------------------------------------------------------

    /// Load stations from an NDJSON, CSV or parquet file.
    ///
    /// Existing stations with the same id are replaced. Returns the number of
    /// rows read from the file.
    pub fn load_stations<P: AsRef<Path>>(&self, path: P) -> Result<usize> {
        let source = file_source(
            path.as_ref(),
            "'id': 'VARCHAR', 'name': 'VARCHAR', 'lat': 'DOUBLE', 'lng': 'DOUBLE', \
             'municipality_id': 'VARCHAR', 'region_id': 'VARCHAR', 'brand': 'VARCHAR', \
             'active': 'BOOLEAN'",
        )?;
        let loaded = self.conn.execute(
            &format!(
                "INSERT OR REPLACE INTO {} \
                 SELECT CAST(id AS VARCHAR), name, CAST(lat AS DOUBLE), CAST(lng AS DOUBLE), \
                        CAST(municipality_id AS VARCHAR), CAST(region_id AS VARCHAR), brand, \
                        COALESCE(CAST(active AS BOOLEAN), TRUE) \
                 FROM {}",
                STATIONS_TABLE, source
            ),
            [],
        )?;
        info!(rows = loaded, path = %path.as_ref().display(), "loaded stations");
        Ok(loaded)
    }

    /// Bulk-append price observations from an NDJSON, CSV or parquet file.
    ///
    /// The file is trusted to already be a change-only stream; rows with an
    /// unknown fuel type are skipped. Returns the number of rows appended.
    pub fn load_observations<P: AsRef<Path>>(&self, path: P) -> Result<usize> {
        let source = file_source(
            path.as_ref(),
            "'station_id': 'VARCHAR', 'fuel_type': 'VARCHAR', 'price': 'DOUBLE', \
             'observed_at': 'TIMESTAMP'",
        )?;
        let loaded = self.conn.execute(
            &format!(
                "INSERT INTO {} \
                 SELECT CAST(station_id AS VARCHAR), LOWER(CAST(fuel_type AS VARCHAR)), \
                        CAST(price AS DOUBLE), CAST(observed_at AS TIMESTAMP) \
                 FROM {} \
                 WHERE LOWER(CAST(fuel_type AS VARCHAR)) IN ('regular', 'premium', 'diesel') \
                   AND price IS NOT NULL AND observed_at IS NOT NULL",
                OBSERVATIONS_TABLE, source
            ),
            [],
        )?;
        info!(rows = loaded, path = %path.as_ref().display(), "loaded price observations");
        Ok(loaded)
    }

    // -- Single-row writes -------------------------------------------------

    /// Insert a station, replacing any existing row with the same id.
    pub fn upsert_station(&self, station: &Station) -> Result<()> {
        self.conn.execute(
            &format!(
                "INSERT OR REPLACE INTO {} VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
                STATIONS_TABLE
            ),
            params![
                station.id,
                station.name,
                station.lat,
                station.lng,
                station.municipality_id,
                station.region_id,
                station.brand,
                station.active
            ],
        )?;
        Ok(())
    }

    /// Append an observation only if its price differs from the latest stored
    /// price for the same station and fuel.
    ///
    /// Returns `true` when a row was written.
    pub fn record_observation(&self, obs: &PriceObservation) -> Result<bool> {
        let latest = self.execute_scalar(
            &format!(
                "SELECT arg_max(price, observed_at) FROM {} \
                 WHERE station_id = ? AND fuel_type = ?",
                OBSERVATIONS_TABLE
            ),
            &[obs.station_id.clone(), obs.fuel_type.as_str().to_string()],
        )?;

        if let Some(previous) = latest.and_then(|v| v.as_f64()) {
            if (previous - obs.price).abs() < PRICE_EPSILON {
                debug!(
                    station = %obs.station_id,
                    fuel = %obs.fuel_type,
                    "price unchanged, observation skipped"
                );
                return Ok(false);
            }
        }

        self.conn.execute(
            &format!(
                "INSERT INTO {} VALUES (?, ?, ?, CAST(? AS TIMESTAMP))",
                OBSERVATIONS_TABLE
            ),
            params![
                obs.station_id,
                obs.fuel_type.as_str(),
                obs.price,
                sql_timestamp(&obs.observed_at)
            ],
        )?;
        Ok(true)
    }

    /// Number of rows in `table`.
    pub fn row_count(&self, table: &str) -> Result<usize> {
        let count = self.execute_scalar(&format!("SELECT COUNT(*) FROM {}", table), &[])?;
        Ok(count.and_then(|v| v.as_u64()).unwrap_or(0) as usize)
    }

    /// Access the underlying DuckDB connection for advanced usage.
    pub fn raw(&self) -> &DuckDbConnection {
        &self.conn
    }
}

/// Table function reading `path` with the given column types, picked by extension.
fn file_source(path: &Path, columns: &str) -> Result<String> {
    let path_str = path.to_string_lossy().replace('\\', "/").replace('\'', "''");
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "parquet" => Ok(format!("read_parquet('{}')", path_str)),
        "csv" => Ok(format!(
            "read_csv('{}', header = true, columns = {{{}}})",
            path_str, columns
        )),
        "json" | "ndjson" | "jsonl" | "gz" => Ok(format!(
            "read_json('{}', format = 'newline_delimited', columns = {{{}}})",
            path_str, columns
        )),
        other => Err(FuelMarketError::InvalidArgument(format!(
            "Unsupported data file extension '{}' for {}",
            other,
            path.display()
        ))),
    }
}

/// Convert a DuckDB `ValueRef` to a `serde_json::Value`.
fn convert_value_ref(val: ValueRef<'_>) -> serde_json::Value {
    match val {
        ValueRef::Null => serde_json::Value::Null,
        ValueRef::Boolean(b) => serde_json::Value::Bool(b),
        ValueRef::TinyInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::SmallInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::Int(n) => serde_json::Value::Number(n.into()),
        ValueRef::BigInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::HugeInt(n) => {
            if let Ok(i) = i64::try_from(n) {
                serde_json::Value::Number(i.into())
            } else {
                serde_json::Value::String(n.to_string())
            }
        }
        ValueRef::UTinyInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::USmallInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::UInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::UBigInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::Float(f) => serde_json::Number::from_f64(f as f64)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        ValueRef::Double(f) => serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        ValueRef::Text(bytes) => {
            serde_json::Value::String(String::from_utf8_lossy(bytes).to_string())
        }
        // Timestamps are selected through epoch_ms(); anything else is unused here.
        _ => serde_json::Value::Null,
    }
}
