//! Shared test fixtures for the fuel market SDK integration tests.
//!
//! Provides `setup_sample_db()` which creates an in-memory DuckDB connection
//! populated with a small station directory around central Mexico City and a
//! change-only price history, loaded from NDJSON temp files.
//!
//! Layout (distances from `st-001`):
//! - `st-004` 2.1 km, `st-003` 3.6 km, `st-002` 3.7 km: radius competitors
//! - `st-005` 0.1 km but inactive
//! - `st-009` 5.3 km, same municipality (`cuauhtemoc`) as `st-001`
//! - `st-008` 9.7 km (`coyoacan`), `st-006`/`st-007` 12-14 km (`naucalpan`, region `edomex`)
//!
//! Every active station has a price at `2024-06-15 08:00`; `st-001` and
//! `st-002` also have one regular price per day from June 10 to June 13.

#![allow(dead_code)]

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone, Utc};
use fuel_market_sdk::{Connection, FuelMarket};
use serde_json::json;

/// Reference "now" for every fixture-based test.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
}

pub fn ts(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, day, hour, 0, 0).unwrap()
}

/// Create an in-memory `Connection` loaded with the sample data.
///
/// Returns `(Connection, tempfile::TempDir)`. The caller must keep the `TempDir`
/// alive for the duration of the test.
pub fn setup_sample_db() -> (Connection, tempfile::TempDir) {
    let tmp_dir = tempfile::tempdir().unwrap();
    let (stations, observations) = write_sample_files(tmp_dir.path());

    let conn = Connection::open_in_memory().unwrap();
    conn.load_stations(&stations).unwrap();
    conn.load_observations(&observations).unwrap();
    (conn, tmp_dir)
}

/// Same data behind the full SDK facade (in-memory rank cache, English catalog).
pub fn setup_sample_market() -> (FuelMarket, tempfile::TempDir) {
    let tmp_dir = tempfile::tempdir().unwrap();
    let (stations, observations) = write_sample_files(tmp_dir.path());

    let market = FuelMarket::builder().build().unwrap();
    market.load_stations(&stations).unwrap();
    market.load_observations(&observations).unwrap();
    (market, tmp_dir)
}

/// Write `stations.ndjson` and `observations.ndjson` into `dir`.
pub fn write_sample_files(dir: &Path) -> (PathBuf, PathBuf) {
    let stations = dir.join("stations.ndjson");
    write_ndjson(&stations, &sample_stations());
    let observations = dir.join("observations.ndjson");
    write_ndjson(&observations, &sample_observations());
    (stations, observations)
}

fn station(
    id: &str,
    name: &str,
    lat: f64,
    lng: f64,
    municipality: &str,
    region: &str,
    brand: Option<&str>,
    active: bool,
) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "lat": lat,
        "lng": lng,
        "municipality_id": municipality,
        "region_id": region,
        "brand": brand,
        "active": active
    })
}

fn sample_stations() -> Vec<serde_json::Value> {
    vec![
        station("st-001", "Gas Centro", 19.4326, -99.1332, "cuauhtemoc", "cdmx", Some("Pemex"), true),
        station("st-002", "Gas Reforma", 19.4270, -99.1677, "cuauhtemoc", "cdmx", Some("Shell"), true),
        station("st-003", "Gas Roma", 19.4150, -99.1620, "cuauhtemoc", "cdmx", Some("BP"), true),
        station("st-004", "Gas Tlatelolco", 19.4510, -99.1370, "cuauhtemoc", "cdmx", Some("Pemex"), true),
        station("st-005", "Gas Cerrada", 19.4330, -99.1340, "cuauhtemoc", "cdmx", None, false),
        station("st-006", "Gas Satelite", 19.5100, -99.2330, "naucalpan", "edomex", Some("Mobil"), true),
        station("st-007", "Gas Naucalpan", 19.4780, -99.2390, "naucalpan", "edomex", None, true),
        station("st-008", "Gas Coyoacan", 19.3500, -99.1620, "coyoacan", "cdmx", Some("Shell"), true),
        station("st-009", "Gas Norte", 19.4800, -99.1300, "cuauhtemoc", "cdmx", Some("BP"), true),
    ]
}

fn obs(station_id: &str, fuel: &str, price: f64, at: &str) -> serde_json::Value {
    json!({
        "station_id": station_id,
        "fuel_type": fuel,
        "price": price,
        "observed_at": at
    })
}

fn sample_observations() -> Vec<serde_json::Value> {
    let latest = "2024-06-15 08:00:00";
    let mut rows = Vec::new();

    // Daily regular history, rising 0.10 per day.
    for (day, a, b) in [(10, 20.10, 19.60), (11, 20.20, 19.70), (12, 20.30, 19.80), (13, 20.40, 19.90)] {
        let at = format!("2024-06-{:02} 08:00:00", day);
        rows.push(obs("st-001", "regular", a, &at));
        rows.push(obs("st-002", "regular", b, &at));
    }

    let current: [(&str, Option<f64>, Option<f64>, Option<f64>); 9] = [
        ("st-001", Some(20.50), Some(22.80), Some(23.40)),
        ("st-002", Some(20.00), Some(22.50), Some(23.10)),
        ("st-003", Some(21.00), Some(23.00), None),
        ("st-004", Some(19.50), Some(22.60), Some(23.20)),
        ("st-005", Some(15.00), None, None),
        ("st-006", Some(21.80), Some(23.90), Some(24.50)),
        ("st-007", Some(22.00), Some(24.10), Some(24.30)),
        ("st-008", Some(20.90), Some(22.90), Some(23.60)),
        ("st-009", Some(21.50), Some(23.50), Some(24.00)),
    ];
    for (id, regular, premium, diesel) in current {
        for (fuel, price) in [("regular", regular), ("premium", premium), ("diesel", diesel)] {
            if let Some(p) = price {
                rows.push(obs(id, fuel, p, latest));
            }
        }
    }

    // Unknown fuel types are skipped on load.
    rows.push(obs("st-001", "kerosene", 18.00, latest));
    rows
}

/// Write a slice of JSON values as NDJSON to `path`.
pub fn write_ndjson(path: &Path, rows: &[serde_json::Value]) {
    let mut file = std::fs::File::create(path).unwrap();
    for row in rows {
        writeln!(file, "{}", serde_json::to_string(row).unwrap()).unwrap();
    }
    file.flush().unwrap();
}
