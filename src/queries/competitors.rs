//! Competitor resolution: which stations a given station competes with.

use std::cmp::Ordering;
use std::collections::HashSet;

use tracing::debug;

use crate::error::{FuelMarketError, Result};
use crate::geo::{haversine_km, BoundingBox};
use crate::models::{CompetitorCandidate, CompetitorMode, CompetitorSet, Station};
use crate::queries::prices::PriceQuery;
use crate::store::{MarketData, StationFilter};

/// Look a station up or fail with `NotFound`.
pub(crate) fn require_station(data: &dyn MarketData, station_id: &str) -> Result<Station> {
    data.station(station_id)?
        .ok_or_else(|| FuelMarketError::NotFound(format!("Station not found: {}", station_id)))
}

pub(crate) fn validate_radius(radius_km: f64) -> Result<()> {
    if !radius_km.is_finite() || radius_km <= 0.0 {
        return Err(FuelMarketError::InvalidArgument(format!(
            "radius_km must be a positive number, got {}",
            radius_km
        )));
    }
    Ok(())
}

fn by_distance(a: &CompetitorCandidate, b: &CompetitorCandidate) -> Ordering {
    let da = a.distance_km.unwrap_or(f64::INFINITY);
    let db = b.distance_km.unwrap_or(f64::INFINITY);
    da.total_cmp(&db).then_with(|| a.station.id.cmp(&b.station.id))
}

fn candidate(origin: &Station, station: Station) -> CompetitorCandidate {
    let distance = haversine_km(origin.lat, origin.lng, station.lat, station.lng);
    CompetitorCandidate {
        station,
        distance_km: distance.is_finite().then_some(distance),
    }
}

// ---------------------------------------------------------------------------
// CompetitorQuery
// ---------------------------------------------------------------------------

/// Resolves competitor sets for a station.
pub struct CompetitorQuery<'a> {
    data: &'a dyn MarketData,
}

impl<'a> CompetitorQuery<'a> {
    pub fn new(data: &'a dyn MarketData) -> Self {
        Self { data }
    }

    /// Active stations other than `station_id` within `radius_km`, nearest first.
    pub fn by_radius(
        &self,
        station_id: &str,
        radius_km: f64,
    ) -> Result<Vec<CompetitorCandidate>> {
        validate_radius(radius_km)?;
        let origin = require_station(self.data, station_id)?;
        self.within_radius(&origin, radius_km)
    }

    /// Active stations in the same municipality, nearest first.
    pub fn by_municipality(&self, station_id: &str) -> Result<Vec<CompetitorCandidate>> {
        let origin = require_station(self.data, station_id)?;
        self.same_municipality(&origin)
    }

    /// Radius competitors followed by municipality competitors outside the radius.
    pub fn combined(
        &self,
        station_id: &str,
        radius_km: f64,
    ) -> Result<Vec<CompetitorCandidate>> {
        validate_radius(radius_km)?;
        let origin = require_station(self.data, station_id)?;

        let mut result = self.within_radius(&origin, radius_km)?;
        let mut seen: HashSet<String> = result.iter().map(|c| c.station.id.clone()).collect();
        for c in self.same_municipality(&origin)? {
            if seen.insert(c.station.id.clone()) {
                result.push(c);
            }
        }
        Ok(result)
    }

    /// Resolve with `mode`. `radius_km` is ignored for municipality lookups.
    pub fn resolve(
        &self,
        station_id: &str,
        radius_km: f64,
        mode: CompetitorMode,
    ) -> Result<Vec<CompetitorCandidate>> {
        match mode {
            CompetitorMode::Radius => self.by_radius(station_id, radius_km),
            CompetitorMode::Municipality => self.by_municipality(station_id),
            CompetitorMode::Combined => self.combined(station_id, radius_km),
        }
    }

    /// Resolve competitors and attach their latest prices.
    pub fn competitor_set(
        &self,
        station_id: &str,
        radius_km: f64,
        mode: CompetitorMode,
    ) -> Result<CompetitorSet> {
        let candidates = self.resolve(station_id, radius_km, mode)?;
        PriceQuery::new(self.data).enrich(&candidates, None)
    }

    fn within_radius(
        &self,
        origin: &Station,
        radius_km: f64,
    ) -> Result<Vec<CompetitorCandidate>> {
        let bounds = BoundingBox::around(origin.lat, origin.lng, radius_km);
        let stations = self.data.stations(&StationFilter::within(bounds))?;
        let prefiltered = stations.len();

        let mut result: Vec<CompetitorCandidate> = stations
            .into_iter()
            .filter(|s| s.id != origin.id)
            .map(|s| candidate(origin, s))
            .filter(|c| c.distance_km.map(|d| d <= radius_km).unwrap_or(false))
            .collect();
        result.sort_by(by_distance);

        debug!(
            station = %origin.id,
            radius_km,
            prefiltered,
            competitors = result.len(),
            "resolved radius competitors"
        );
        Ok(result)
    }

    fn same_municipality(&self, origin: &Station) -> Result<Vec<CompetitorCandidate>> {
        let stations = self
            .data
            .stations(&StationFilter::in_municipality(&origin.municipality_id))?;
        let mut result: Vec<CompetitorCandidate> = stations
            .into_iter()
            .filter(|s| s.id != origin.id)
            .map(|s| candidate(origin, s))
            .collect();
        result.sort_by(by_distance);
        Ok(result)
    }
}
