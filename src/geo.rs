//! Great-circle distance and bounding boxes.

use serde::{Deserialize, Serialize};

use crate::config::EARTH_RADIUS_KM;
use crate::error::{FuelMarketError, Result};

/// Kilometres spanned by one degree of latitude on the haversine sphere.
const KM_PER_DEGREE_LAT: f64 = EARTH_RADIUS_KM * std::f64::consts::PI / 180.0;

/// Haversine distance in kilometres between two `(lat, lng)` pairs in decimal degrees.
///
/// NaN inputs propagate as NaN.
pub fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        haversine_km(self.lat, self.lng, other.lat, other.lng)
    }
}

// ---------------------------------------------------------------------------
// BoundingBox
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl BoundingBox {
    pub fn new(north: f64, south: f64, east: f64, west: f64) -> Result<Self> {
        let bbox = Self {
            north,
            south,
            east,
            west,
        };
        bbox.validate()?;
        Ok(bbox)
    }

    /// Smallest box guaranteed to contain every point within `radius_km` of the center.
    ///
    /// Used as a cheap store-side prefilter; callers still apply the exact
    /// haversine check.
    pub fn around(lat: f64, lng: f64, radius_km: f64) -> Self {
        let d_lat = radius_km / KM_PER_DEGREE_LAT;
        // Longitude degrees shrink poleward; size them at the box edge nearest a pole.
        let cos_lat = (lat.abs() + d_lat).min(90.0).to_radians().cos();
        // Near the poles a longitude degree collapses; take the whole band.
        let d_lng = if cos_lat < 1e-6 {
            180.0
        } else {
            (radius_km / (KM_PER_DEGREE_LAT * cos_lat)).min(180.0)
        };
        Self {
            north: (lat + d_lat).min(90.0),
            south: (lat - d_lat).max(-90.0),
            east: lng + d_lng,
            west: lng - d_lng,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let finite = [self.north, self.south, self.east, self.west]
            .iter()
            .all(|v| v.is_finite());
        if !finite {
            return Err(FuelMarketError::InvalidArgument(
                "bounding box coordinates must be finite".to_string(),
            ));
        }
        if self.south >= self.north || self.west >= self.east {
            return Err(FuelMarketError::InvalidArgument(format!(
                "bounding box must have south < north and west < east, got {:?}",
                self
            )));
        }
        Ok(())
    }

    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        lat >= self.south
            && lat <= self.north
            && self
                .longitude_ranges()
                .iter()
                .any(|(west, east)| lng >= *west && lng <= *east)
    }

    /// Longitude span as ranges inside `[-180, 180]`.
    ///
    /// A box reaching past the antimeridian splits into two ranges; one
    /// spanning a full turn becomes the whole circle.
    pub fn longitude_ranges(&self) -> Vec<(f64, f64)> {
        if self.east - self.west >= 360.0 {
            vec![(-180.0, 180.0)]
        } else if self.west < -180.0 {
            vec![(self.west + 360.0, 180.0), (-180.0, self.east)]
        } else if self.east > 180.0 {
            vec![(self.west, 180.0), (-180.0, self.east - 360.0)]
        } else {
            vec![(self.west, self.east)]
        }
    }

    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.north + self.south) / 2.0,
            (self.east + self.west) / 2.0,
        )
    }

    pub fn height_deg(&self) -> f64 {
        self.north - self.south
    }

    pub fn width_deg(&self) -> f64 {
        self.east - self.west
    }
}
