//! Geodesy helpers: coordinates and great-circle distance.
//!
//! Distances use the haversine formula on a spherical Earth with a mean
//! radius of 6371.0 km.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Distance reported when either endpoint is unusable.
///
/// Anything compared against a finite radius with `<=` is rejected.
pub const UNREACHABLE_KM: f64 = f64::INFINITY;

/// A WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude, -90..=90
    pub lat: f64,
    /// Longitude, -180..=180
    pub lng: f64,
}

/// Rejected coordinate input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordinateError {
    #[error("latitude {0} is not a finite value in -90..=90")]
    Latitude(f64),

    #[error("longitude {0} is not a finite value in -180..=180")]
    Longitude(f64),
}

impl Coordinate {
    /// Create a validated coordinate.
    pub fn new(lat: f64, lng: f64) -> Result<Self, CoordinateError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(CoordinateError::Latitude(lat));
        }
        if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
            return Err(CoordinateError::Longitude(lng));
        }
        Ok(Self { lat, lng })
    }

    /// Whether both components are finite and in range.
    ///
    /// Fields are public, so a value built with a struct literal may
    /// still be out of range.
    pub fn is_valid(&self) -> bool {
        Self::new(self.lat, self.lng).is_ok()
    }

    /// Great-circle distance to `other` in kilometers.
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        distance_km(*self, *other)
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lat, self.lng)
    }
}

/// Calculate great-circle distance between two coordinates (Haversine formula).
///
/// Returns [`UNREACHABLE_KM`] instead of failing when either side is
/// non-finite or out of range.
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    if !a.is_valid() || !b.is_valid() {
        return UNREACHABLE_KM;
    }

    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    // Rounding can push h a hair above 1 for antipodal points.
    let c = 2.0 * h.clamp(0.0, 1.0).sqrt().asin();

    EARTH_RADIUS_KM * c
}

/// Build a Google Maps directions link from `origin` to `destination`.
///
/// Both ends are plain coordinates; the link carries no place id.
pub fn directions_url(origin: Coordinate, destination: Coordinate) -> Result<Url, url::ParseError> {
    Url::parse_with_params(
        "https://www.google.com/maps/dir/",
        &[
            ("api", "1".to_string()),
            ("origin", format!("{},{}", origin.lat, origin.lng)),
            ("destination", format!("{},{}", destination.lat, destination.lng)),
        ],
    )
}
