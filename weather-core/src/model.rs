use std::{collections::BTreeMap, fmt};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A point on Earth. Latitude is limited to the band the weather API
/// serves reliably.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct Coordinate {
    #[validate(range(
        exclusive_min = -80.0,
        exclusive_max = 80.0,
        message = "latitude must be strictly between -80 and 80"
    ))]
    pub latitude: f64,

    #[validate(range(
        exclusive_min = -180.0,
        exclusive_max = 180.0,
        message = "longitude must be strictly between -180 and 180"
    ))]
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.latitude, self.longitude)
    }
}

/// Rectangle spanned by two opposite corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub bottom_left: Coordinate,
    pub top_right: Coordinate,
}

impl BoundingBox {
    pub fn new(bottom_left: Coordinate, top_right: Coordinate) -> Self {
        Self { bottom_left, top_right }
    }

    /// `lon_left,lat_bottom,lon_right,lat_top,zoom`, the order the box endpoint expects.
    pub fn to_bbox_param(&self, zoom: u8) -> String {
        format!(
            "{},{},{},{},{}",
            self.bottom_left.longitude,
            self.bottom_left.latitude,
            self.top_right.longitude,
            self.top_right.latitude,
            zoom
        )
    }
}

/// One station as reported by the weather API. Temperature is in Kelvin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationReading {
    pub station: String,
    pub kelvin: f64,
    pub observed_at: Option<DateTime<Utc>>,
}

/// Station name to temperature. Iterates in name order.
pub type StationTemperatures = BTreeMap<String, f64>;

/// Arithmetic mean of a set of station temperatures.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeanTemperature(pub f64);

/// Always one decimal place.
impl fmt::Display for MeanTemperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.0)
    }
}

/// Result of a single-point lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointReport {
    pub station: String,
    pub temperature_c: f64,
    pub observed_at: Option<DateTime<Utc>>,
}

impl PointReport {
    pub fn temperature_display(&self) -> String {
        format!("{:.1}", self.temperature_c)
    }
}

/// Result of a bounding-box lookup. Temperatures stay in Kelvin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxReport {
    pub stations: StationTemperatures,
    pub mean: MeanTemperature,
}
