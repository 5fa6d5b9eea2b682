//! Core library for the coordinate weather lookup app.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Coordinate parsing and range validation
//! - Abstraction over the weather API, with an OpenWeatherMap client
//! - Point and bounding-box lookups, temperature conversion and averaging
//!
//! It is used by `weather-web`, but can also be reused by other binaries or services.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod lookup;
pub mod model;
pub mod provider;
pub mod validate;

pub use config::{Config, PointPolicy};
pub use error::{FieldMessages, Result, UpstreamError, WeatherError};
pub use lookup::{lookup_box, lookup_point};
pub use model::{
    BoundingBox, BoxReport, Coordinate, MeanTemperature, PointReport, StationReading,
    StationTemperatures,
};
pub use provider::{WeatherProvider, provider_from_config};
pub use validate::{BoxForm, check_point, parse_box, parse_point};
