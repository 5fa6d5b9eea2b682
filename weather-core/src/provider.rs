use crate::{
    Config, Result,
    model::{BoundingBox, Coordinate, StationReading},
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod openweather;

/// Source of station readings. Each call makes at most one outbound request.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Current reading of the station nearest to `at`.
    async fn current_at(&self, at: Coordinate) -> Result<StationReading>;

    /// Current readings of every station inside `area`.
    async fn stations_in(&self, area: BoundingBox) -> Result<Vec<StationReading>>;
}

/// Construct the OpenWeatherMap provider from config.
pub fn provider_from_config(config: &Config) -> Result<Arc<dyn WeatherProvider>> {
    let provider = OpenWeatherProvider::from_config(config)?;
    Ok(Arc::new(provider))
}
