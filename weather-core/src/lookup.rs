//! The two lookups the web app offers, independent of how they are served.

use tracing::info;

use crate::{
    aggregate::{collect_stations, kelvin_to_celsius, mean_temperature},
    error::Result,
    model::{BoundingBox, BoxReport, Coordinate, PointReport},
    provider::WeatherProvider,
};

/// Fetch the nearest station and convert its temperature to Celsius.
pub async fn lookup_point(provider: &dyn WeatherProvider, at: Coordinate) -> Result<PointReport> {
    let reading = provider.current_at(at).await?;
    info!(coordinate = %at, station = %reading.station, "point lookup done");

    Ok(PointReport {
        temperature_c: kelvin_to_celsius(reading.kelvin),
        station: reading.station,
        observed_at: reading.observed_at,
    })
}

/// Fetch every station in `area` and average them. Temperatures stay in Kelvin.
pub async fn lookup_box(provider: &dyn WeatherProvider, area: BoundingBox) -> Result<BoxReport> {
    let readings = provider.stations_in(area).await?;
    let stations = collect_stations(readings);
    let mean = mean_temperature(&stations)?;
    info!(stations = stations.len(), %mean, "box lookup done");

    Ok(BoxReport { stations, mean })
}
