use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use tracing::{debug, error};

use crate::{
    Config,
    error::{Result, UpstreamError, WeatherError},
    model::{BoundingBox, Coordinate, StationReading},
};

use super::WeatherProvider;

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    bbox_zoom: u8,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config.api_key()?.to_owned();

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| WeatherError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            bbox_zoom: config.bbox_zoom,
            http,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> std::result::Result<T, UpstreamError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!(%url, ?params, "requesting OpenWeather");

        let res = self
            .http
            .get(&url)
            .query(params)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await
            .map_err(redact)?;

        let status = res.status();
        let body = res.text().await.map_err(redact)?;

        if !status.is_success() {
            return Err(UpstreamError::Status {
                status,
                body: truncate_body(&body),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwStation {
    name: String,
    dt: Option<i64>,
    main: OwMain,
}

#[derive(Debug, Deserialize)]
struct OwBoxResponse {
    list: Vec<OwStation>,
}

impl From<OwStation> for StationReading {
    fn from(station: OwStation) -> Self {
        StationReading {
            station: station.name,
            kelvin: station.main.temp,
            observed_at: station.dt.and_then(unix_to_utc),
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current_at(&self, at: Coordinate) -> Result<StationReading> {
        let params = [
            ("lat", at.latitude.to_string()),
            ("lon", at.longitude.to_string()),
        ];

        let station: OwStation = self.get_json("weather", &params).await.inspect_err(|e| {
            error!(coordinate = %at, error = %e, "OpenWeather current weather request failed");
        })?;

        Ok(station.into())
    }

    async fn stations_in(&self, area: BoundingBox) -> Result<Vec<StationReading>> {
        let params = [("bbox", area.to_bbox_param(self.bbox_zoom))];

        let parsed: OwBoxResponse = self.get_json("box/city", &params).await.inspect_err(|e| {
            error!(bbox = %params[0].1, error = %e, "OpenWeather box request failed");
        })?;

        debug!(stations = parsed.list.len(), "OpenWeather box response parsed");
        Ok(parsed.list.into_iter().map(StationReading::from).collect())
    }
}

/// reqwest errors carry the request URL, and with it the `appid` query parameter.
fn redact(err: reqwest::Error) -> UpstreamError {
    UpstreamError::Transport(err.without_url())
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
