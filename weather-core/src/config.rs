use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::error::{Result, WeatherError};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:5000";
pub const DEFAULT_BBOX_ZOOM: u8 = 10;

/// How the single-point form checks coordinate ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointPolicy {
    /// Both axes must lie inside their open ranges.
    #[default]
    Strict,
    /// Reject when `-80 < lat < 80 || -180 < lon < 180`, as the first
    /// version of the app did.
    Legacy,
}

impl PointPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            PointPolicy::Strict => "strict",
            PointPolicy::Legacy => "legacy",
        }
    }

    pub const fn all() -> &'static [PointPolicy] {
        &[PointPolicy::Strict, PointPolicy::Legacy]
    }
}

impl std::fmt::Display for PointPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// listen_addr = "127.0.0.1:5000"
/// point_validation = "strict"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// OpenWeatherMap `appid`.
    pub api_key: Option<String>,

    /// Base of the 2.5 API, without a trailing slash.
    pub base_url: String,

    /// Address `weather serve` binds to when `--addr` is not given.
    pub listen_addr: String,

    /// Zoom level appended to every `bbox` query.
    pub bbox_zoom: u8,

    pub point_validation: PointPolicy,

    /// Outbound request timeout. Unset means wait indefinitely.
    pub timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            bbox_zoom: DEFAULT_BBOX_ZOOM,
            point_validation: PointPolicy::default(),
            timeout_secs: None,
        }
    }
}

impl Config {
    /// Load config from the platform config dir, or defaults if the file doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|e| {
            WeatherError::Config(format!("Failed to read config file {}: {e}", path.display()))
        })?;

        let cfg: Config = toml::from_str(&contents).map_err(|e| {
            WeatherError::Config(format!("Failed to parse config file {}: {e}", path.display()))
        })?;

        Ok(cfg)
    }

    /// Save config to the platform config dir, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                WeatherError::Config(format!(
                    "Failed to create config directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        let toml = toml::to_string_pretty(self).map_err(|e| {
            WeatherError::Config(format!("Failed to serialize configuration to TOML: {e}"))
        })?;

        fs::write(path, toml).map_err(|e| {
            WeatherError::Config(format!("Failed to write config file {}: {e}", path.display()))
        })?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "coord-weather", "weather")
            .ok_or_else(|| {
                WeatherError::Config("Could not determine platform config directory".to_string())
            })?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Returns the API key, or a config error telling the user how to set one.
    pub fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                WeatherError::Config(
                    "No API key configured.\n\
                     Hint: run `weather configure` and enter your OpenWeatherMap API key."
                        .to_string(),
                )
            })
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}
