use anyhow::{Context, Result, anyhow, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, net::SocketAddr, path::{Path, PathBuf}, time::Duration};

use crate::classify::ThresholdClassifier;

pub const DEFAULT_FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Inbound query interface.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub listen: SocketAddr,
    /// Base URL of the scraper process.
    pub scraper_url: String,
    pub rpc_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([0, 0, 0, 0], 8080)),
            scraper_url: "http://127.0.0.1:50051".to_string(),
            rpc_timeout_secs: 15,
        }
    }
}

/// Fetch-and-classify process.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    pub listen: SocketAddr,
    /// Base URL of the store process.
    pub store_url: String,
    pub rpc_timeout_secs: u64,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([0, 0, 0, 0], 50051)),
            store_url: "http://127.0.0.1:50053".to_string(),
            rpc_timeout_secs: 10,
        }
    }
}

/// Persistence process.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub listen: SocketAddr,
    /// Database file; defaults to `temperatures.redb` in the platform data dir.
    pub path: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { listen: SocketAddr::from(([0, 0, 0, 0], 50053)), path: None }
    }
}

impl StoreConfig {
    pub fn database_path(&self) -> Result<PathBuf> {
        match &self.path {
            Some(path) => Ok(path.clone()),
            None => Ok(project_dirs()?.data_dir().join("temperatures.redb")),
        }
    }
}

/// Outbound forecast endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    pub url: String,
    pub timeout_secs: u64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self { url: DEFAULT_FORECAST_URL.to_string(), timeout_secs: 10 }
    }
}

impl ForecastConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Comfort band used by the alert classifier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    pub low: f64,
    pub high: f64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self { low: ThresholdClassifier::DEFAULT_LOW, high: ThresholdClassifier::DEFAULT_HIGH }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// [api]
/// listen = "0.0.0.0:8080"
/// scraper_url = "http://127.0.0.1:50051"
///
/// [alert]
/// low = 10.0
/// high = 40.0
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub scraper: ScraperConfig,
    pub store: StoreConfig,
    pub forecast: ForecastConfig,
    pub alert: AlertConfig,
}

impl Config {
    /// Load config from the platform config dir, or defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    /// Load config from an explicit path, or defaults if the file is absent.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        cfg.validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to the platform config dir.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    /// Save config to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(project_dirs()?.config_dir().join("config.toml"))
    }

    /// Apply the `PORT` override for the inbound API listener.
    pub fn apply_port_override(&mut self, port: Option<&str>) -> Result<()> {
        let Some(port) = port.map(str::trim).filter(|p| !p.is_empty()) else {
            return Ok(());
        };

        let port: u16 = port.parse().with_context(|| format!("Invalid PORT value '{port}'"))?;
        self.api.listen.set_port(port);
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let AlertConfig { low, high } = self.alert;
        if !low.is_finite() || !high.is_finite() {
            bail!("Alert thresholds must be finite numbers (low = {low}, high = {high})");
        }
        if low > high {
            bail!("Alert threshold low ({low}) must not exceed high ({high})");
        }

        for (name, secs) in [
            ("forecast.timeout_secs", self.forecast.timeout_secs),
            ("api.rpc_timeout_secs", self.api.rpc_timeout_secs),
            ("scraper.rpc_timeout_secs", self.scraper.rpc_timeout_secs),
        ] {
            if secs == 0 {
                bail!("{name} must be at least 1 second");
            }
        }
        Ok(())
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("dev", "temperature-exercise", "temperature")
        .ok_or_else(|| anyhow!("Could not determine platform config directory"))
}
