use anyhow::{ensure, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::domain::ModelKind;
use crate::forecast::{
    DEFAULT_HORIZON_STEPS, DEFAULT_NOISE_STD_DEV, MAX_CONFIDENCE, MAX_HORIZON_STEPS,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub forecast: ForecastConfig,
    pub history: HistoryConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            request_timeout_secs: 30,
            enable_cors: false,
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    pub default_model: ModelKind,
    pub horizon_hours: usize,
    pub include_now: bool,
    pub confidence_floor: f64,
    /// Confidence points lost per step
    pub confidence_decay_rate: f64,
    /// Relative std-dev of the per-step perturbation; 0 disables noise
    pub noise_std_dev: f64,
    /// Fixed RNG seed for reproducible forecasts
    pub seed: Option<u64>,
    pub max_horizon_hours: usize,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            default_model: ModelKind::default(),
            horizon_hours: DEFAULT_HORIZON_STEPS,
            include_now: false,
            confidence_floor: 60.0,
            confidence_decay_rate: 1.5,
            noise_std_dev: DEFAULT_NOISE_STD_DEV,
            seed: None,
            max_horizon_hours: MAX_HORIZON_STEPS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// CSV file loaded at startup; synthetic history is generated when unset
    pub path: Option<PathBuf>,
    pub synthetic_days: u32,
    pub synthetic_seed: Option<u64>,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            path: None,
            synthetic_days: 30,
            synthetic_seed: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
    /// `EnvFilter` directives used when `RUST_LOG` is unset
    pub filter: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::from_figment(
            Figment::from(Serialized::defaults(Config::default()))
                .merge(Toml::file("config/default.toml"))
                .merge(Env::prefixed("GHI__").split("__")),
        )
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let cfg: Config = figment.extract()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.server.port != 0, "server.port must be non-zero");

        let f = &self.forecast;
        ensure!(
            (0.0..=MAX_CONFIDENCE).contains(&f.confidence_floor),
            "forecast.confidence_floor must be within [0, {MAX_CONFIDENCE}], got {}",
            f.confidence_floor
        );
        ensure!(
            f.confidence_decay_rate.is_finite() && f.confidence_decay_rate >= 0.0,
            "forecast.confidence_decay_rate must be a non-negative number"
        );
        ensure!(
            f.noise_std_dev.is_finite() && f.noise_std_dev >= 0.0,
            "forecast.noise_std_dev must be a non-negative number"
        );
        ensure!(
            f.horizon_hours <= f.max_horizon_hours,
            "forecast.horizon_hours ({}) exceeds forecast.max_horizon_hours ({})",
            f.horizon_hours,
            f.max_horizon_hours
        );
        ensure!(
            self.history.synthetic_days > 0,
            "history.synthetic_days must be at least 1"
        );
        Ok(())
    }
}
