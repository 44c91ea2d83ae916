use std::path::PathBuf;

use chrono::Duration;
use serde::Deserialize;

use crate::models::TemperatureBounds;
use crate::services::sessions::{SessionStore, DEFAULT_MAX_SESSIONS, DEFAULT_SESSION_TTL_SECS};

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Catalog table (.csv, .xlsx, .xls or .ods)
    #[serde(default = "default_catalog_path")]
    pub catalog_path: PathBuf,

    /// Directory holding the images named by the catalog
    #[serde(default = "default_image_dir")]
    pub image_dir: PathBuf,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Fixed seed for the recommendation sampler; unset means a fresh thread RNG
    #[serde(default)]
    pub random_seed: Option<u64>,

    /// Lowest temperature the wizard slider accepts
    #[serde(default = "default_temp_min")]
    pub temp_min: i32,

    /// Highest temperature the wizard slider accepts
    #[serde(default = "default_temp_max")]
    pub temp_max: i32,

    /// Slider position for a fresh session
    #[serde(default = "default_temperature")]
    pub default_temperature: i32,

    /// Seconds a wizard session may sit unchanged before it is discarded
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,

    /// Upper limit on live wizard sessions
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from("image_db.xlsx")
}

fn default_image_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_temp_min() -> i32 {
    TemperatureBounds::default().min
}

fn default_temp_max() -> i32 {
    TemperatureBounds::default().max
}

fn default_temperature() -> i32 {
    TemperatureBounds::default().default
}

fn default_session_ttl_secs() -> u64 {
    DEFAULT_SESSION_TTL_SECS
}

fn default_max_sessions() -> usize {
    DEFAULT_MAX_SESSIONS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_path: default_catalog_path(),
            image_dir: default_image_dir(),
            host: default_host(),
            port: default_port(),
            random_seed: None,
            temp_min: default_temp_min(),
            temp_max: default_temp_max(),
            default_temperature: default_temperature(),
            session_ttl_secs: default_session_ttl_secs(),
            max_sessions: default_max_sessions(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    /// Load configuration from explicit key/value pairs
    pub fn from_vars<I>(vars: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config = envy::from_iter::<_, Config>(vars)
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
        config.temperature_bounds()?;
        config.session_store()?;
        Ok(config)
    }

    /// Slider bounds, validated
    pub fn temperature_bounds(&self) -> anyhow::Result<TemperatureBounds> {
        TemperatureBounds::new(self.temp_min, self.temp_max, self.default_temperature)
            .map_err(|e| anyhow::anyhow!("Invalid temperature settings: {}", e))
    }

    /// Empty session store with the configured expiry and cap, validated
    pub fn session_store(&self) -> anyhow::Result<SessionStore> {
        if self.max_sessions == 0 {
            anyhow::bail!("Invalid session settings: MAX_SESSIONS must be at least 1");
        }
        let ttl = i64::try_from(self.session_ttl_secs)
            .ok()
            .filter(|secs| *secs > 0)
            .and_then(Duration::try_seconds)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Invalid session settings: SESSION_TTL_SECS {} is out of range",
                    self.session_ttl_secs
                )
            })?;
        Ok(SessionStore::new(ttl, self.max_sessions))
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
