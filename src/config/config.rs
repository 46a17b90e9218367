use std::time::Duration;

use figment::providers::{Env, Format, Yaml};
use figment::Figment;
use reqwest::Url;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};

use super::logging::LoggingConfig;
use super::store::StoreConfig;
use crate::error::SessionError;

pub const CONFIG_PATH_ENV: &str = "KINDERGATE_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "./kindergate.yaml";

/// A top-level enum for versioned configurations.
#[derive(Deserialize, Serialize, JsonSchema)]
#[serde(tag = "version")]
pub enum Config {
    #[serde(rename = "1.0.0")]
    ConfigV1(ConfigV1),
}

/// Main config for v1.0.0.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct ConfigV1 {
    pub api: ApiConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub poller: PollerConfig,
    #[serde(default)]
    pub token_wait: TokenWaitConfig,
    #[serde(default)]
    pub routes: RoutesConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// The REST backend.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct ApiConfig {
    /// Base URL including the `/api/v1` prefix.
    pub base_url: String,
    #[serde(default = "default_timeout_in_ms")]
    pub timeout_in_ms: u64,
}

impl ApiConfig {
    /// Base URL normalized with a trailing slash so endpoint paths join under it.
    pub fn base_url(&self) -> Result<Url, SessionError> {
        let mut raw = self.base_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        Url::parse(&raw).map_err(|e| SessionError::Config(format!("api.base_url '{}': {}", self.base_url, e)))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_in_ms)
    }
}

fn default_timeout_in_ms() -> u64 {
    10_000
}

#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct PollerConfig {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Refresh proactively once the token has less than this left.
    #[serde(default = "default_threshold_secs")]
    pub threshold_secs: u64,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            threshold_secs: default_threshold_secs(),
        }
    }
}

fn default_interval_secs() -> u64 {
    60
}

fn default_threshold_secs() -> u64 {
    300
}

/// Bounds the post-login wait for the access cookie to become readable.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct TokenWaitConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
}

impl Default for TokenWaitConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delay_ms: default_delay_ms(),
        }
    }
}

fn default_max_attempts() -> u32 {
    5
}

fn default_delay_ms() -> u64 {
    100
}

/// Targets reported to the navigation listener.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct RoutesConfig {
    #[serde(default = "default_login_path")]
    pub login_path: String,
    #[serde(default = "default_unauthorized_path")]
    pub unauthorized_path: String,
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            login_path: default_login_path(),
            unauthorized_path: default_unauthorized_path(),
        }
    }
}

fn default_login_path() -> String {
    "/login".to_string()
}

fn default_unauthorized_path() -> String {
    "/unauthorized".to_string()
}

fn extract(figment: Figment) -> Result<ConfigV1, SessionError> {
    match figment.extract::<Config>()? {
        Config::ConfigV1(c) => Ok(c),
    }
    // handle configuration migration between versions here when necessary
}

/// Load config from the YAML file named by `KINDERGATE_CONFIG` (default
/// `./kindergate.yaml`), with `KINDERGATE_` environment overrides, e.g.
/// `KINDERGATE_API__BASE_URL`.
pub fn load_config() -> Result<ConfigV1, SessionError> {
    let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let figment = Figment::new()
        .merge(Yaml::file(path))
        .merge(Env::prefixed("KINDERGATE_").ignore(&["CONFIG"]).split("__"));
    extract(figment)
}

pub fn load_config_from_str(yaml: &str) -> Result<ConfigV1, SessionError> {
    extract(Figment::new().merge(Yaml::string(yaml)))
}

/// Print the JSON schema for the configuration to stdout.
pub fn print_schema() -> Result<(), SessionError> {
    let schema = schema_for!(Config);
    let rendered =
        serde_json::to_string_pretty(&schema).map_err(|e| SessionError::Config(e.to_string()))?;
    println!("{}", rendered);
    Ok(())
}
