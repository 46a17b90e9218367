use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Where the access credential lives. We differentiate backends via a
/// "type" tag in the YAML.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
#[serde(tag = "type")]
pub enum StoreConfig {
    /// The HTTP client's cookie jar, with an optional cached-user file.
    #[serde(rename = "jar")]
    Jar(JarStoreConfig),
    #[serde(rename = "memory")]
    Memory,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::Jar(JarStoreConfig::default())
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct JarStoreConfig {
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// JSON file holding the legacy `user` entry.
    #[serde(default)]
    pub user_cache_path: Option<PathBuf>,
}

impl Default for JarStoreConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            user_cache_path: None,
        }
    }
}

fn default_cookie_name() -> String {
    "access".to_string()
}
