use crate::error::ConfigError;
use crate::global_variables::{DATA_PATH, METADATA_PATH, MODEL_PATH};
use std::env;
use std::path::PathBuf;

pub const ENV_ROUTING_KEY: &str = "ORS_API_KEY";
pub const ENV_WEATHER_KEY: &str = "OPENWEATHER_API_KEY";
pub const ENV_DATA_PATH: &str = "SMART_ROUTE_DATA";
pub const ENV_MODEL_PATH: &str = "SMART_ROUTE_MODEL";
pub const ENV_METADATA_PATH: &str = "SMART_ROUTE_METADATA";

/// Runtime configuration. Paths default to `global_variables`, keys come
/// from the environment only.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_path: PathBuf,
    pub model_path: PathBuf,
    pub metadata_path: PathBuf,
    pub routing_api_key: Option<String>,
    pub weather_api_key: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DATA_PATH),
            model_path: PathBuf::from(MODEL_PATH),
            metadata_path: PathBuf::from(METADATA_PATH),
            routing_api_key: None,
            weather_api_key: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();
        Self {
            data_path: get(ENV_DATA_PATH).map_or(defaults.data_path, PathBuf::from),
            model_path: get(ENV_MODEL_PATH).map_or(defaults.model_path, PathBuf::from),
            metadata_path: get(ENV_METADATA_PATH).map_or(defaults.metadata_path, PathBuf::from),
            routing_api_key: get(ENV_ROUTING_KEY),
            weather_api_key: get(ENV_WEATHER_KEY),
        }
    }

    pub fn require_routing_key(&self) -> Result<&str, ConfigError> {
        self.routing_api_key
            .as_deref()
            .ok_or(ConfigError::MissingVar(ENV_ROUTING_KEY))
    }
}
