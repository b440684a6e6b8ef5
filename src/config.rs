use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

use crate::classifier::{ClassifierConfig, ThresholdClassifier};
use crate::error::MapError;
use crate::geopoint::GeoPoint;
use crate::viewport::DEFAULT_CLICK_TOLERANCE;

pub const DEFAULT_API_BASE_URL: &str = "https://developer.nps.gov/api/v1";
pub const API_KEY_ENV: &str = "NPS_API_KEY";
pub const API_BASE_URL_ENV: &str = "NPS_API_BASE_URL";
const MAX_PAGE_SIZE: u32 = 500;

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_page_size() -> u32 {
    50
}

fn default_click_tolerance() -> f64 {
    DEFAULT_CLICK_TOLERANCE
}

fn default_center() -> GeoPoint {
    GeoPoint {
        latitude: 43.7696,
        longitude: 11.2558,
    }
}

fn default_zoom() -> u8 {
    12
}

/// Session configuration. Every field has a default, so `{}` is a valid config.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MapConfig {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Credential for the parks API. Never logged.
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_click_tolerance")]
    pub click_tolerance: f64,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default = "default_center")]
    pub center: GeoPoint,
    #[serde(default = "default_zoom")]
    pub zoom: u8,
    /// Free-form parameters for the dashboard, read with [`MapConfig::param`].
    #[serde(default)]
    pub params: HashMap<String, Value>,
}

impl Default for MapConfig {
    fn default() -> Self {
        MapConfig {
            api_base_url: default_api_base_url(),
            api_key: None,
            page_size: default_page_size(),
            click_tolerance: default_click_tolerance(),
            classifier: ClassifierConfig::default(),
            center: default_center(),
            zoom: default_zoom(),
            params: HashMap::new(),
        }
    }
}

impl MapConfig {
    /// Parses and validates a JSON config document.
    pub fn from_json_str(json: &str) -> Result<Self, MapError> {
        let config: MapConfig = serde_json::from_str(json).map_err(|e| {
            MapError::InvalidConfig(format!("Config is not valid JSON for MapConfig: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a JSON config file. See [`MapConfig::from_json_str`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, MapError> {
        let path = path.as_ref();
        log::debug!("Loading map config from {}", path.display());
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Applies `NPS_API_KEY` and `NPS_API_BASE_URL` from the environment when set.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                self.api_key = Some(key.trim().to_string());
            }
        }
        if let Ok(url) = std::env::var(API_BASE_URL_ENV) {
            if !url.trim().is_empty() {
                self.api_base_url = url.trim().to_string();
            }
        }
        self
    }

    pub fn validate(&self) -> Result<(), MapError> {
        self.validated_classifier().map(|_| ())
    }

    /// Validates the config and returns the classifier it describes.
    pub fn validated_classifier(&self) -> Result<ThresholdClassifier, MapError> {
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(MapError::InvalidConfig(format!(
                "pageSize must be between 1 and {}, got {}",
                MAX_PAGE_SIZE, self.page_size
            )));
        }
        if !self.click_tolerance.is_finite() || self.click_tolerance < 0.0 {
            return Err(MapError::InvalidConfig(format!(
                "clickTolerance must be a finite non-negative number, got {}",
                self.click_tolerance
            )));
        }
        if self.api_base_url.trim().is_empty() {
            return Err(MapError::InvalidConfig(
                "apiBaseUrl cannot be empty".to_string(),
            ));
        }
        GeoPoint::new(self.center.latitude, self.center.longitude)
            .map_err(|e| MapError::InvalidConfig(format!("center: {}", e)))?;
        self.build_classifier()
    }

    pub fn build_classifier(&self) -> Result<ThresholdClassifier, MapError> {
        ThresholdClassifier::from_config(&self.classifier)
    }

    /// The API key, or `MapError::MissingCredential` when none was configured.
    pub fn require_api_key(&self) -> Result<&str, MapError> {
        self.api_key.as_deref().ok_or_else(|| {
            MapError::MissingCredential(format!(
                "No parks API key: set apiKey in the config or {}",
                API_KEY_ENV
            ))
        })
    }

    /// Retrieves a parameter by name and attempts to deserialize it into the requested type.
    ///
    /// Returns `None` if the key is missing or has a different shape.
    pub fn param<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.params
            .get(key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }
}
