//! Configuration management
//!
//! Handles loading of the JSON launcher configuration with environment
//! variable overrides for the backend location.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

use crate::client::{ClientConfig, DEFAULT_BASE_URL};
use crate::controller::VariantController;
use crate::types::OrderConfiguration;

pub const DEFAULT_CONFIG_PATH: &str = "launcher.json";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LauncherConfig {
    #[serde(default)]
    pub api: ApiConfig,
    /// Preset order configuration seeding the controller
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<OrderConfiguration>,
}

impl LauncherConfig {
    /// Load configuration from a JSON file and apply environment overrides
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: LauncherConfig =
            serde_json::from_str(&contents).context("Failed to parse config JSON")?;

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load from `path`; a missing file at the default path falls back to
    /// built-in defaults.
    pub fn load(path: &str) -> Result<Self> {
        if path == DEFAULT_CONFIG_PATH && !Path::new(path).exists() {
            debug!("No {} found, using defaults", DEFAULT_CONFIG_PATH);
            let mut config = LauncherConfig::default();
            config.apply_env_overrides(|key| std::env::var(key).ok())?;
            return Ok(config);
        }
        Self::from_file(path)
    }

    /// Apply `STRATEGY_API_URL` and `STRATEGY_API_TIMEOUT_SECS`
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("STRATEGY_API_URL") {
            debug!("Backend URL overridden from environment: {}", url);
            self.api.base_url = url;
        }
        if let Some(raw) = lookup("STRATEGY_API_TIMEOUT_SECS") {
            self.api.timeout_secs = raw
                .trim()
                .parse()
                .with_context(|| format!("Invalid STRATEGY_API_TIMEOUT_SECS '{}'", raw))?;
        }
        if self.api.timeout_secs == 0 {
            warn!("Backend timeout of 0s requested, using 1s");
            self.api.timeout_secs = 1;
        }
        Ok(())
    }

    /// Controller seeded with the preset order, if any
    pub fn controller(&self) -> VariantController {
        match &self.order {
            Some(preset) => VariantController::from_preset(preset.clone()),
            None => VariantController::new(),
        }
    }
}

/// Strategy backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

impl ApiConfig {
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::default().with_timeout(Duration::from_secs(self.timeout_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OrderVariant;
    use std::collections::HashMap;

    #[test]
    fn test_empty_object_uses_defaults() {
        let config: LauncherConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.api.timeout_secs, 30);
        assert!(config.order.is_none());
        assert_eq!(config.controller().active_variant(), None);
    }

    #[test]
    fn test_preset_order_seeds_controller() {
        let raw = r#"{
            "api": { "base_url": "http://backend:9000", "timeout_secs": 10 },
            "order": {
                "orderType": "market",
                "symbol": "TSLA",
                "sentimentTimeToConsiderDays": 2,
                "sentimentConfidenceThreshold": 0.95
            }
        }"#;
        let config: LauncherConfig = serde_json::from_str(raw).unwrap();

        assert_eq!(config.api.base_url, "http://backend:9000");
        assert_eq!(
            config.api.client_config().timeout,
            Duration::from_secs(10)
        );

        let controller = config.controller();
        assert_eq!(controller.active_variant(), Some(OrderVariant::Market));
        assert_eq!(controller.active_configuration().unwrap().symbol(), "TSLA");
    }

    #[test]
    fn test_mis_tagged_preset_fails_to_load() {
        let raw = r#"{
            "order": {
                "orderType": "market",
                "symbol": "TSLA",
                "sentimentTimeToConsiderDays": 2,
                "sentimentConfidenceThreshold": 0.95,
                "buyLimitMultiplier": -5,
                "limitOrderExpiry": "day"
            }
        }"#;
        let err = serde_json::from_str::<LauncherConfig>(raw).unwrap_err();
        assert!(err.to_string().contains("buyLimitMultiplier"));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("STRATEGY_API_URL", "http://10.0.0.5:8000"),
            ("STRATEGY_API_TIMEOUT_SECS", "5"),
        ]
        .into_iter()
        .collect();

        let mut config = LauncherConfig::default();
        config
            .apply_env_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.api.base_url, "http://10.0.0.5:8000");
        assert_eq!(config.api.timeout_secs, 5);
    }

    #[test]
    fn test_invalid_timeout_override_is_an_error() {
        let mut config = LauncherConfig::default();
        let result = config.apply_env_overrides(|key| {
            (key == "STRATEGY_API_TIMEOUT_SECS").then(|| "soon".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        assert!(LauncherConfig::load("does/not/exist.json").is_err());
    }
}
