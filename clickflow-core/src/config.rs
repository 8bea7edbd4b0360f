use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level Clickflow configuration, matching `.clickflow/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClickflowConfig {
    #[serde(default)]
    pub clickflow: ClickflowSection,
    #[serde(default)]
    pub graph: GraphSection,
    #[serde(default)]
    pub store: StoreSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClickflowSection {
    pub version: String,
}

impl Default for ClickflowSection {
    fn default() -> Self {
        Self {
            version: "0.2.0".to_string(),
        }
    }
}

/// Layout spacing for the flow graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphSection {
    pub x_step: f64,
    pub y_step: f64,
}

impl Default for GraphSection {
    fn default() -> Self {
        Self {
            x_step: clickflow_graphs::flow::DEFAULT_X_STEP,
            y_step: clickflow_graphs::flow::DEFAULT_Y_STEP,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSection {
    /// Maximum visits returned per query, newest first.
    pub fetch_limit: u32,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self { fetch_limit: 1000 }
    }
}

impl ClickflowConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Parse(e.to_string()))?;
        let config: Self = toml::from_str(&text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Render the configuration as TOML, e.g. for `init` to write out.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.graph.x_step <= 0.0 || self.graph.y_step <= 0.0 {
            return Err(ConfigError::Invalid(
                "graph spacing must be positive".to_string(),
            ));
        }
        if self.store.fetch_limit == 0 {
            return Err(ConfigError::Invalid(
                "store.fetch_limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ClickflowConfig::default();
        assert!(config.validate().is_ok());
        assert!((config.graph.x_step - 250.0).abs() < f64::EPSILON);
        assert!((config.graph.y_step - 180.0).abs() < f64::EPSILON);
        assert_eq!(config.store.fetch_limit, 1000);
    }

    #[test]
    fn toml_round_trip() {
        let config = ClickflowConfig::default();
        let text = config.to_toml().unwrap();
        let back: ClickflowConfig = toml::from_str(&text).unwrap();
        assert_eq!(back.store.fetch_limit, config.store.fetch_limit);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let back: ClickflowConfig = toml::from_str("[graph]\nx_step = 300.0\ny_step = 200.0\n")
            .unwrap();
        assert!((back.graph.x_step - 300.0).abs() < f64::EPSILON);
        assert_eq!(back.store.fetch_limit, 1000);
    }

    #[test]
    fn zero_fetch_limit_rejected() {
        let config: ClickflowConfig = toml::from_str("[store]\nfetch_limit = 0\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = ClickflowConfig::load(Path::new("/nonexistent/config.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }
}
