//! Render configuration.
//!
//! Names the markup the pipeline looks for. Defaults follow the Distill
//! template; a JSON file may override any subset of fields.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading a configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    JsonError(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct RenderConfig {
    /// Tag of inline citation markers; their `key` attribute lists keys.
    pub cite_tag: String,
    /// Tag of the bibliography placeholder.
    pub bibliography_tag: String,
    /// Selector of script blocks holding BibTeX.
    pub bibliography_script: String,
    /// Attribute set on `<body>` once the render pipeline has run.
    pub prerendered_attribute: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            cite_tag: "dt-cite".to_string(),
            bibliography_tag: "dt-bibliography".to_string(),
            bibliography_script: r#"script[type="text/bibliography"]"#.to_string(),
            prerendered_attribute: "distill-prerendered".to_string(),
        }
    }
}

impl RenderConfig {
    /// Loads a configuration from a JSON file; missing fields keep their
    /// defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: RenderConfig = serde_json::from_str(r#"{"cite-tag": "d-cite"}"#).unwrap();

        assert_eq!(config.cite_tag, "d-cite");
        assert_eq!(config.bibliography_tag, "dt-bibliography");
        assert_eq!(config.prerendered_attribute, "distill-prerendered");
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let result: Result<RenderConfig, _> = serde_json::from_str(r#"{"cite_tag": "x"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = RenderConfig::load(Path::new("/nonexistent/config.json")).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
