//! Engine configuration loaded from YAML.

use crate::component::Properties;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Server URL given to every new request. Steps may override it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// HTTP client timeout in seconds (default: 30)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Root for `file://` schema sources (default: current directory)
    #[serde(default = "default_working_dir")]
    pub working_dir: PathBuf,

    /// Headers set on every new request.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub default_headers: BTreeMap<String, String>,

    /// Free-form values exposed as `{{Properties.current.<dotted.key>}}`.
    #[serde(default, skip_serializing_if = "serde_yaml::Mapping::is_empty")]
    pub properties: serde_yaml::Mapping,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_working_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: default_timeout_secs(),
            working_dir: default_working_dir(),
            default_headers: BTreeMap::new(),
            properties: serde_yaml::Mapping::new(),
        }
    }
}

impl EngineConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: EngineConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.timeout_secs == 0 {
            anyhow::bail!("'timeout_secs' must be greater than zero");
        }

        if let Some(ref base_url) = self.base_url {
            let url = reqwest::Url::parse(base_url)
                .with_context(|| format!("Invalid 'base_url': '{base_url}'"))?;
            if !matches!(url.scheme(), "http" | "https") {
                anyhow::bail!(
                    "Unsupported 'base_url' scheme: '{}'. Currently supported: http, https",
                    url.scheme()
                );
            }
        }

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The `properties` mapping as a component.
    pub fn properties(&self) -> Properties {
        Properties::from_yaml(&self.properties)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config: EngineConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.working_dir, PathBuf::from("."));
        assert!(config.base_url.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
base_url: http://localhost:8080
timeout_secs: 5
default_headers:
  accept: application/json
properties:
  api:
    token: s3cr3t
    version: 2
"#
        )
        .unwrap();

        let config = EngineConfig::from_file(file.path()).unwrap();
        assert_eq!(config.base_url.as_deref(), Some("http://localhost:8080"));
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.default_headers["accept"], "application/json");

        let properties = config.properties();
        assert_eq!(properties.get("api.token"), Some(&Value::from("s3cr3t")));
        assert_eq!(properties.get("api.version"), Some(&Value::Number(2.0)));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let zero: EngineConfig = serde_yaml::from_str("timeout_secs: 0").unwrap();
        assert!(zero.validate().is_err());

        let ftp: EngineConfig = serde_yaml::from_str("base_url: ftp://files.test").unwrap();
        let err = ftp.validate().unwrap_err();
        assert!(err.to_string().contains("ftp"));

        let garbage: EngineConfig = serde_yaml::from_str("base_url: not a url").unwrap();
        assert!(garbage.validate().is_err());
    }

    #[test]
    fn test_missing_file_is_reported() {
        let err = EngineConfig::from_file("/nonexistent/assay.yaml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
