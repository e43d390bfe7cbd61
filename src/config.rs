use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

pub const CONFIG_ENV_VAR: &str = "COMPLIANCE_UPLOADER_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "compliance-uploader.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct UploaderConfig {
    pub accepted_file_types: Vec<String>,
    pub max_file_size_mb: u64,
    pub max_files: usize,
    pub upload_endpoint: String,
    /// Sent as the `type` form field alongside each file.
    pub document_type: String,
    pub api_base_url: String,
    pub request_timeout_secs: u64,
}

impl Default for UploaderConfig {
    fn default() -> Self {
        Self {
            accepted_file_types: [".pdf", ".csv", ".xlsx", ".json", ".txt"]
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            max_file_size_mb: 10,
            max_files: 5,
            upload_endpoint: "http://localhost:8000/api/v1/compliance/upload".to_string(),
            document_type: "compliance-document".to_string(),
            api_base_url: "http://localhost:8000".to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl UploaderConfig {
    /// Resolves the config file: `$COMPLIANCE_UPLOADER_CONFIG` if set (must
    /// exist), otherwise `compliance-uploader.toml` in the working directory
    /// if present, otherwise defaults.
    pub fn load() -> Result<Self, ConfigError> {
        if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
            return Self::load_from(PathBuf::from(path));
        }

        let fallback = Path::new(DEFAULT_CONFIG_FILE);
        if fallback.exists() {
            Self::load_from(fallback)
        } else {
            debug!("No config file found, using defaults");
            Ok(Self::default())
        }
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb.saturating_mul(1024 * 1024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_documented_values() {
        let config = UploaderConfig::default();
        assert_eq!(
            config.accepted_file_types,
            vec![".pdf", ".csv", ".xlsx", ".json", ".txt"]
        );
        assert_eq!(config.max_file_size_mb, 10);
        assert_eq!(config.max_files, 5);
        assert_eq!(config.max_file_size_bytes(), 10 * 1024 * 1024);
        assert!(config.upload_endpoint.ends_with("/api/v1/compliance/upload"));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_files = 8").unwrap();
        writeln!(file, "accepted_file_types = [\".pdf\"]").unwrap();

        let config = UploaderConfig::load_from(file.path()).unwrap();
        assert_eq!(config.max_files, 8);
        assert_eq!(config.accepted_file_types, vec![".pdf"]);
        assert_eq!(config.max_file_size_mb, 10);
        assert_eq!(config.document_type, "compliance-document");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_files = \"many\"").unwrap();

        let err = UploaderConfig::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = UploaderConfig::load_from("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
