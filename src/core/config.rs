//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Hosted inference endpoint used when `HF_API_URL` is unset
pub const DEFAULT_API_BASE_URL: &str = "https://api-inference.huggingface.co/models";

/// Language identification model
pub const DEFAULT_DETECTION_MODEL: &str = "facebook/fasttext-language-identification";

/// Summarization models, tried in order
const DEFAULT_SUMMARY_MODELS: &[&str] = &["facebook/bart-large-cnn"];

/// Configuration shared by every service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub api_key: String,
    pub api_base_url: String,
    pub timeout_ms: u64,
    pub max_chunk_length: usize,
    pub chunk_delay_ms: u64,
    pub detection_model: String,
    pub detection_max_chars: usize,
    pub summary_models: Vec<String>,
    pub summary_chunk_length: usize,
    pub summary_max_length: u32,
    pub summary_min_length: u32,
    pub max_upload_bytes: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            api_key: std::env::var("HUGGINGFACE_API_KEY").unwrap_or_default(),
            api_base_url: std::env::var("HF_API_URL")
                .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string()),
            timeout_ms: 30000,
            max_chunk_length: 450,
            chunk_delay_ms: 100,
            detection_model: DEFAULT_DETECTION_MODEL.to_string(),
            detection_max_chars: 500,
            summary_models: DEFAULT_SUMMARY_MODELS.iter().map(|m| m.to_string()).collect(),
            summary_chunk_length: 1000,
            summary_max_length: 250,
            summary_min_length: 200,
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

impl ServiceConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        let api_key = std::env::var("HUGGINGFACE_API_KEY")
            .map_err(|_| anyhow::anyhow!("HUGGINGFACE_API_KEY environment variable is required"))?;

        let api_base_url = std::env::var("HF_API_URL")
            .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string());

        let timeout_ms = std::env::var("REQUEST_TIMEOUT_MS")
            .unwrap_or_else(|_| "30000".to_string())
            .parse::<u64>()?;

        let max_chunk_length = std::env::var("MAX_CHUNK_LENGTH")
            .unwrap_or_else(|_| "450".to_string())
            .parse::<usize>()?;

        let chunk_delay_ms = std::env::var("CHUNK_DELAY_MS")
            .unwrap_or_else(|_| "100".to_string())
            .parse::<u64>()?;

        let detection_model = std::env::var("LANGUAGE_DETECTION_MODEL")
            .unwrap_or_else(|_| DEFAULT_DETECTION_MODEL.to_string());

        let summary_models = match std::env::var("SUMMARY_MODELS") {
            Ok(list) => list
                .split(',')
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(str::to_string)
                .collect(),
            Err(_) => DEFAULT_SUMMARY_MODELS.iter().map(|m| m.to_string()).collect(),
        };

        let max_upload_bytes = std::env::var("MAX_UPLOAD_BYTES")
            .unwrap_or_else(|_| (10 * 1024 * 1024).to_string())
            .parse::<usize>()?;

        Ok(Self {
            api_key,
            api_base_url,
            timeout_ms,
            max_chunk_length,
            chunk_delay_ms,
            detection_model,
            summary_models,
            max_upload_bytes,
            ..Self::default()
        })
    }

    /// Load configuration from the environment and validate it
    pub fn load() -> anyhow::Result<Self> {
        let config = Self::from_env()?;
        config.validate()?;

        info!(
            "Loaded configuration: chunk length {}, chunk delay {}ms, {} summary model(s)",
            config.max_chunk_length,
            config.chunk_delay_ms,
            config.summary_models.len()
        );

        Ok(config)
    }

    /// Load from JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_key.is_empty() {
            return Err(anyhow::anyhow!("API key is required"));
        }

        if self.api_base_url.is_empty() {
            return Err(anyhow::anyhow!("API base URL is required"));
        }

        if self.max_chunk_length == 0 {
            return Err(anyhow::anyhow!("max_chunk_length must be greater than 0"));
        }

        if self.summary_chunk_length == 0 {
            return Err(anyhow::anyhow!("summary_chunk_length must be greater than 0"));
        }

        if self.summary_models.is_empty() {
            return Err(anyhow::anyhow!("At least one summary model is required"));
        }

        Ok(())
    }

    /// Request timeout for the inference client
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Pause between consecutive chunk translations
    pub fn chunk_delay(&self) -> Duration {
        Duration::from_millis(self.chunk_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> ServiceConfig {
        ServiceConfig {
            api_key: "test_key".to_string(),
            api_base_url: "https://test.com/models".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_config_validation() {
        assert!(test_config().validate().is_ok());
    }

    #[test]
    fn test_config_validation_missing_key() {
        let config = ServiceConfig {
            api_key: "".to_string(),
            ..test_config()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_zero_chunk_length() {
        let config = ServiceConfig {
            max_chunk_length: 0,
            ..test_config()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_defaults_match_pipeline_constants() {
        let config = test_config();
        assert_eq!(config.max_chunk_length, 450);
        assert_eq!(config.chunk_delay(), Duration::from_millis(100));
        assert_eq!(config.detection_max_chars, 500);
        assert_eq!(config.summary_models, vec!["facebook/bart-large-cnn".to_string()]);
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = test_config();
        config.chunk_delay_ms = 0;
        config.to_file(&path).unwrap();

        let loaded = ServiceConfig::from_file(&path).unwrap();
        assert_eq!(loaded.api_key, "test_key");
        assert_eq!(loaded.chunk_delay_ms, 0);
        assert!(loaded.validate().is_ok());
    }
}
