//! Remote inference client

use async_trait::async_trait;
use serde_json::Value;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::core::config::ServiceConfig;
use crate::core::errors::{Result, ServiceError};

/// Minimal contract with a hosted model provider.
///
/// Implementations send `inputs` (and optional generation `parameters`) to
/// `model_id` and hand back the decoded JSON body untouched; interpreting the
/// payload is left to the caller.
#[async_trait]
pub trait InferenceBackend: Send + Sync + Debug {
    async fn invoke_model(
        &self,
        model_id: &str,
        inputs: &str,
        parameters: Option<Value>,
    ) -> Result<Value>;
}

/// Hugging Face style inference API client
#[derive(Debug, Clone)]
pub struct HfInferenceClient {
    client: reqwest::Client,
    config: Arc<ServiceConfig>,
}

impl HfInferenceClient {
    /// Create a new inference client
    pub fn new(config: Arc<ServiceConfig>) -> Result<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .pool_idle_timeout(Some(Duration::from_secs(30)))
            .pool_max_idle_per_host(10)
            .build()?;

        Ok(Self { client, config })
    }

    /// Create from environment
    pub fn from_env() -> Result<Self> {
        let config = ServiceConfig::load()?;
        Self::new(Arc::new(config))
    }

    fn model_url(&self, model_id: &str) -> String {
        format!("{}/{}", self.config.api_base_url.trim_end_matches('/'), model_id)
    }
}

#[async_trait]
impl InferenceBackend for HfInferenceClient {
    async fn invoke_model(
        &self,
        model_id: &str,
        inputs: &str,
        parameters: Option<Value>,
    ) -> Result<Value> {
        let url = self.model_url(model_id);
        debug!("Invoking model {} ({} chars)", model_id, inputs.chars().count());

        let body = serde_json::json!({
            "inputs": inputs,
            "parameters": parameters.unwrap_or_else(|| serde_json::json!({})),
        });

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ServiceError::TimeoutError
                } else {
                    ServiceError::NetworkError {
                        message: e.to_string(),
                    }
                }
            })?;

        let status = response.status();

        if !status.is_success() {
            let status_code = status.as_u16();
            let error_text = response.text().await.unwrap_or_default();
            warn!("Model {} answered {}: {}", model_id, status_code, error_text);

            if status_code == 429 {
                return Err(ServiceError::RateLimitError {
                    model: model_id.to_string(),
                });
            }

            return Err(ServiceError::ApiError {
                status: status_code,
                message: error_text,
            });
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| ServiceError::InvalidResponseError {
                message: e.to_string(),
            })?;

        if let Some(message) = json.get("error").and_then(Value::as_str) {
            return Err(ServiceError::ApiError {
                status: status.as_u16(),
                message: message.to_string(),
            });
        }

        debug!("Model {} responded", model_id);
        Ok(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> ServiceConfig {
        ServiceConfig {
            api_key: "test_key".to_string(),
            api_base_url: "https://test.com/models/".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_client_creation() {
        let client = HfInferenceClient::new(Arc::new(test_config()));
        tokio_test::assert_ok!(client);
    }

    #[test]
    fn test_client_rejects_invalid_config() {
        let config = ServiceConfig {
            api_key: String::new(),
            ..test_config()
        };
        tokio_test::assert_err!(HfInferenceClient::new(Arc::new(config)));
    }

    #[test]
    fn test_model_url_joins_base_and_model() {
        let client = HfInferenceClient::new(Arc::new(test_config())).unwrap();
        assert_eq!(
            client.model_url("Helsinki-NLP/opus-mt-en-es"),
            "https://test.com/models/Helsinki-NLP/opus-mt-en-es"
        );
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        let config = ServiceConfig {
            api_base_url: "http://127.0.0.1:9".to_string(),
            timeout_ms: 2000,
            ..test_config()
        };
        let client = HfInferenceClient::new(Arc::new(config)).unwrap();

        let err = client.invoke_model("any/model", "hello", None).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::NetworkError { .. } | ServiceError::TimeoutError
        ));
    }
}
