//! Document summarization over hosted models

use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

use crate::core::chunker::{collapse_whitespace, split_by_length};
use crate::core::client::InferenceBackend;
use crate::core::config::ServiceConfig;
use crate::core::errors::{Result, ServiceError};
use crate::core::models::SummaryParams;

/// Summarizes documents piecewise, trying each configured model in turn
#[derive(Debug, Clone)]
pub struct Summarizer {
    backend: Arc<dyn InferenceBackend>,
    models: Vec<String>,
    chunk_length: usize,
    params: SummaryParams,
}

impl Summarizer {
    pub fn new(
        backend: Arc<dyn InferenceBackend>,
        models: Vec<String>,
        chunk_length: usize,
        params: SummaryParams,
    ) -> Self {
        Self {
            backend,
            models,
            chunk_length,
            params,
        }
    }

    pub fn from_config(backend: Arc<dyn InferenceBackend>, config: &ServiceConfig) -> Self {
        Self::new(
            backend,
            config.summary_models.clone(),
            config.summary_chunk_length,
            SummaryParams {
                max_length: config.summary_max_length,
                min_length: config.summary_min_length,
                do_sample: false,
            },
        )
    }

    /// Summarize a whole document, piece by piece, in order
    pub async fn summarize_document(&self, text: &str) -> Result<String> {
        let clean = collapse_whitespace(text);
        if clean.is_empty() {
            return Err(ServiceError::validation(
                "Text has no content to summarize",
            ));
        }

        let pieces = split_by_length(&clean, self.chunk_length);
        info!("Summarizing {} piece(s)", pieces.len());

        let mut summaries = Vec::with_capacity(pieces.len());
        for piece in &pieces {
            summaries.push(self.summarize_text(piece).await?);
        }

        Ok(summaries.join(" ").trim().to_string())
    }

    /// Summarize one piece of text with the first model that answers
    pub async fn summarize_text(&self, text: &str) -> Result<String> {
        let parameters = serde_json::to_value(self.params)?;
        let mut last_error = None;

        for model in &self.models {
            match self
                .backend
                .invoke_model(model, text, Some(parameters.clone()))
                .await
            {
                Ok(response) => return Ok(extract_summary(&response)),
                Err(e) => {
                    warn!("Summary model {} failed: {}", model, e);
                    last_error = Some(e);
                }
            }
        }

        Err(match last_error {
            Some(e) => ServiceError::ApiError {
                status: 502,
                message: format!("All summary models failed. Last error: {}", e),
            },
            None => ServiceError::ConfigError {
                message: "No summary models configured".to_string(),
            },
        })
    }
}

/// Summary text from the shapes summarization models return
fn extract_summary(response: &Value) -> String {
    let entry = match response {
        Value::Array(items) if !items.is_empty() => &items[0],
        other => other,
    };

    if let Value::String(s) = entry {
        return s.clone();
    }

    entry
        .get("summary_text")
        .or_else(|| entry.get("generated_text"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| entry.to_string())
}
