//! Core data models for translation and detection

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

/// Outcome of a translation call.
///
/// Either `success` with `translated_text`, or a failure carrying `error`
/// and, for chunked translations, the prefix translated before the failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TranslationResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translated_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunks_processed: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_time_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partial_result: Option<String>,
    /// Set when an untabulated pair was routed through the pivot model
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub pivot_fallback: bool,
}

impl TranslationResult {
    /// Successful translation
    pub fn translated(text: impl Into<String>) -> Self {
        Self {
            success: true,
            translated_text: Some(text.into()),
            chunks_processed: None,
            execution_time_ms: None,
            error: None,
            partial_result: None,
            pivot_fallback: false,
        }
    }

    /// Failure without any translated output
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            translated_text: None,
            chunks_processed: None,
            execution_time_ms: None,
            error: Some(error.into()),
            partial_result: None,
            pivot_fallback: false,
        }
    }

    /// Failure that keeps the chunks translated so far
    pub fn partial(error: impl Into<String>, partial_result: impl Into<String>) -> Self {
        Self {
            partial_result: Some(partial_result.into()),
            ..Self::failed(error)
        }
    }

    pub fn with_chunks(mut self, chunks_processed: usize, execution_time_ms: u64) -> Self {
        self.chunks_processed = Some(chunks_processed);
        self.execution_time_ms = Some(execution_time_ms);
        self
    }

    pub fn with_pivot_fallback(mut self, pivot_fallback: bool) -> Self {
        self.pivot_fallback = pivot_fallback;
        self
    }
}

/// Supported language listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SupportedLanguagesResponse {
    pub languages: BTreeMap<String, String>,
    pub total_languages: usize,
}

/// One entry of a language-ID model response
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LanguageLabel {
    pub label: String,
    pub score: f64,
}

/// Generation parameters sent with summarization requests
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SummaryParams {
    pub max_length: u32,
    pub min_length: u32,
    pub do_sample: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_json_diff::assert_json_eq;
    use serde_json::json;

    #[test]
    fn test_success_serialization_omits_failure_fields() {
        let result = TranslationResult::translated("hola mundo").with_chunks(2, 15);
        assert_json_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({
                "success": true,
                "translatedText": "hola mundo",
                "chunksProcessed": 2,
                "executionTimeMs": 15
            })
        );
    }

    #[test]
    fn test_partial_failure_serialization() {
        let result = TranslationResult::partial("Error processing chunk 2: boom", "uno");
        assert_json_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({
                "success": false,
                "error": "Error processing chunk 2: boom",
                "partialResult": "uno"
            })
        );
    }

    #[test]
    fn test_pivot_flag_serialized_only_when_set() {
        let result = TranslationResult::translated("hello").with_pivot_fallback(true);
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["pivotFallback"], json!(true));
    }
}
