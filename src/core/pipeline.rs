//! Chunked translation pipeline
//!
//! Long text is cleaned, split on sentence boundaries and sent to the
//! translation model one chunk at a time. Chunks are never translated
//! concurrently: output order must follow input order and the fixed delay
//! between calls keeps the provider within its rate limits. The first failed
//! chunk stops the run and whatever was translated before it is returned as
//! a partial result.

use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::core::chunker::{clean_text, split_into_chunks, DEFAULT_MAX_CHUNK_LENGTH};
use crate::core::client::InferenceBackend;
use crate::core::config::ServiceConfig;
use crate::core::errors::{Result, ServiceError};
use crate::core::languages::SupportedLanguages;
use crate::core::model_selector::ModelSelector;
use crate::core::models::{SupportedLanguagesResponse, TranslationResult};

/// Chunking and pacing knobs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineSettings {
    pub max_chunk_length: usize,
    pub chunk_delay: Duration,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            max_chunk_length: DEFAULT_MAX_CHUNK_LENGTH,
            chunk_delay: Duration::from_millis(100),
        }
    }
}

impl From<&ServiceConfig> for PipelineSettings {
    fn from(config: &ServiceConfig) -> Self {
        Self {
            max_chunk_length: config.max_chunk_length,
            chunk_delay: config.chunk_delay(),
        }
    }
}

/// Translation service over a remote backend
#[derive(Debug, Clone)]
pub struct TranslationService {
    backend: Arc<dyn InferenceBackend>,
    languages: Arc<SupportedLanguages>,
    selector: Arc<ModelSelector>,
    settings: PipelineSettings,
}

impl TranslationService {
    pub fn new(
        backend: Arc<dyn InferenceBackend>,
        languages: Arc<SupportedLanguages>,
        selector: Arc<ModelSelector>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            backend,
            languages,
            selector,
            settings,
        }
    }

    /// Service with the built-in language and model tables
    pub fn with_defaults(backend: Arc<dyn InferenceBackend>, settings: PipelineSettings) -> Self {
        Self::new(
            backend,
            Arc::new(SupportedLanguages::default()),
            Arc::new(ModelSelector::default()),
            settings,
        )
    }

    pub fn get_supported_languages(&self) -> SupportedLanguagesResponse {
        self.languages.listing()
    }

    pub fn languages(&self) -> &SupportedLanguages {
        &self.languages
    }

    pub fn resolve_model(&self, source_lang: &str, target_lang: &str) -> &str {
        self.selector.resolve_model(source_lang, target_lang)
    }

    /// Pre-flight checks, run before any remote call
    fn validate(&self, text: &str, target_lang: &str) -> Result<()> {
        if text.trim().is_empty() || target_lang.trim().is_empty() {
            return Err(ServiceError::validation(
                "Text and target language are required",
            ));
        }

        if !self.languages.contains(target_lang) {
            return Err(ServiceError::UnsupportedLanguage {
                code: target_lang.to_string(),
            });
        }

        Ok(())
    }

    /// Translate text with a single remote call, without chunking
    pub async fn translate_text(
        &self,
        text: &str,
        target_lang: &str,
        source_lang: &str,
    ) -> TranslationResult {
        if let Err(e) = self.validate(text, target_lang) {
            return TranslationResult::failed(e.to_string());
        }

        let clean = clean_text(text);
        let selection = self.selector.select(source_lang, target_lang);
        self.warn_on_pivot(selection.pivot_fallback, source_lang, target_lang, selection.model_id);

        match self.translate_chunk(selection.model_id, &clean).await {
            Ok(translated) => TranslationResult::translated(translated)
                .with_pivot_fallback(selection.pivot_fallback),
            Err(e) => {
                warn!("Translation failed: {}", e);
                TranslationResult::failed(e.to_string())
            }
        }
    }

    /// Translate arbitrarily long text chunk by chunk, in order
    pub async fn translate_long_text(
        &self,
        text: &str,
        target_lang: &str,
        source_lang: &str,
    ) -> TranslationResult {
        let start_time = Instant::now();

        if let Err(e) = self.validate(text, target_lang) {
            return TranslationResult::failed(e.to_string());
        }

        let clean = clean_text(text);
        let chunks = split_into_chunks(&clean, self.settings.max_chunk_length);
        info!(
            "Translating {} chars in {} chunk(s) to {}",
            clean.chars().count(),
            chunks.len(),
            target_lang
        );

        let mut results: Vec<String> = Vec::with_capacity(chunks.len());
        let mut pivot_fallback = false;

        for (index, chunk) in chunks.iter().enumerate() {
            let selection = self.selector.select(source_lang, target_lang);
            if index == 0 {
                self.warn_on_pivot(selection.pivot_fallback, source_lang, target_lang, selection.model_id);
            }
            pivot_fallback |= selection.pivot_fallback;

            match self.translate_chunk(selection.model_id, chunk).await {
                Ok(translated) => {
                    debug!("Chunk {}/{} translated", index + 1, chunks.len());
                    results.push(translated);
                }
                Err(e) => {
                    warn!("Chunk {}/{} failed: {}", index + 1, chunks.len(), e);
                    return TranslationResult::partial(
                        format!("Error processing chunk {}: {}", index + 1, e),
                        results.join(" "),
                    )
                    .with_pivot_fallback(pivot_fallback);
                }
            }

            if index + 1 < chunks.len() && !self.settings.chunk_delay.is_zero() {
                sleep(self.settings.chunk_delay).await;
            }
        }

        let elapsed = start_time.elapsed();
        info!("Translated {} chunk(s) in {:?}", chunks.len(), elapsed);

        TranslationResult::translated(results.join(" "))
            .with_chunks(chunks.len(), elapsed.as_millis() as u64)
            .with_pivot_fallback(pivot_fallback)
    }

    async fn translate_chunk(&self, model_id: &str, chunk: &str) -> Result<String> {
        let response = self.backend.invoke_model(model_id, chunk, None).await?;
        parse_translation(&response)
    }

    fn warn_on_pivot(&self, pivot: bool, source_lang: &str, target_lang: &str, model_id: &str) {
        if pivot {
            warn!(
                "No model for {}-{}, using pivot model {}; output will not be in '{}'",
                source_lang, target_lang, model_id, target_lang
            );
        }
    }
}

/// Pull `translation_text` out of `[{..}]` or `{..}`
fn parse_translation(response: &Value) -> Result<String> {
    let entry = match response {
        Value::Array(items) => items.first(),
        other => Some(other),
    };

    entry
        .and_then(|e| e.get("translation_text"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ServiceError::InvalidResponseError {
            message: "No translation in response".to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::mock::{MockBackend, MockBehavior};
    use crate::core::model_selector::DEFAULT_MODEL;
    use serde_json::json;

    const THREE_SENTENCES: &str = "First sentence here. Second sentence here. Third sentence here.";

    fn settings(max_chunk_length: usize) -> PipelineSettings {
        PipelineSettings {
            max_chunk_length,
            chunk_delay: Duration::ZERO,
        }
    }

    fn service(backend: Arc<MockBackend>, max_chunk_length: usize) -> TranslationService {
        TranslationService::with_defaults(backend, settings(max_chunk_length))
    }

    #[tokio::test]
    async fn test_translate_long_text_in_order() {
        let backend = Arc::new(MockBackend::echo());
        let result = service(backend.clone(), 20)
            .translate_long_text(THREE_SENTENCES, "es", "en")
            .await;

        assert!(result.success);
        assert_eq!(
            result.translated_text.as_deref(),
            Some("<First sentence here.> <Second sentence here.> <Third sentence here.>")
        );
        assert_eq!(result.chunks_processed, Some(3));
        assert!(result.execution_time_ms.is_some());
        assert!(result.error.is_none());

        let calls = backend.calls();
        assert_eq!(calls.len(), 3);
        assert!(calls.iter().all(|c| c.model_id == "Helsinki-NLP/opus-mt-en-es"));
        assert_eq!(calls[1].inputs, "Second sentence here.");
    }

    #[tokio::test]
    async fn test_failed_chunk_keeps_partial_result() {
        let backend = Arc::new(MockBackend::new(MockBehavior::FailOnCall(2)));
        let result = service(backend.clone(), 20)
            .translate_long_text(THREE_SENTENCES, "es", "en")
            .await;

        assert!(!result.success);
        assert_eq!(result.partial_result.as_deref(), Some("<First sentence here.>"));
        assert!(result.chunks_processed.is_none());
        assert!(result.translated_text.is_none());
        assert!(result.error.unwrap().starts_with("Error processing chunk 2:"));
        assert_eq!(backend.call_count(), 2);
    }

    #[tokio::test]
    async fn test_first_chunk_failure_has_empty_partial() {
        let backend = Arc::new(MockBackend::failing());
        let result = service(backend, 450)
            .translate_long_text("Just one sentence.", "fr", "auto")
            .await;

        assert!(!result.success);
        assert_eq!(result.partial_result.as_deref(), Some(""));
    }

    #[tokio::test]
    async fn test_unsupported_target_rejected_before_remote_call() {
        let backend = Arc::new(MockBackend::echo());
        let translation = service(backend.clone(), 450);

        let single = translation.translate_text("hello", "xx", "auto").await;
        assert!(!single.success);
        assert_eq!(single.error.as_deref(), Some("Target language 'xx' not supported"));

        let long = translation.translate_long_text("hello", "xx", "auto").await;
        assert!(!long.success);
        assert!(long.partial_result.is_none());

        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_text_rejected() {
        let backend = Arc::new(MockBackend::echo());
        let result = service(backend.clone(), 450)
            .translate_long_text("   ", "es", "auto")
            .await;

        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("Text and target language are required"));
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_translate_text_single_call_on_cleaned_text() {
        let backend = Arc::new(MockBackend::fixed(json!({ "translation_text": "Hola. Adiós." })));
        let result = service(backend.clone(), 5)
            .translate_text("Hello.   Goodbye.", "es", "en")
            .await;

        assert!(result.success);
        assert_eq!(result.translated_text.as_deref(), Some("Hola. Adiós."));
        assert!(result.chunks_processed.is_none());

        let calls = backend.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].inputs, "Hello. Goodbye.");
    }

    #[tokio::test]
    async fn test_malformed_translation_payload_is_failure() {
        let backend = Arc::new(MockBackend::fixed(json!([{ "generated_text": "???" }])));
        let result = service(backend, 450).translate_text("Hello.", "es", "en").await;

        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("Invalid response: No translation in response"));
    }

    #[tokio::test]
    async fn test_untabulated_pair_flags_pivot() {
        let backend = Arc::new(MockBackend::echo());
        let result = service(backend.clone(), 450)
            .translate_long_text("こんにちは。", "ko", "ja")
            .await;

        assert!(result.success);
        assert!(result.pivot_fallback);
        assert_eq!(backend.calls()[0].model_id, DEFAULT_MODEL);
    }

    #[tokio::test]
    async fn test_chunk_delay_is_applied_between_chunks() {
        let backend = Arc::new(MockBackend::echo());
        let translation = TranslationService::with_defaults(
            backend,
            PipelineSettings {
                max_chunk_length: 20,
                chunk_delay: Duration::from_millis(30),
            },
        );

        let started = Instant::now();
        let result = translation.translate_long_text(THREE_SENTENCES, "es", "en").await;

        assert!(result.success);
        assert!(started.elapsed() >= Duration::from_millis(60));
    }

    #[test]
    fn test_supported_languages_idempotent() {
        let translation = service(Arc::new(MockBackend::echo()), 450);
        assert_eq!(
            translation.get_supported_languages(),
            translation.get_supported_languages()
        );
    }
}
