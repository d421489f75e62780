//! Document translation, language detection and summarization library
//!
//! Long text is split into sentence-aligned chunks and translated in order
//! through hosted translation models chosen by language pair. Language
//! detection uses a hosted language-ID model with a deterministic pattern
//! scorer behind it, and documents can be summarized piece by piece.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod core;
pub mod processors;
pub mod server;
pub mod cli;

// Re-export key types for convenience
pub use crate::core::{
    chunker::{clean_text, split_into_chunks},
    client::{HfInferenceClient, InferenceBackend},
    config::ServiceConfig,
    detection::{detect_language_fallback, HeuristicClassifier, LanguageClassifier, LanguageDetector},
    errors::{Result, ServiceError},
    languages::SupportedLanguages,
    model_selector::ModelSelector,
    models::{SupportedLanguagesResponse, TranslationResult},
    pipeline::{PipelineSettings, TranslationService},
    summarizer::Summarizer,
};

pub use crate::processors::document::{extract_text, DocumentKind};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
