//! Language pair → translation model routing

use std::collections::HashMap;

/// Source token substituted for `"auto"`
pub const MULTILINGUAL_SOURCE: &str = "mul";

/// Source value meaning "detect the source language"
pub const AUTO_SOURCE: &str = "auto";

/// Multilingual-to-English model used for untabulated pairs
pub const DEFAULT_MODEL: &str = "Helsinki-NLP/opus-mt-mul-en";

/// Output language of [`DEFAULT_MODEL`]
pub const PIVOT_LANGUAGE: &str = "en";

const MODEL_PAIRS: &[(&str, &str)] = &[
    ("es-en", "Helsinki-NLP/opus-mt-es-en"),
    ("en-es", "Helsinki-NLP/opus-mt-en-es"),
    ("fr-en", "Helsinki-NLP/opus-mt-fr-en"),
    ("en-fr", "Helsinki-NLP/opus-mt-en-fr"),
    ("de-en", "Helsinki-NLP/opus-mt-de-en"),
    ("en-de", "Helsinki-NLP/opus-mt-en-de"),
    ("it-en", "Helsinki-NLP/opus-mt-it-en"),
    ("en-it", "Helsinki-NLP/opus-mt-en-it"),
    ("pt-en", "Helsinki-NLP/opus-mt-pt-en"),
    ("en-pt", "Helsinki-NLP/opus-mt-en-pt"),
    ("ru-en", "Helsinki-NLP/opus-mt-ru-en"),
    ("en-ru", "Helsinki-NLP/opus-mt-en-ru"),
];

/// Resolved model for one language pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSelection<'a> {
    pub model_id: &'a str,
    /// True when no tabulated model exists and output will be in the pivot
    /// language instead of the requested target
    pub pivot_fallback: bool,
}

/// Static pair table with a pivot default
#[derive(Debug, Clone)]
pub struct ModelSelector {
    pairs: HashMap<String, String>,
    default_model: String,
    pivot_language: String,
}

impl Default for ModelSelector {
    fn default() -> Self {
        Self::new(
            MODEL_PAIRS
                .iter()
                .map(|(pair, model)| (pair.to_string(), model.to_string())),
            DEFAULT_MODEL,
            PIVOT_LANGUAGE,
        )
    }
}

impl ModelSelector {
    /// Build a selector from `"{source}-{target}"` → model entries
    pub fn new(
        pairs: impl IntoIterator<Item = (String, String)>,
        default_model: impl Into<String>,
        pivot_language: impl Into<String>,
    ) -> Self {
        Self {
            pairs: pairs.into_iter().collect(),
            default_model: default_model.into(),
            pivot_language: pivot_language.into(),
        }
    }

    /// Model id for a language pair, falling back to the default model
    pub fn resolve_model(&self, source_lang: &str, target_lang: &str) -> &str {
        self.select(source_lang, target_lang).model_id
    }

    /// Resolve a pair and report whether the pivot model had to stand in
    pub fn select(&self, source_lang: &str, target_lang: &str) -> ModelSelection<'_> {
        let source = if source_lang == AUTO_SOURCE {
            MULTILINGUAL_SOURCE
        } else {
            source_lang
        };

        match self.pairs.get(&format!("{}-{}", source, target_lang)) {
            Some(model_id) => ModelSelection {
                model_id,
                pivot_fallback: false,
            },
            None => ModelSelection {
                model_id: &self.default_model,
                pivot_fallback: target_lang != self.pivot_language,
            },
        }
    }

    /// Model used for any pair missing from the table
    pub fn default_model(&self) -> &str {
        &self.default_model
    }
}
