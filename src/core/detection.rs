//! Language identification
//!
//! A remote language-ID model is the primary classifier. Any error or
//! unusable payload from it hands the text to [`HeuristicClassifier`], a
//! pattern-counting scorer that is defined for every input and cannot fail,
//! so [`LanguageDetector::detect_language`] always yields a code.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::core::client::InferenceBackend;
use crate::core::errors::{Result, ServiceError};
use crate::core::models::LanguageLabel;

/// Code returned for empty input and for score ties
pub const DEFAULT_LANGUAGE: &str = "en";

/// Bonus added to the Spanish score when any Spanish diacritic appears
const DIACRITIC_BONUS: usize = 10;

static SPANISH_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"\b(el|la|los|las|un|una|de|del|que|es|en|con|por|para|su|sus|se|te|me|le|lo|al|pero|como|más|muy|todo|toda|todos|todas|este|esta|estos|estas|ese|esa|esos|esas|aquel|aquella|aquellos|aquellas|y|o|si|no|sí|también|además|porque|cuando|donde|cómo|qué|quién|cuál|cuáles|cuándo|dónde|por qué|para qué)\b",
        r"ción\b",
        r"dad\b",
        r"mente\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("Invalid Spanish pattern"))
    .collect()
});

static ENGLISH_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        concat!(
            r"\b(the|a|an|and|or|but|in|on|at|to|for|of|with|by|from|up|about|into|through|during|before|after|above|below|between|among",
            r"|this|that|these|those|i|you|he|she|it|we|they|me|him|her|us|them|my|your|his|its|our|their",
            r"|will|would|could|should|may|might|can|must|shall|ought|have|has|had|do|does|did|be|am|is|are|was|were|been|being",
            r"|get|got|getting|make|made|making|take|took|taken|taking|come|came|coming|go|went|going|see|saw|seen|seeing",
            r"|know|knew|known|knowing|think|thought|thinking|say|said|saying|tell|told|telling|give|gave|given|giving",
            r"|find|found|finding|work|worked|working|call|called|calling|try|tried|trying|ask|asked|asking|need|needed|needing",
            r"|feel|felt|feeling|become|became|becoming|leave|left|leaving|put|putting|mean|meant|meaning|keep|kept|keeping",
            r"|let|letting|begin|began|beginning|seem|seemed|seeming|help|helped|helping|talk|talked|talking|turn|turned|turning",
            r"|start|started|starting|show|showed|showing|hear|heard|hearing|play|played|playing|run|ran|running|move|moved|moving",
            r"|live|lived|living|believe|believed|believing|hold|held|holding|bring|brought|bringing|happen|happened|happening",
            r"|write|wrote|written|writing|provide|provided|providing|sit|sat|sitting|stand|stood|standing|lose|lost|losing",
            r"|pay|paid|paying|meet|met|meeting|include|included|including|continue|continued|continuing|set|setting",
            r"|learn|learned|learning|change|changed|changing|lead|led|leading|understand|understood|understanding",
            r"|watch|watched|watching|follow|followed|following|stop|stopped|stopping|create|created|creating",
            r"|speak|spoke|spoken|speaking|read|reading|allow|allowed|allowing|add|added|adding|spend|spent|spending",
            r"|grow|grew|grown|growing|open|opened|opening|walk|walked|walking|win|won|winning|offer|offered|offering",
            r"|remember|remembered|remembering|love|loved|loving|consider|considered|considering|appear|appeared|appearing",
            r"|buy|bought|buying|wait|waited|waiting|serve|served|serving|die|died|dying|send|sent|sending",
            r"|expect|expected|expecting|build|built|building|stay|stayed|staying|fall|fell|fallen|falling|cut|cutting",
            r"|reach|reached|reaching|kill|killed|killing|remain|remained|remaining|suggest|suggested|suggesting",
            r"|raise|raised|raising|pass|passed|passing|sell|sold|selling|require|required|requiring|report|reported|reporting",
            r"|decide|decided|deciding|pull|pulled|pulling)\b",
        ),
        r"ing\b",
        r"ed\b",
        r"tion\b",
        r"ness\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("Invalid English pattern"))
    .collect()
});

fn has_spanish_diacritic(text: &str) -> bool {
    text.chars()
        .any(|c| matches!(c, 'ñ' | 'á' | 'é' | 'í' | 'ó' | 'ú' | 'ü'))
}

fn count_matches(patterns: &[Regex], text: &str) -> usize {
    patterns.iter().map(|p| p.find_iter(text).count()).sum()
}

/// Something that can name the language of a text
#[async_trait]
pub trait LanguageClassifier: Send + Sync + std::fmt::Debug {
    async fn classify(&self, text: &str) -> Result<String>;
}

/// Spanish/English bag-of-patterns scorer
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicClassifier;

impl HeuristicClassifier {
    /// Spanish and English scores for a text, in that order
    pub fn scores(&self, text: &str) -> (usize, usize) {
        let lower = text.to_lowercase();

        let mut spanish = count_matches(&SPANISH_PATTERNS, &lower);
        if has_spanish_diacritic(&lower) {
            spanish += DIACRITIC_BONUS;
        }
        let english = count_matches(&ENGLISH_PATTERNS, &lower);

        (spanish, english)
    }

    /// Pick the higher-scoring language; ties and empty input give
    /// [`DEFAULT_LANGUAGE`]
    pub fn detect(&self, text: &str) -> &'static str {
        if text.trim().is_empty() {
            return DEFAULT_LANGUAGE;
        }

        let (spanish, english) = self.scores(text);
        debug!("Heuristic scores: es={}, en={}", spanish, english);

        if spanish > english {
            "es"
        } else if english > spanish {
            "en"
        } else {
            DEFAULT_LANGUAGE
        }
    }
}

#[async_trait]
impl LanguageClassifier for HeuristicClassifier {
    async fn classify(&self, text: &str) -> Result<String> {
        Ok(self.detect(text).to_string())
    }
}

/// Deterministic fallback detection, total over all inputs
pub fn detect_language_fallback(text: &str) -> String {
    HeuristicClassifier.detect(text).to_string()
}

/// Remote language-ID model
#[derive(Debug, Clone)]
pub struct RemoteClassifier {
    backend: Arc<dyn InferenceBackend>,
    model_id: String,
}

impl RemoteClassifier {
    pub fn new(backend: Arc<dyn InferenceBackend>, model_id: impl Into<String>) -> Self {
        Self {
            backend,
            model_id: model_id.into(),
        }
    }
}

#[async_trait]
impl LanguageClassifier for RemoteClassifier {
    async fn classify(&self, text: &str) -> Result<String> {
        let response = self.backend.invoke_model(&self.model_id, text, None).await?;
        let top = top_label(&response)?;
        info!(
            "Detected language {} ({:.2}%)",
            top.label.to_lowercase(),
            top.score * 100.0
        );
        Ok(top.label.to_lowercase())
    }
}

/// First entry of `[{label, score}, ..]`, also accepting one level of nesting
fn top_label(response: &Value) -> Result<LanguageLabel> {
    let malformed = |message: &str| ServiceError::InvalidResponseError {
        message: message.to_string(),
    };

    let items = response
        .as_array()
        .filter(|items| !items.is_empty())
        .ok_or_else(|| malformed("expected a non-empty array of labels"))?;

    let first = match &items[0] {
        Value::Array(inner) => inner
            .first()
            .ok_or_else(|| malformed("expected a non-empty array of labels"))?,
        entry => entry,
    };

    let label = first
        .get("label")
        .and_then(Value::as_str)
        .filter(|l| !l.is_empty())
        .ok_or_else(|| malformed("top entry has no label"))?;
    let score = first
        .get("score")
        .and_then(Value::as_f64)
        .ok_or_else(|| malformed("top entry has no numeric score"))?;

    Ok(LanguageLabel {
        label: label.to_string(),
        score,
    })
}

/// Primary classifier with the heuristic scorer behind it
#[derive(Debug)]
pub struct LanguageDetector {
    primary: Box<dyn LanguageClassifier>,
    fallback: Box<dyn LanguageClassifier>,
    max_chars: usize,
}

impl LanguageDetector {
    pub fn new(primary: Box<dyn LanguageClassifier>, max_chars: usize) -> Self {
        Self::with_fallback(primary, Box::new(HeuristicClassifier), max_chars)
    }

    /// Detector with an explicit fallback classifier
    pub fn with_fallback(
        primary: Box<dyn LanguageClassifier>,
        fallback: Box<dyn LanguageClassifier>,
        max_chars: usize,
    ) -> Self {
        Self {
            primary,
            fallback,
            max_chars,
        }
    }

    /// Detector backed by a remote language-ID model
    pub fn remote(backend: Arc<dyn InferenceBackend>, model_id: impl Into<String>, max_chars: usize) -> Self {
        Self::new(Box::new(RemoteClassifier::new(backend, model_id)), max_chars)
    }

    /// Detect the language of `text`; never fails
    pub async fn detect_language(&self, text: &str) -> String {
        match self.try_primary(text).await {
            Ok(code) => code,
            Err(e) => {
                warn!("Language detection failed ({}), using fallback classifier", e);
                self.fallback.classify(text).await.unwrap_or_else(|e| {
                    warn!("Fallback classifier failed ({}), defaulting to {}", e, DEFAULT_LANGUAGE);
                    DEFAULT_LANGUAGE.to_string()
                })
            }
        }
    }

    async fn try_primary(&self, text: &str) -> Result<String> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ServiceError::validation("Invalid or empty text"));
        }

        let prefix: String = trimmed.chars().take(self.max_chars).collect();
        self.primary.classify(&prefix).await
    }
}
