//! Supported translation targets

use std::collections::BTreeMap;

use crate::core::models::SupportedLanguagesResponse;

const LANGUAGES: &[(&str, &str)] = &[
    ("en", "English"),
    ("es", "Spanish"),
    ("fr", "French"),
    ("de", "German"),
    ("it", "Italian"),
    ("pt", "Portuguese"),
    ("ru", "Russian"),
    ("zh", "Chinese"),
    ("ja", "Japanese"),
    ("ko", "Korean"),
    ("ar", "Arabic"),
    ("hi", "Hindi"),
    ("nl", "Dutch"),
    ("sv", "Swedish"),
    ("no", "Norwegian"),
    ("da", "Danish"),
    ("fi", "Finnish"),
    ("pl", "Polish"),
    ("tr", "Turkish"),
    ("he", "Hebrew"),
];

/// Immutable code → display name table, built once and shared by reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportedLanguages {
    languages: BTreeMap<&'static str, &'static str>,
}

impl Default for SupportedLanguages {
    fn default() -> Self {
        Self {
            languages: LANGUAGES.iter().copied().collect(),
        }
    }
}

impl SupportedLanguages {
    pub fn contains(&self, code: &str) -> bool {
        self.languages.contains_key(code)
    }

    /// Display name for a language code
    pub fn name(&self, code: &str) -> Option<&'static str> {
        self.languages.get(code).copied()
    }

    pub fn len(&self) -> usize {
        self.languages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }

    /// Listing returned to API callers
    pub fn listing(&self) -> SupportedLanguagesResponse {
        SupportedLanguagesResponse {
            languages: self
                .languages
                .iter()
                .map(|(code, name)| (code.to_string(), name.to_string()))
                .collect(),
            total_languages: self.languages.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table() {
        let languages = SupportedLanguages::default();
        assert_eq!(languages.len(), 20);
        assert!(languages.contains("es"));
        assert!(!languages.contains("xx"));
        assert_eq!(languages.name("he"), Some("Hebrew"));
    }

    #[test]
    fn test_listing_is_stable() {
        let languages = SupportedLanguages::default();
        let first = languages.listing();
        let second = languages.listing();
        assert_eq!(first, second);
        assert_eq!(first.total_languages, 20);
        assert_eq!(first.languages.get("en").map(String::as_str), Some("English"));
    }
}
