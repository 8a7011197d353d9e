use rust_stemmers::Algorithm;

use crate::error::{ExtractorError, Result};

/// Identifies the language of article text, returning a two-letter locale
/// tag when detection succeeds.
pub trait LanguageDetector: Send + Sync {
    fn detect(&self, text: &str) -> Option<String>;
}

/// Trigram-based statistical detector. Built once at startup and shared
/// across requests.
pub struct WhatlangDetector;

impl LanguageDetector for WhatlangDetector {
    fn detect(&self, text: &str) -> Option<String> {
        whatlang::detect_lang(text).map(|lang| match lang {
            whatlang::Lang::Eng => "en".to_string(),
            whatlang::Lang::Fra => "fr".to_string(),
            other => other.code().to_string(),
        })
    }
}

/// Stemming profiles the keyword extractor can operate with. A closed set:
/// the extractor cannot work language-agnostically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StemmerLanguage {
    English,
    French,
}

impl StemmerLanguage {
    pub fn from_locale(tag: &str) -> Option<Self> {
        match tag {
            "en" => Some(Self::English),
            "fr" => Some(Self::French),
            _ => None,
        }
    }

    pub(crate) fn algorithm(self) -> Algorithm {
        match self {
            Self::English => Algorithm::English,
            Self::French => Algorithm::French,
        }
    }
}

/// Maps a detected locale to a supported stemming profile. An absent
/// detection or an unrecognized locale terminates the pipeline.
pub fn resolve_profile(locale: Option<&str>) -> Result<StemmerLanguage> {
    locale
        .and_then(StemmerLanguage::from_locale)
        .ok_or(ExtractorError::UnsupportedLanguage)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supported_locales_resolve_to_profiles() {
        assert_eq!(resolve_profile(Some("en")).unwrap(), StemmerLanguage::English);
        assert_eq!(resolve_profile(Some("fr")).unwrap(), StemmerLanguage::French);
    }

    #[test]
    fn unsupported_locales_are_rejected() {
        assert!(matches!(
            resolve_profile(Some("de")),
            Err(ExtractorError::UnsupportedLanguage)
        ));
        assert!(matches!(
            resolve_profile(Some("")),
            Err(ExtractorError::UnsupportedLanguage)
        ));
    }

    #[test]
    fn absent_detection_is_rejected() {
        assert!(matches!(
            resolve_profile(None),
            Err(ExtractorError::UnsupportedLanguage)
        ));
    }

    #[test]
    fn detector_recognizes_english() {
        let text = "The quick brown fox jumps over the lazy dog and then runs \
                    through the quiet countryside while the sun slowly sets \
                    behind the distant rolling hills of the valley.";
        assert_eq!(WhatlangDetector.detect(text).as_deref(), Some("en"));
    }

    #[test]
    fn detector_recognizes_french() {
        let text = "Le petit garçon mange une pomme rouge dans le jardin de sa \
                    grand-mère pendant que les oiseaux chantent doucement dans \
                    les grands arbres près de la rivière.";
        assert_eq!(WhatlangDetector.detect(text).as_deref(), Some("fr"));
    }

    #[test]
    fn detector_returns_none_for_empty_text() {
        assert!(WhatlangDetector.detect("").is_none());
    }
}
