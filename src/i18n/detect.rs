//! Language detection.

use crate::types::{
    LanguageCode,
    SupportedLanguages,
    primary_subtag,
};

/// Raw language hints, highest priority first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetectionSources {
    /// Explicit request in the page URL (`?lang=en`)
    pub url_param: Option<String>,
    /// Previously persisted preference
    pub stored: Option<String>,
    /// Runtime locale (`en-US`)
    pub locale: Option<String>,
}

/// Picks the first supported language among the sources, else the default.
///
/// Only the primary subtag of the runtime locale is considered.
#[must_use]
pub fn detect_language(languages: &SupportedLanguages, sources: &DetectionSources) -> LanguageCode {
    let locale_subtag = sources.locale.as_deref().map(|locale| primary_subtag(locale).to_lowercase());

    let candidates = [
        ("url", sources.url_param.as_deref()),
        ("storage", sources.stored.as_deref()),
        ("locale", locale_subtag.as_deref()),
    ];

    for (source, candidate) in candidates {
        let Some(candidate) = candidate else {
            continue;
        };
        if let Some(language) = languages.resolve(candidate) {
            tracing::debug!(source, language = %language, "Language detected");
            return language.clone();
        }
        tracing::debug!(source, candidate, "Ignoring unsupported language");
    }

    languages.default_language().clone()
}
