use std::collections::HashSet;

use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;

use crate::types::{
    LANG_PLACEHOLDER,
    LanguageCode,
    PageAttributes,
    SupportedLanguages,
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Configuration error in '{field_path}': {message}")]
pub struct ValidationError {
    /// JSON path to the field (e.g., "supportedLanguages[1]")
    pub field_path: String,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field_path: field_path.into(), message: message.into() }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    ValidationErrors(Vec<ValidationError>),

    #[error("Failed to load configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// 検証エラーを番号付きの一覧に整形する
fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .enumerate()
        .map(|(i, err)| format!("  {}. {} - {}", i + 1, err.field_path, err.message))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Settings read from `.site-i18n.json` at the site root.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SiteSettings {
    /// Language used when no other source yields a supported one,
    /// and the target of the translation fallback.
    pub default_language: String,

    /// Ordered list of languages the site ships translations for.
    pub supported_languages: Vec<String>,

    /// Translation file template relative to the base path.
    pub translations_path: String,

    /// Directory holding `<name>.svg` icons, relative to the base path.
    pub icons_path: String,

    /// URL query parameter carrying an explicit language request.
    pub language_param: String,

    /// Key under which the chosen language is persisted.
    pub preference_key: String,

    /// Explicit base path; wins over `depth`.
    pub base_path: Option<String>,

    /// Number of `../` steps from the page to the site root.
    pub depth: Option<u32>,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            default_language: "es".to_string(),
            supported_languages: vec!["es".to_string(), "en".to_string()],
            translations_path: format!("core/i18n/{LANG_PLACEHOLDER}.json"),
            icons_path: "core/assets".to_string(),
            language_param: "lang".to_string(),
            preference_key: "site-lang".to_string(),
            base_path: None,
            depth: None,
        }
    }
}

impl SiteSettings {
    /// # Errors
    /// - Required field is empty
    /// - Default language is not supported
    /// - Duplicate supported language
    /// - Translation template without a language placeholder
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.default_language.is_empty() {
            errors.push(ValidationError::new(
                "defaultLanguage",
                "The default language cannot be empty. Example: \"es\"",
            ));
        } else if !self.supported_languages.contains(&self.default_language) {
            errors.push(ValidationError::new(
                "defaultLanguage",
                format!(
                    "The default language '{}' must be listed in 'supportedLanguages'",
                    self.default_language
                ),
            ));
        }

        if self.supported_languages.is_empty() {
            errors.push(ValidationError::new(
                "supportedLanguages",
                "At least one language is required. Example: [\"es\", \"en\"]",
            ));
        }

        let mut seen = HashSet::new();
        for (index, language) in self.supported_languages.iter().enumerate() {
            if language.is_empty() {
                errors.push(ValidationError::new(
                    format!("supportedLanguages[{index}]"),
                    "Language codes cannot be empty",
                ));
            } else if !seen.insert(language.as_str()) {
                errors.push(ValidationError::new(
                    format!("supportedLanguages[{index}]"),
                    format!("Duplicate language code '{language}'"),
                ));
            }
        }

        if !self.translations_path.contains(LANG_PLACEHOLDER) {
            errors.push(ValidationError::new(
                "translationsPath",
                format!(
                    "The template must contain '{LANG_PLACEHOLDER}'. Example: \"core/i18n/{LANG_PLACEHOLDER}.json\""
                ),
            ));
        }

        if self.language_param.is_empty() {
            errors.push(ValidationError::new(
                "languageParam",
                "The query parameter name cannot be empty. Example: \"lang\"",
            ));
        }

        if self.preference_key.is_empty() {
            errors.push(ValidationError::new(
                "preferenceKey",
                "The preference key cannot be empty",
            ));
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// Supported language set with the configured default.
    ///
    /// Meaningful only for settings that passed [`SiteSettings::validate`].
    #[must_use]
    pub fn languages(&self) -> SupportedLanguages {
        SupportedLanguages::new(
            LanguageCode::new(&self.default_language),
            self.supported_languages.iter().map(LanguageCode::new),
        )
    }

    /// Base path attributes a page would carry for these settings.
    #[must_use]
    pub fn page_attributes(&self) -> PageAttributes {
        PageAttributes { base_path: self.base_path.clone(), depth: self.depth }
    }
}
