//! Internationalization: language detection, translation tables and the
//! service that keeps the active pair.

/// Initial language detection
mod detect;
/// Language change listeners
mod listeners;
/// Translation service
mod service;
/// Translation tables and interpolation
mod table;
/// Lookup capability
mod translator;

pub use detect::{
    DetectionSources,
    detect_language,
};
pub use listeners::{
    LanguageListener,
    ListenerId,
    Listeners,
};
pub use service::TranslationService;
pub use table::{
    KEY_SEPARATOR,
    TranslationTable,
    interpolate,
};
pub use translator::{
    NoTranslations,
    Translate,
};
