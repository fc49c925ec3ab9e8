//! Text lookup capability handed to views.

use super::table::interpolate;
use crate::types::LanguageCode;

/// Resolves UI text. Views hold an `Arc<dyn Translate>` and always call
/// through it, whether or not translations are available.
pub trait Translate: Send + Sync {
    /// Text for `key`, else the interpolated `fallback`, else `key` itself.
    fn t(&self, key: &str, fallback: Option<&str>, params: &[(&str, &str)]) -> String;

    /// Language the text is in, if any.
    fn language(&self) -> Option<LanguageCode>;
}

/// Stand-in used when no translation service is wired up.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTranslations;

impl Translate for NoTranslations {
    fn t(&self, key: &str, fallback: Option<&str>, params: &[(&str, &str)]) -> String {
        fallback.map_or_else(|| key.to_string(), |fallback| interpolate(fallback, params))
    }

    fn language(&self) -> Option<LanguageCode> {
        None
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use googletest::prelude::*;
    use rstest::*;

    use super::*;

    #[rstest]
    #[case::fallback(Some("Nosotros"), &[], "Nosotros")]
    #[case::interpolated_fallback(Some("© {year}"), &[("year", "2026")], "© 2026")]
    #[case::key(None, &[], "nav.about")]
    fn no_translations_uses_fallback_or_key(
        #[case] fallback: Option<&str>,
        #[case] params: &[(&str, &str)],
        #[case] expected: &str,
    ) {
        let translator: Arc<dyn Translate> = Arc::new(NoTranslations);

        assert_that!(translator.t("nav.about", fallback, params), eq(expected));
        assert_that!(translator.language(), none());
    }
}
