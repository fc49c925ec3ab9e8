//! Core types used throughout the project.

use std::fmt;

use serde::{
    Deserialize,
    Serialize,
};

/// Token substituted with a language code in resource path templates.
pub const LANG_PLACEHOLDER: &str = "{lang}";

/// A language code such as `es` or `en`.
///
/// Any string can be wrapped; membership in the site's language set is
/// checked through [`SupportedLanguages`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LanguageCode(
    /// 言語コード文字列
    String,
);

impl LanguageCode {
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for LanguageCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for LanguageCode {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for LanguageCode {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Primary subtag of a locale string.
///
/// Accepts BCP 47 (`en-US`) as well as POSIX (`en_US.UTF-8`) spellings.
///
/// # Examples
/// ```
/// use site_i18n::types::primary_subtag;
///
/// assert_eq!(primary_subtag("en-US"), "en");
/// assert_eq!(primary_subtag("pt_BR.UTF-8"), "pt");
/// assert_eq!(primary_subtag("es"), "es");
/// ```
#[must_use]
pub fn primary_subtag(locale: &str) -> &str {
    locale.split(['-', '_', '.']).next().unwrap_or(locale)
}

/// Ordered set of languages the site ships, with its default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportedLanguages {
    /// デフォルト言語
    default: LanguageCode,
    /// 対応言語（重複なし、設定順）
    codes: Vec<LanguageCode>,
}

impl SupportedLanguages {
    /// Builds the set, keeping first occurrences in order.
    ///
    /// The default language is always a member; it is prepended when absent.
    #[must_use]
    pub fn new(default: LanguageCode, codes: impl IntoIterator<Item = LanguageCode>) -> Self {
        let mut unique: Vec<LanguageCode> = Vec::new();
        for code in codes {
            if !unique.contains(&code) {
                unique.push(code);
            }
        }
        if !unique.contains(&default) {
            unique.insert(0, default.clone());
        }
        Self { default, codes: unique }
    }

    #[must_use]
    pub const fn default_language(&self) -> &LanguageCode {
        &self.default
    }

    #[must_use]
    pub fn contains(&self, code: &str) -> bool {
        self.codes.iter().any(|supported| supported == code)
    }

    /// Returns the member matching `code`, if any.
    #[must_use]
    pub fn resolve(&self, code: &str) -> Option<&LanguageCode> {
        self.codes.iter().find(|supported| *supported == code)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LanguageCode> {
        self.codes.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

/// Base-path hints a page exposes to the loaders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageAttributes {
    /// Explicit path prefix to the site root. Used verbatim when non-empty.
    pub base_path: Option<String>,
    /// Number of parent-directory steps to the site root.
    pub depth: Option<u32>,
}

impl PageAttributes {
    /// Computes the path prefix under which all site resources live.
    #[must_use]
    pub fn resolve_base_path(&self) -> String {
        match self.base_path.as_deref() {
            Some(path) if !path.is_empty() => path.to_string(),
            _ => "../".repeat(self.depth.unwrap_or(0) as usize),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use googletest::prelude::*;
    use rstest::rstest;

    use super::*;

    fn languages(default: &str, codes: &[&str]) -> SupportedLanguages {
        SupportedLanguages::new(
            LanguageCode::new(default),
            codes.iter().map(|code| LanguageCode::new(*code)),
        )
    }

    #[rstest]
    #[case::bcp47("en-US", "en")]
    #[case::posix("pt_BR.UTF-8", "pt")]
    #[case::encoding_only("C.UTF-8", "C")]
    #[case::bare("es", "es")]
    #[case::empty("", "")]
    fn test_primary_subtag(#[case] locale: &str, #[case] expected: &str) {
        assert_that!(primary_subtag(locale), eq(expected));
    }

    #[rstest]
    fn supported_languages_keep_order_and_dedupe() {
        let supported = languages("es", &["es", "en", "es"]);

        let codes: Vec<String> = supported.iter().map(LanguageCode::to_string).collect();

        assert_that!(codes, elements_are![eq("es"), eq("en")]);
    }

    #[googletest::test]
    fn supported_languages_always_contain_default() {
        let supported = languages("es", &["en"]);

        expect_that!(supported.contains("es"), eq(true));
        expect_that!(supported.len(), eq(2));
        expect_that!(supported.iter().next().map(LanguageCode::as_str), some(eq("es")));
    }

    #[googletest::test]
    fn resolve_is_exact_match() {
        let supported = languages("es", &["es", "en"]);

        expect_that!(supported.resolve("en").map(LanguageCode::as_str), some(eq("en")));
        expect_that!(supported.resolve("EN"), none());
        expect_that!(supported.resolve("en-US"), none());
    }

    #[rstest]
    #[case::explicit(Some("/site/"), Some(3), "/site/")]
    #[case::empty_explicit_uses_depth(Some(""), Some(2), "../../")]
    #[case::depth_only(None, Some(1), "../")]
    #[case::nothing(None, None, "")]
    fn test_resolve_base_path(
        #[case] base_path: Option<&str>,
        #[case] depth: Option<u32>,
        #[case] expected: &str,
    ) {
        let attributes = PageAttributes { base_path: base_path.map(str::to_string), depth };

        assert_that!(attributes.resolve_base_path(), eq(expected));
    }
}
