//! The page environment the services run in.
//!
//! A [`Page`] answers the questions the language detection and base-path
//! resolution ask of the surrounding document: query parameters, runtime
//! locale, base-path attributes. It also accepts in-place URL updates.

use std::sync::{
    PoisonError,
    RwLock,
};

use url::Url;

use crate::types::PageAttributes;

/// Read access to the current page plus history-style URL replacement.
pub trait Page: Send + Sync {
    /// Value of a query parameter of the current URL.
    fn query_param(&self, name: &str) -> Option<String>;

    /// Locale reported by the runtime (e.g. `en-US`).
    fn locale(&self) -> Option<String>;

    /// Base-path hints carried by the page.
    fn attributes(&self) -> PageAttributes;

    /// Sets a query parameter on the visible URL without navigating.
    fn replace_query_param(&self, name: &str, value: &str);
}

/// In-process [`Page`] backed by a parsed URL.
#[derive(Debug)]
pub struct StaticPage {
    /// 表示中の URL
    url: RwLock<Url>,
    /// ランタイムのロケール
    locale: Option<String>,
    /// ベースパスのヒント
    attributes: RwLock<PageAttributes>,
}

impl StaticPage {
    #[must_use]
    pub fn new(url: Url) -> Self {
        Self { url: RwLock::new(url), locale: None, attributes: RwLock::new(PageAttributes::default()) }
    }

    /// # Errors
    /// Returns an error if `url` is not an absolute URL.
    pub fn parse(url: &str) -> Result<Self, url::ParseError> {
        Ok(Self::new(Url::parse(url)?))
    }

    #[must_use]
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    #[must_use]
    pub fn with_attributes(self, attributes: PageAttributes) -> Self {
        self.set_attributes(attributes);
        self
    }

    /// Replaces the page's base-path hints.
    pub fn set_attributes(&self, attributes: PageAttributes) {
        *self.attributes.write().unwrap_or_else(PoisonError::into_inner) = attributes;
    }

    /// The URL as currently displayed.
    #[must_use]
    pub fn current_url(&self) -> Url {
        self.url.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Page for StaticPage {
    fn query_param(&self, name: &str) -> Option<String> {
        let url = self.url.read().unwrap_or_else(PoisonError::into_inner);
        url.query_pairs().find(|(key, _)| key == name).map(|(_, value)| value.into_owned())
    }

    fn locale(&self) -> Option<String> {
        self.locale.clone()
    }

    fn attributes(&self) -> PageAttributes {
        self.attributes.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn replace_query_param(&self, name: &str, value: &str) {
        let mut url = self.url.write().unwrap_or_else(PoisonError::into_inner);

        let mut replaced = false;
        let mut pairs = Vec::new();
        for (key, current) in url.query_pairs() {
            if key != name {
                pairs.push((key.into_owned(), current.into_owned()));
            } else if !replaced {
                pairs.push((key.into_owned(), value.to_string()));
                replaced = true;
            }
        }
        if !replaced {
            pairs.push((name.to_string(), value.to_string()));
        }

        url.query_pairs_mut().clear().extend_pairs(pairs);
        tracing::debug!(url = %url.as_str(), "Page URL replaced");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use googletest::prelude::*;
    use rstest::*;

    use super::*;

    #[fixture]
    fn page() -> StaticPage {
        StaticPage::parse("https://example.com/feature/news/?utm=x&lang=es&page=2").unwrap()
    }

    #[rstest]
    fn query_param_reads_current_url(page: StaticPage) {
        assert_that!(page.query_param("lang"), some(eq("es")));
        assert_that!(page.query_param("missing"), none());
    }

    #[rstest]
    fn replace_query_param_keeps_position(page: StaticPage) {
        page.replace_query_param("lang", "en");

        let url = page.current_url();
        assert_that!(url.query(), some(eq("utm=x&lang=en&page=2")));
        assert_that!(page.query_param("lang"), some(eq("en")));
    }

    #[rstest]
    fn replace_query_param_appends_when_absent() {
        let page = StaticPage::parse("https://example.com/").unwrap();

        page.replace_query_param("lang", "en");

        let url = page.current_url();
        assert_that!(url.as_str(), eq("https://example.com/?lang=en"));
    }

    #[rstest]
    fn replace_query_param_collapses_duplicates() {
        let page = StaticPage::parse("https://example.com/?lang=es&lang=fr").unwrap();

        page.replace_query_param("lang", "en");

        let url = page.current_url();
        assert_that!(url.query(), some(eq("lang=en")));
    }

    #[rstest]
    fn attributes_can_be_replaced(page: StaticPage) {
        let page = page.with_locale("en-US");
        page.set_attributes(PageAttributes { base_path: None, depth: Some(2) });

        assert_that!(page.locale(), some(eq("en-US")));
        assert_that!(page.attributes().resolve_base_path(), eq("../../"));
    }
}
