//! Base-path resolution shared by the loaders.

use std::sync::{
    Arc,
    OnceLock,
};

use crate::page::Page;

/// Resolves the page's base path on first use and keeps it.
///
/// Later changes to the page attributes are not observed.
pub struct BasePath {
    /// 属性の読み取り元
    page: Arc<dyn Page>,
    /// 初回解決時の値
    resolved: OnceLock<String>,
}

impl BasePath {
    #[must_use]
    pub fn new(page: Arc<dyn Page>) -> Self {
        Self { page, resolved: OnceLock::new() }
    }

    /// The memoized base path.
    pub fn get(&self) -> &str {
        self.resolved.get_or_init(|| {
            let base_path = self.page.attributes().resolve_base_path();
            tracing::debug!(base_path = %base_path, "Base path detected");
            base_path
        })
    }

    /// Prefixes a site-relative path with the base path.
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{path}", self.get())
    }
}

impl std::fmt::Debug for BasePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasePath")
            .field("page", &"<dyn Page>")
            .field("resolved", &self.resolved.get())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use googletest::prelude::*;
    use rstest::*;

    use super::*;
    use crate::page::StaticPage;
    use crate::types::PageAttributes;

    #[googletest::test]
    fn resolves_once_and_ignores_later_changes() {
        let page = Arc::new(
            StaticPage::parse("https://example.com/a/b/")
                .unwrap()
                .with_attributes(PageAttributes { base_path: None, depth: Some(2) }),
        );
        let base_path = BasePath::new(page.clone());

        expect_that!(base_path.get(), eq("../../"));

        page.set_attributes(PageAttributes { base_path: Some("/other/".to_string()), depth: None });

        expect_that!(base_path.get(), eq("../../"));
        expect_that!(base_path.url_for("assets/data/apps.json"), eq("../../assets/data/apps.json"));
    }

    #[rstest]
    fn explicit_base_path_wins() {
        let page = StaticPage::parse("https://example.com/")
            .unwrap()
            .with_attributes(PageAttributes { base_path: Some("/site/".to_string()), depth: Some(4) });
        let base_path = BasePath::new(Arc::new(page));

        assert_that!(base_path.url_for("core/i18n/es.json"), eq("/site/core/i18n/es.json"));
    }
}
