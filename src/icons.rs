//! SVG icon loading with an in-memory cache.

use std::collections::HashMap;
use std::sync::{
    Arc,
    PoisonError,
    RwLock,
};

use futures::future::join_all;

use crate::base_path::BasePath;
use crate::config::SiteSettings;
use crate::fetch::Fetcher;
use crate::page::Page;

/// Glyph served for icons that could not be loaded.
pub const FALLBACK_ICON: &str = concat!(
    r#"<svg xmlns="http://www.w3.org/2000/svg" width="24" height="24" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2">"#,
    r#"<circle cx="12" cy="12" r="10"/><line x1="12" y1="8" x2="12" y2="12"/><line x1="12" y1="16" x2="12.01" y2="16"/></svg>"#,
);

/// Default edge length of a placeholder, in pixels.
pub const DEFAULT_ICON_SIZE: u32 = 24;

/// Maps a content key to its icon file name. Unknown keys map to themselves.
///
/// ```
/// use site_i18n::icons::mapped_icon;
///
/// assert_eq!(mapped_icon("android"), "smartphone");
/// assert_eq!(mapped_icon("arrow-left"), "arrow-left");
/// ```
#[must_use]
pub fn mapped_icon(key: &str) -> &str {
    match key {
        // プラットフォーム
        "web" => "globe",
        "android" => "smartphone",
        "ios" => "apple",
        "windows" => "desktop",
        "mac" => "monitor",
        // About
        "mission" => "target",
        "vision" => "eye",
        "values" => "gem",
        // チーム
        "developer" => "code",
        "designer" => "palette",
        "game-designer" => "gamepad",
        "news" => "newspaper",
        other => other,
    }
}

/// Presentation options for [`IconLoader::placeholder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconOptions<'a> {
    pub size: u32,
    /// Extra classes appended after `icon`.
    pub class_name: &'a str,
    /// Accessible name; an unlabelled icon is hidden from assistive technology.
    pub aria_label: Option<&'a str>,
}

impl Default for IconOptions<'_> {
    fn default() -> Self {
        Self { size: DEFAULT_ICON_SIZE, class_name: "", aria_label: None }
    }
}

/// Loads `<name>.svg` files from the site's icon directory.
pub struct IconLoader {
    /// SVG の取得に使う
    fetcher: Arc<dyn Fetcher>,
    /// サイトルートへの相対パス
    base_path: BasePath,
    /// アイコンディレクトリ（末尾の `/` なし）
    icons_path: String,
    /// アイコン名 → SVG（取得に成功したものだけ）
    cache: RwLock<HashMap<String, Arc<str>>>,
}

impl IconLoader {
    #[must_use]
    pub fn new(settings: &SiteSettings, fetcher: Arc<dyn Fetcher>, page: Arc<dyn Page>) -> Self {
        Self {
            fetcher,
            base_path: BasePath::new(page),
            icons_path: settings.icons_path.trim_end_matches('/').to_string(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the SVG for `name`, fetching it on a cache miss.
    ///
    /// Any failure yields [`FALLBACK_ICON`], which is not cached so a later
    /// call retries.
    pub async fn load(&self, name: &str) -> Arc<str> {
        if let Some(svg) = self.cached(name) {
            return svg;
        }

        let url = self.base_path.url_for(&format!("{}/{name}.svg", self.icons_path));
        let svg = match self.fetcher.fetch(&url).await {
            Ok(response) if response.is_success() => String::from_utf8(response.body).ok(),
            Ok(response) => {
                tracing::debug!(url = %url, status = response.status, "Icon request failed");
                None
            }
            Err(error) => {
                tracing::debug!(url = %url, "Icon request failed: {}", error);
                None
            }
        };

        let Some(svg) = svg else {
            tracing::warn!(icon = name, "Icon not found, using fallback");
            return Arc::from(FALLBACK_ICON);
        };

        let svg: Arc<str> = Arc::from(svg);
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), Arc::clone(&svg));
        svg
    }

    /// Cached SVG for `name`, or the fallback glyph. Never fetches.
    #[must_use]
    pub fn inline(&self, name: &str) -> Arc<str> {
        self.cached(name).unwrap_or_else(|| Arc::from(FALLBACK_ICON))
    }

    /// Loads every icon concurrently.
    pub async fn preload(&self, names: &[&str]) {
        join_all(names.iter().map(|name| self.load(name))).await;
    }

    /// See [`mapped_icon`].
    #[must_use]
    pub fn mapped<'k>(&self, key: &'k str) -> &'k str {
        mapped_icon(key)
    }

    /// Markup for an empty icon slot, to be filled with the SVG later.
    #[must_use]
    pub fn placeholder(&self, name: &str, options: &IconOptions<'_>) -> String {
        let mut class = String::from("icon");
        if !options.class_name.is_empty() {
            class.push(' ');
            class.push_str(options.class_name);
        }

        let aria = match options.aria_label.filter(|label| !label.is_empty()) {
            Some(label) => format!(r#"aria-label="{}" role="img""#, escape_attribute(label)),
            None => r#"aria-hidden="true""#.to_string(),
        };
        let class = escape_attribute(&class);
        let name = escape_attribute(name);
        let size = options.size;

        format!(
            r#"<span class="{class}" data-icon="{name}" {aria} style="width:{size}px;height:{size}px;display:inline-flex;align-items:center;justify-content:center;"></span>"#
        )
    }

    #[must_use]
    pub fn cache_size(&self) -> usize {
        self.cache.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// キャッシュ済みの SVG
    fn cached(&self, name: &str) -> Option<Arc<str>> {
        self.cache.read().unwrap_or_else(PoisonError::into_inner).get(name).cloned()
    }
}

impl std::fmt::Debug for IconLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IconLoader")
            .field("base_path", &self.base_path)
            .field("icons_path", &self.icons_path)
            .field("cached", &self.cache_size())
            .finish_non_exhaustive()
    }
}

/// HTML 属性値としてエスケープする
fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use googletest::prelude::*;
    use rstest::*;
    use serde_json::json;

    use super::*;
    use crate::test_utils::{
        ScriptedFetcher,
        create_page,
    };

    const GLOBE: &str = r#"<svg viewBox="0 0 24 24"><circle r="10"/></svg>"#;

    fn icon_loader(fetcher: &Arc<ScriptedFetcher>, depth: u32) -> IconLoader {
        IconLoader::new(
            &SiteSettings::default(),
            fetcher.clone(),
            Arc::new(create_page("https://example.com/", None, depth)),
        )
    }

    #[rstest]
    #[case("web", "globe")]
    #[case("ios", "apple")]
    #[case("game-designer", "gamepad")]
    #[case("news", "newspaper")]
    #[case("linux", "linux")]
    #[case("unknown-key", "unknown-key")]
    fn test_mapped_icon(#[case] key: &str, #[case] expected: &str) {
        assert_that!(mapped_icon(key), eq(expected));
    }

    #[tokio::test]
    async fn load_fetches_once_under_base_path() {
        let fetcher = Arc::new(ScriptedFetcher::new().with_response("../core/assets/globe.svg", 200, GLOBE));
        let icons = icon_loader(&fetcher, 1);

        let first = icons.load("globe").await;
        let second = icons.load("globe").await;

        assert_that!(&*first, eq(GLOBE));
        assert_that!(&*second, eq(GLOBE));
        assert_that!(fetcher.request_count("../core/assets/globe.svg"), eq(1));
        assert_that!(&*icons.inline("globe"), eq(GLOBE));
    }

    #[tokio::test]
    async fn missing_icon_falls_back_without_caching() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        let icons = icon_loader(&fetcher, 0);

        let svg = icons.load("rocket").await;
        assert_that!(&*svg, eq(FALLBACK_ICON));
        assert_that!(icons.cache_size(), eq(0));

        fetcher.set_response("core/assets/rocket.svg", 200, GLOBE);
        let svg = icons.load("rocket").await;
        assert_that!(&*svg, eq(GLOBE));
        assert_that!(fetcher.request_count("core/assets/rocket.svg"), eq(2));
    }

    #[googletest::test]
    fn inline_never_fetches() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        let icons = icon_loader(&fetcher, 0);

        expect_that!(&*icons.inline("globe"), eq(FALLBACK_ICON));
        expect_that!(fetcher.requests(), is_empty());
    }

    #[tokio::test]
    async fn preload_loads_all_names() {
        let fetcher = Arc::new(
            ScriptedFetcher::new()
                .with_response("core/assets/globe.svg", 200, GLOBE)
                .with_json("core/assets/eye.svg", &json!("not really svg")),
        );
        let icons = icon_loader(&fetcher, 0);

        icons.preload(&["globe", "eye", "missing"]).await;

        assert_that!(icons.cache_size(), eq(2));
        assert_that!(&*icons.inline("missing"), eq(FALLBACK_ICON));
    }

    #[rstest]
    fn placeholder_hides_unlabelled_icons() {
        let icons = icon_loader(&Arc::new(ScriptedFetcher::new()), 0);

        let markup = icons.placeholder("globe", &IconOptions::default());

        assert_that!(
            markup.as_str(),
            eq(concat!(
                r#"<span class="icon" data-icon="globe" aria-hidden="true" "#,
                r#"style="width:24px;height:24px;display:inline-flex;align-items:center;justify-content:center;"></span>"#
            ))
        );
    }

    #[googletest::test]
    fn placeholder_labels_icons() {
        let icons = icon_loader(&Arc::new(ScriptedFetcher::new()), 0);
        let options = IconOptions { size: 32, class_name: "feature-icon", aria_label: Some("Say \"hi\"") };

        let markup = icons.placeholder(icons.mapped("mission"), &options);

        expect_that!(markup.as_str(), starts_with(r#"<span class="icon feature-icon" data-icon="target" "#));
        expect_that!(markup.as_str(), contains_substring(r#"aria-label="Say &quot;hi&quot;" role="img""#));
        expect_that!(markup.as_str(), contains_substring("width:32px;height:32px;"));
        expect_that!(markup.as_str(), not(contains_substring("aria-hidden")));
    }
}
