//! Cached JSON resource loading.

use std::sync::Arc;

use serde_json::Value;

use super::cache::{
    CacheKey,
    ResourceCache,
};
use super::error::LoadError;
use crate::base_path::BasePath;
use crate::fetch::Fetcher;
use crate::page::Page;
use crate::types::LANG_PLACEHOLDER;

/// Options for [`ResourceLoader::load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions<'a> {
    /// Read from and write to the cache.
    pub use_cache: bool,
    /// Substituted for every `{lang}` in the path.
    pub language: Option<&'a str>,
}

impl Default for LoadOptions<'_> {
    fn default() -> Self {
        Self { use_cache: true, language: None }
    }
}

impl<'a> LoadOptions<'a> {
    #[must_use]
    pub fn for_language(language: &'a str) -> Self {
        Self { language: Some(language), ..Self::default() }
    }

    #[must_use]
    pub const fn without_cache(self) -> Self {
        Self { use_cache: false, ..self }
    }
}

/// One entry of a [`ResourceLoader::preload`] batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreloadRequest {
    pub path: String,
    pub language: Option<String>,
}

impl PreloadRequest {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into(), language: None }
    }

    #[must_use]
    pub fn with_language(path: impl Into<String>, language: impl Into<String>) -> Self {
        Self { path: path.into(), language: Some(language.into()) }
    }
}

/// Substitutes the language into a path template. An empty language counts
/// as no language.
///
/// # Errors
/// Returns [`LoadError::MissingLanguage`] if the path still contains the
/// placeholder and no language was given.
fn resolve_path(path: &str, language: Option<&str>) -> Result<String, LoadError> {
    match language.filter(|language| !language.is_empty()) {
        Some(language) => Ok(path.replace(LANG_PLACEHOLDER, language)),
        None if path.contains(LANG_PLACEHOLDER) => {
            Err(LoadError::MissingLanguage { path: path.to_string() })
        }
        None => Ok(path.to_string()),
    }
}

/// Fetches site JSON relative to the page's base path, deduplicating by
/// (path, language) through an in-memory cache.
pub struct ResourceLoader {
    /// リソースの取得
    fetcher: Arc<dyn Fetcher>,
    /// 取得 URL の接頭辞
    base_path: BasePath,
    /// `(パス, 言語)` 単位のキャッシュ
    cache: ResourceCache,
}

impl ResourceLoader {
    #[must_use]
    pub fn new(fetcher: Arc<dyn Fetcher>, page: Arc<dyn Page>) -> Self {
        Self { fetcher, base_path: BasePath::new(page), cache: ResourceCache::new() }
    }

    /// Base path every request is prefixed with.
    pub fn base_path(&self) -> &str {
        self.base_path.get()
    }

    /// Loads a JSON resource.
    ///
    /// A cache hit returns without touching the network.
    ///
    /// # Errors
    /// - The path template needs a language that was not given
    /// - The request failed or answered a non-success status
    /// - The body is not valid JSON
    pub async fn load(&self, path: &str, options: LoadOptions<'_>) -> Result<Arc<Value>, LoadError> {
        let language = options.language.filter(|language| !language.is_empty());
        let resolved = resolve_path(path, language)?;
        let key = CacheKey::new(&resolved, language);

        if options.use_cache
            && let Some(value) = self.cache.get(&key)
        {
            tracing::debug!(path = %resolved, "Cache hit");
            return Ok(value);
        }

        let value = match self.fetch_json(&resolved).await {
            Ok(value) => Arc::new(value),
            Err(error) => {
                tracing::error!(path = %path, "Error loading resource: {}", error);
                return Err(error);
            }
        };

        if options.use_cache {
            self.cache.insert(key, Arc::clone(&value));
        }

        tracing::debug!(path = %resolved, "Loaded successfully");
        Ok(value)
    }

    /// `{ベースパス}{パス}` を取得して JSON としてパースする
    async fn fetch_json(&self, resolved: &str) -> Result<Value, LoadError> {
        let url = self.base_path.url_for(resolved);
        tracing::debug!(url = %url, "Loading");

        let response = self
            .fetcher
            .fetch(&url)
            .await
            .map_err(|source| LoadError::Fetch { path: resolved.to_string(), source })?;

        if !response.is_success() {
            return Err(LoadError::Status { path: resolved.to_string(), status: response.status });
        }

        serde_json::from_slice(&response.body)
            .map_err(|source| LoadError::Parse { path: resolved.to_string(), source })
    }

    /// Loads every request concurrently.
    ///
    /// The result has one slot per request, in order; failed loads leave `None`.
    pub async fn preload(&self, requests: &[PreloadRequest]) -> Vec<Option<Arc<Value>>> {
        let loads = requests.iter().map(|request| async move {
            let options = LoadOptions { use_cache: true, language: request.language.as_deref() };
            match self.load(&request.path, options).await {
                Ok(value) => Some(value),
                Err(error) => {
                    tracing::warn!(path = %request.path, "Preload failed: {}", error);
                    None
                }
            }
        });

        futures::future::join_all(loads).await
    }

    /// Drops cached entries: all of them, or those whose key contains `pattern`.
    pub fn clear_cache(&self, pattern: Option<&str>) {
        let removed = match pattern {
            Some(pattern) => self.cache.remove_matching(pattern),
            None => self.cache.clear(),
        };
        tracing::debug!(pattern = ?pattern, removed, "Cache cleared");
    }

    /// Number of cached entries.
    #[must_use]
    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }

    /// Detail data of one application.
    pub async fn load_app_data(&self, app_id: &str, language: &str) -> Result<Arc<Value>, LoadError> {
        let path = format!("feature/applications/{app_id}/data/{LANG_PLACEHOLDER}.json");
        self.load(&path, LoadOptions::for_language(language)).await
    }

    /// Privacy policy of one application.
    pub async fn load_privacy_data(
        &self,
        app_id: &str,
        language: &str,
    ) -> Result<Arc<Value>, LoadError> {
        let path = format!("feature/applications/{app_id}/privacy/{LANG_PLACEHOLDER}.json");
        self.load(&path, LoadOptions::for_language(language)).await
    }

    pub async fn load_news(&self, language: &str) -> Result<Arc<Value>, LoadError> {
        let path = format!("feature/news/data/{LANG_PLACEHOLDER}.json");
        self.load(&path, LoadOptions::for_language(language)).await
    }

    pub async fn load_team(&self, language: &str) -> Result<Arc<Value>, LoadError> {
        let path = format!("assets/data/team/{LANG_PLACEHOLDER}.json");
        self.load(&path, LoadOptions::for_language(language)).await
    }

    pub async fn load_apps_list(&self) -> Result<Arc<Value>, LoadError> {
        self.load("assets/data/apps.json", LoadOptions::default()).await
    }
}

impl std::fmt::Debug for ResourceLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceLoader")
            .field("fetcher", &"<dyn Fetcher>")
            .field("base_path", &self.base_path)
            .field("cache", &self.cache)
            .finish()
    }
}
