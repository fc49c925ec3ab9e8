//! In-memory cache of loaded resources.

use std::collections::HashMap;
use std::fmt;
use std::sync::{
    Arc,
    PoisonError,
    RwLock,
};

use serde_json::Value;

/// Identity of a cached resource: the substituted path plus the language
/// argument it was requested with.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(
    /// `{path}:{lang}`
    String,
);

impl CacheKey {
    #[must_use]
    pub fn new(resolved_path: &str, language: Option<&str>) -> Self {
        Self(format!("{resolved_path}:{}", language.unwrap_or_default()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Write-once entries; values are shared, never mutated.
#[derive(Debug, Default)]
pub struct ResourceCache {
    /// キー → 読み込み済みの値
    entries: RwLock<HashMap<CacheKey, Arc<Value>>>,
}

impl ResourceCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, key: &CacheKey) -> Option<Arc<Value>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).get(key).cloned()
    }

    pub fn insert(&self, key: CacheKey, value: Arc<Value>) {
        self.entries.write().unwrap_or_else(PoisonError::into_inner).insert(key, value);
    }

    /// Removes every entry; returns how many were dropped.
    pub fn clear(&self) -> usize {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let removed = entries.len();
        entries.clear();
        removed
    }

    /// Removes entries whose key contains `pattern`; returns how many were dropped.
    pub fn remove_matching(&self, pattern: &str) -> usize {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|key, _| !key.as_str().contains(pattern));
        before - entries.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
