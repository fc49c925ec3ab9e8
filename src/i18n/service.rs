//! Translation service: active language, its table, and change notification.

use std::sync::atomic::{
    AtomicBool,
    Ordering,
};
use std::sync::{
    Arc,
    PoisonError,
    RwLock,
};

use serde_json::{
    Value,
    json,
};
use tokio::sync::OnceCell;

use super::detect::{
    DetectionSources,
    detect_language,
};
use super::listeners::{
    ListenerId,
    Listeners,
};
use super::table::{
    TranslationTable,
    interpolate,
};
use super::translator::Translate;
use crate::base_path::BasePath;
use crate::config::SiteSettings;
use crate::fetch::Fetcher;
use crate::loader::LoadError;
use crate::page::Page;
use crate::storage::PreferenceStore;
use crate::types::{
    LANG_PLACEHOLDER,
    LanguageCode,
    SupportedLanguages,
};

/// Language and table, always replaced together.
#[derive(Debug, Default)]
struct ActiveTranslations {
    /// 有効な言語（未読み込みなら `None`）
    language: Option<LanguageCode>,
    /// その言語の翻訳テーブル
    table: Arc<TranslationTable>,
}

/// Owns the active language and its translation table.
///
/// Construct once per page, call [`initialize`](Self::initialize) before the
/// first lookup, and share it by `Arc`.
///
/// # Concurrency
///
/// Loads run without holding any lock; the (language, table) pair is swapped
/// in one step when a load completes. Overlapping
/// [`set_language`](Self::set_language) calls are not sequenced: the last load
/// to complete wins, even if it was not the last one requested.
pub struct TranslationService {
    /// サイトの対応言語
    languages: SupportedLanguages,
    /// 翻訳ファイルのパステンプレート（`{lang}` を含む）
    translations_path: String,
    /// 言語指定に使う URL クエリパラメータ名
    language_param: String,
    /// 言語設定の保存キー
    preference_key: String,

    /// 翻訳ファイルの取得
    fetcher: Arc<dyn Fetcher>,
    /// URL とロケールの読み取り、URL の更新
    page: Arc<dyn Page>,
    /// 言語設定の永続化
    store: Arc<dyn PreferenceStore>,
    /// 翻訳ファイルの URL の接頭辞
    base_path: BasePath,

    /// 言語とテーブルの組
    active: RwLock<ActiveTranslations>,
    /// 初期化済みフラグ（初期化処理は一度だけ）
    initialized: OnceCell<()>,
    /// 初期化時に翻訳を読み込めたか
    translations_loaded: AtomicBool,
    /// 言語変更リスナー
    listeners: Listeners,
}

impl TranslationService {
    /// `settings` should have passed [`SiteSettings::validate`].
    #[must_use]
    pub fn new(
        settings: &SiteSettings,
        fetcher: Arc<dyn Fetcher>,
        page: Arc<dyn Page>,
        store: Arc<dyn PreferenceStore>,
    ) -> Self {
        Self {
            languages: settings.languages(),
            translations_path: settings.translations_path.clone(),
            language_param: settings.language_param.clone(),
            preference_key: settings.preference_key.clone(),
            base_path: BasePath::new(Arc::clone(&page)),
            fetcher,
            page,
            store,
            active: RwLock::new(ActiveTranslations::default()),
            initialized: OnceCell::new(),
            translations_loaded: AtomicBool::new(false),
            listeners: Listeners::new(),
        }
    }

    /// Determines the language to start with.
    ///
    /// Priority: URL parameter, persisted preference, runtime locale, default.
    /// Unsupported values are skipped.
    #[must_use]
    pub fn detect_language(&self) -> LanguageCode {
        let sources = DetectionSources {
            url_param: self.page.query_param(&self.language_param),
            stored: self.store.get(&self.preference_key),
            locale: self.page.locale(),
        };
        detect_language(&self.languages, &sources)
    }

    /// Detects the language and loads its table.
    ///
    /// Runs once; later and concurrent calls wait for the first one and
    /// return without fetching again. Completes even when no table could be
    /// loaded, in which case lookups fall back to caller-supplied text.
    pub async fn initialize(&self) -> &Self {
        self.initialized
            .get_or_init(|| async {
                tracing::info!(base_path = %self.base_path.get(), "Base path detected");

                let language = self.detect_language();
                tracing::info!(language = %language, "Language detected");

                let loaded = self.load_and_commit(language.as_str()).await;
                self.translations_loaded.store(loaded.is_some(), Ordering::SeqCst);

                if let Some(active) = loaded {
                    self.save_preference(&active);
                    tracing::info!(language = %active, "Initialized successfully");
                } else {
                    tracing::error!("Initialized but translations not loaded - fallbacks will be used");
                }
            })
            .await;
        self
    }

    /// Loads the table for `language`, falling back to the default language once.
    ///
    /// Returns `false` if the language is unsupported (nothing is fetched) or
    /// if neither attempt succeeded; the previous language and table are then
    /// left untouched.
    pub async fn load_translations(&self, language: &str) -> bool {
        self.load_and_commit(language).await.is_some()
    }

    /// Returns the language that became active.
    async fn load_and_commit(&self, language: &str) -> Option<LanguageCode> {
        let Some(requested) = self.languages.resolve(language) else {
            tracing::warn!(language, "Language is not supported");
            return None;
        };
        let default = self.languages.default_language();
        let attempts = std::iter::once(requested).chain((requested != default).then_some(default));

        for (attempt, candidate) in attempts.enumerate() {
            if attempt > 0 {
                tracing::info!(language = %candidate, "Trying fallback language");
            }
            match self.fetch_table(candidate).await {
                Ok(table) => {
                    self.commit(candidate.clone(), table);
                    tracing::info!(language = %candidate, "Translations loaded successfully");
                    return Some(candidate.clone());
                }
                Err(error) => {
                    tracing::error!(language = %candidate, "Error loading translations: {}", error);
                }
            }
        }

        None
    }

    /// 一言語分の翻訳テーブルを取得する
    async fn fetch_table(&self, language: &LanguageCode) -> Result<TranslationTable, LoadError> {
        let path = self.translations_path.replace(LANG_PLACEHOLDER, language.as_str());
        let url = self.base_path.url_for(&path);
        tracing::debug!(url = %url, "Loading translations");

        let response = self
            .fetcher
            .fetch(&url)
            .await
            .map_err(|source| LoadError::Fetch { path: path.clone(), source })?;

        if !response.is_success() {
            return Err(LoadError::Status { path, status: response.status });
        }

        serde_json::from_slice(&response.body).map_err(|source| LoadError::Parse { path, source })
    }

    /// 言語とテーブルを同時に差し替える
    fn commit(&self, language: LanguageCode, table: TranslationTable) {
        let mut active = self.active.write().unwrap_or_else(PoisonError::into_inner);
        *active = ActiveTranslations { language: Some(language), table: Arc::new(table) };
    }

    /// 言語設定を保存する（失敗は警告のみ）
    fn save_preference(&self, language: &LanguageCode) {
        if let Err(error) = self.store.set(&self.preference_key, language.as_str()) {
            tracing::warn!(language = %language, "Failed to persist language preference: {}", error);
        }
    }

    /// Switches to `language` and notifies listeners.
    ///
    /// No-op for unsupported or already active languages. If the load falls
    /// back to the default language, the default is what gets persisted and
    /// announced. If nothing could be loaded, nothing changes.
    pub async fn set_language(&self, language: &str) {
        let Some(requested) = self.languages.resolve(language) else {
            tracing::warn!(language, "Language is not supported");
            return;
        };
        if self.language().as_ref() == Some(requested) {
            return;
        }

        let Some(active) = self.load_and_commit(requested.as_str()).await else {
            tracing::warn!(language = %requested, "Language unchanged, translations unavailable");
            return;
        };

        self.save_preference(&active);
        self.listeners.notify(&active);
        self.page.replace_query_param(&self.language_param, active.as_str());
    }

    /// Resolves `key` against the active table.
    ///
    /// A missing key or non-text value yields `fallback`, or `key` itself when
    /// no fallback is given. Every `{name}` with a value in `params` is
    /// substituted in the returned text; other placeholders stay literal.
    #[must_use]
    pub fn t(&self, key: &str, fallback: Option<&str>, params: &[(&str, &str)]) -> String {
        let table = self.table();
        if let Some(text) = table.lookup(key) {
            return interpolate(text, params);
        }

        match fallback {
            Some(fallback) => interpolate(fallback, params),
            None => {
                tracing::debug!(key, "Translation key not found");
                key.to_string()
            }
        }
    }

    /// Registers a listener called with the new language after every
    /// completed [`set_language`](Self::set_language).
    pub fn on_language_change<F>(&self, callback: F) -> ListenerId
    where
        F: Fn(&LanguageCode) + Send + Sync + 'static,
    {
        self.listeners.add(Arc::new(callback))
    }

    /// Returns `false` if the listener was not registered.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    /// Active language, unset until a table has been loaded.
    #[must_use]
    pub fn language(&self) -> Option<LanguageCode> {
        self.active.read().unwrap_or_else(PoisonError::into_inner).language.clone()
    }

    /// 現在のテーブル
    fn table(&self) -> Arc<TranslationTable> {
        Arc::clone(&self.active.read().unwrap_or_else(PoisonError::into_inner).table)
    }

    #[must_use]
    pub const fn supported_languages(&self) -> &SupportedLanguages {
        &self.languages
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized.initialized()
    }

    /// Whether [`initialize`](Self::initialize) managed to load a table.
    #[must_use]
    pub fn translations_loaded(&self) -> bool {
        self.translations_loaded.load(Ordering::SeqCst)
    }

    /// The table's `meta` object, or `{"lang": <active language>}`.
    #[must_use]
    pub fn lang_info(&self) -> Value {
        let active = self.active.read().unwrap_or_else(PoisonError::into_inner);
        match active.table.get("meta") {
            Some(meta @ Value::Object(_)) => meta.clone(),
            _ => json!({ "lang": active.language }),
        }
    }

    #[must_use]
    pub fn base_path(&self) -> &str {
        self.base_path.get()
    }
}

impl Translate for TranslationService {
    fn t(&self, key: &str, fallback: Option<&str>, params: &[(&str, &str)]) -> String {
        Self::t(self, key, fallback, params)
    }

    fn language(&self) -> Option<LanguageCode> {
        Self::language(self)
    }
}

impl std::fmt::Debug for TranslationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslationService")
            .field("languages", &self.languages)
            .field("language", &self.language())
            .field("initialized", &self.is_initialized())
            .field("translations_loaded", &self.translations_loaded())
            .field("listeners", &self.listeners)
            .finish_non_exhaustive()
    }
}
