//! Language change observers.

use std::panic::{
    AssertUnwindSafe,
    catch_unwind,
};
use std::sync::atomic::{
    AtomicU64,
    Ordering,
};
use std::sync::{
    Arc,
    Mutex,
    PoisonError,
};

use crate::types::LanguageCode;

/// Callback run after every completed language change.
pub type LanguageListener = Arc<dyn Fn(&LanguageCode) + Send + Sync>;

/// Handle returned on registration, used to unregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(
    /// 登録順の連番
    u64,
);

/// Listeners in registration order.
#[derive(Default)]
pub struct Listeners {
    /// 次に払い出す ID
    next_id: AtomicU64,
    /// 登録順のリスナー
    entries: Mutex<Vec<(ListenerId, LanguageListener)>>,
}

impl Listeners {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, listener: LanguageListener) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).push((id, listener));
        id
    }

    /// Returns `false` if `id` was not registered.
    pub fn remove(&self, id: ListenerId) -> bool {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        entries.len() != before
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Calls every listener with `language`.
    ///
    /// Runs on a snapshot, so listeners may register or unregister others.
    /// A panicking listener is logged and skipped.
    pub fn notify(&self, language: &LanguageCode) {
        let snapshot: Vec<_> = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(id, listener)| (*id, Arc::clone(listener)))
            .collect();

        for (id, listener) in snapshot {
            if catch_unwind(AssertUnwindSafe(|| listener(language))).is_err() {
                tracing::error!(listener = ?id, language = %language, "Language listener panicked");
            }
        }
    }
}

impl std::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners").field("len", &self.len()).finish()
    }
}
