//! テスト用ユーティリティ関数
//!
//! 複数のテストモジュールで使用される共通のヘルパーを提供します。
#![cfg(test)]

use std::collections::HashMap;
use std::sync::{
    Arc,
    Mutex,
    PoisonError,
};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Notify;

use crate::fetch::{
    FetchError,
    FetchResponse,
    Fetcher,
};
use crate::page::StaticPage;
use crate::types::PageAttributes;

/// In-memory [`Fetcher`] with canned responses and a request log.
///
/// Unknown URLs answer 404. Every request yields to the scheduler once so that
/// concurrent callers actually interleave.
#[derive(Debug, Default)]
pub(crate) struct ScriptedFetcher {
    /// URL → 応答
    responses: Mutex<HashMap<String, FetchResponse>>,
    /// URL → 応答前に待機するゲート
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    /// 受け付けたリクエストの URL（受付順）
    requests: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// `url` に JSON を返すよう設定
    pub(crate) fn with_json(self, url: &str, json: &Value) -> Self {
        self.set_json(url, json);
        self
    }

    /// `url` に任意のステータスと本文を返すよう設定
    pub(crate) fn with_response(self, url: &str, status: u16, body: &str) -> Self {
        self.set_response(url, status, body);
        self
    }

    pub(crate) fn set_json(&self, url: &str, json: &Value) {
        self.set_response(url, 200, &json.to_string());
    }

    pub(crate) fn set_response(&self, url: &str, status: u16, body: &str) {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(url.to_string(), FetchResponse::new(status, body.as_bytes().to_vec()));
    }

    /// `url` への応答を、返されたゲートが通知されるまで保留する
    pub(crate) fn gate(&self, url: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(url.to_string(), Arc::clone(&gate));
        gate
    }

    pub(crate) fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub(crate) fn request_count(&self, url: &str) -> usize {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).iter().filter(|r| *r == url).count()
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).push(url.to_string());

        let gate = self.gates.lock().unwrap_or_else(PoisonError::into_inner).get(url).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        } else {
            tokio::task::yield_now().await;
        }

        let response = self.responses.lock().unwrap_or_else(PoisonError::into_inner).get(url).cloned();
        Ok(response.unwrap_or_else(FetchResponse::not_found))
    }
}

/// テスト用のページを作成する
///
/// # Arguments
/// * `url` - ページの URL
/// * `locale` - ランタイムのロケール
/// * `depth` - サイトルートまでの階層数
#[allow(clippy::panic)]
pub(crate) fn create_page(url: &str, locale: Option<&str>, depth: u32) -> StaticPage {
    let page = StaticPage::parse(url)
        .unwrap_or_else(|e| panic!("invalid test URL {url}: {e}"))
        .with_attributes(PageAttributes { base_path: None, depth: Some(depth) });
    match locale {
        Some(locale) => page.with_locale(locale),
        None => page,
    }
}
