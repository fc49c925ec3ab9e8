//! Network access used by the loaders.
//!
//! Every request is a relative URL built as `{base path}{resource path}`.
//! How that URL reaches bytes is up to the [`Fetcher`] implementation:
//! [`FsFetcher`] resolves it against a directory on disk, [`HttpFetcher`]
//! against the URL of the page.

use std::io;
use std::path::{
    Path,
    PathBuf,
};

use async_trait::async_trait;
use thiserror::Error;
use url::Url;

/// Transport-level failures. Non-success statuses are not errors here; they are
/// reported through [`FetchResponse::status`].
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Status and body of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl FetchResponse {
    #[must_use]
    pub const fn new(status: u16, body: Vec<u8>) -> Self {
        Self { status, body }
    }

    #[must_use]
    pub const fn not_found() -> Self {
        Self { status: 404, body: Vec::new() }
    }

    /// `true` for 2xx statuses.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Issues a GET for a relative URL.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// # Errors
    /// Returns an error if the request could not be completed at all.
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError>;
}

/// Serves requests from the file system, like a static file server rooted at
/// the site directory.
///
/// Relative URLs resolve against the page's directory, URLs starting with `/`
/// against the site root. Missing files answer with a 404 response.
#[derive(Debug, Clone)]
pub struct FsFetcher {
    /// `/` で始まる URL の基準ディレクトリ
    site_root: PathBuf,
    /// 相対 URL の基準ディレクトリ
    page_dir: PathBuf,
}

impl FsFetcher {
    #[must_use]
    pub fn new(site_root: impl Into<PathBuf>, page_dir: impl Into<PathBuf>) -> Self {
        Self { site_root: site_root.into(), page_dir: page_dir.into() }
    }

    #[must_use]
    pub fn site_root(&self) -> &Path {
        &self.site_root
    }

    #[must_use]
    pub fn page_dir(&self) -> &Path {
        &self.page_dir
    }

    /// URL をファイルパスに変換する（クエリとフラグメントは無視）
    fn resolve(&self, url: &str) -> PathBuf {
        let path = url.split(['?', '#']).next().unwrap_or(url);
        match path.strip_prefix('/') {
            Some(absolute) => self.site_root.join(absolute.trim_start_matches('/')),
            None => self.page_dir.join(path),
        }
    }
}

#[async_trait]
impl Fetcher for FsFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
        let path = self.resolve(url);
        tracing::trace!(url, path = %path.display(), "Reading file");

        match tokio::fs::read(&path).await {
            Ok(body) => Ok(FetchResponse::new(200, body)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(FetchResponse::not_found()),
            Err(e) => Err(FetchError::Io(e)),
        }
    }
}

/// Serves requests over HTTP, resolving relative URLs against the page URL.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    /// HTTP クライアント
    client: reqwest::Client,
    /// 相対 URL の基準
    page_url: Url,
}

impl HttpFetcher {
    #[must_use]
    pub fn new(page_url: Url) -> Self {
        Self { client: reqwest::Client::new(), page_url }
    }

    #[must_use]
    pub fn with_client(client: reqwest::Client, page_url: Url) -> Self {
        Self { client, page_url }
    }

    /// ページ URL を基準に絶対 URL を作る
    fn resolve(&self, url: &str) -> Result<Url, FetchError> {
        self.page_url
            .join(url)
            .map_err(|source| FetchError::InvalidUrl { url: url.to_string(), source })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
        let target = self.resolve(url)?;
        tracing::trace!(url = %target, "Sending request");

        let response = self.client.get(target).send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();

        Ok(FetchResponse::new(status, body))
    }
}
