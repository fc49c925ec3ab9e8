//! Command line entry point.
//!
//! Wires the translation service, the resource loader and the icon loader
//! against a site directory on disk or a site served over HTTP.

use std::io::Write;
use std::path::{
    Path,
    PathBuf,
};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{
    Parser,
    Subcommand,
};
use site_i18n::config::{
    ConfigError,
    ConfigManager,
};
use site_i18n::fetch::{
    Fetcher,
    FsFetcher,
    HttpFetcher,
};
use site_i18n::i18n::TranslationService;
use site_i18n::icons::IconLoader;
use site_i18n::loader::{
    LoadError,
    LoadOptions,
    ResourceLoader,
};
use site_i18n::page::StaticPage;
use site_i18n::storage::{
    FilePreferenceStore,
    PreferenceStore,
};
use site_i18n::tracing_config::init_tracing;
use thiserror::Error;
use url::Url;

/// Preference file written under the site root unless `--state` is given.
const STATE_FILE_NAME: &str = ".site-i18n-state.json";

#[derive(Parser, Debug)]
#[command(name = "site-i18n", version)]
#[command(about = "Translation and resource loading for a multilingual static site")]
struct Cli {
    /// Site root holding `.site-i18n.json` and, without --base-url, the site files
    #[arg(long, value_name = "DIR")]
    root: Option<PathBuf>,

    /// Fetch site files over HTTP from this URL instead of reading --root
    #[arg(long, value_name = "URL")]
    base_url: Option<Url>,

    /// Page URL, absolute or relative to the site (e.g. `feature/news/?lang=en`)
    #[arg(long, value_name = "PAGE_URL")]
    url: Option<String>,

    /// Runtime locale (defaults to $LANG)
    #[arg(long)]
    locale: Option<String>,

    /// File the language preference is persisted in
    #[arg(long, value_name = "FILE")]
    state: Option<PathBuf>,

    /// Also write logs to this file
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the translation of each key, one per line
    Translate {
        #[arg(required = true)]
        keys: Vec<String>,

        /// Interpolation parameter
        #[arg(long = "param", value_name = "NAME=VALUE", value_parser = parse_param)]
        params: Vec<(String, String)>,
    },

    /// Switch language, then print the active language and the page URL
    SetLanguage {
        code: String,
    },

    /// Print a JSON resource
    Load {
        /// Path relative to the site root, may contain `{lang}`
        path: String,

        #[arg(long)]
        lang: Option<String>,

        #[arg(long)]
        no_cache: bool,
    },

    /// Print the SVG of each icon
    Icon {
        #[arg(required = true)]
        names: Vec<String>,
    },
}

#[derive(Error, Debug)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid page URL '{url}': {source}")]
    InvalidUrl {
        /// 入力された URL
        url: String,
        /// パースエラー
        #[source]
        source: url::ParseError,
    },

    #[error("Site root '{}' cannot be expressed as a URL", .0.display())]
    InvalidRoot(PathBuf),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// `name=value` 形式のパラメータを分割する
fn parse_param(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .filter(|(name, _)| !name.is_empty())
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected NAME=VALUE, got '{raw}'"))
}

/// ページ URL を解決する（サイトの基準 URL からの相対指定も可）
fn page_url(site_url: &Url, page: Option<&str>) -> Result<Url, CliError> {
    let page = page.unwrap_or("");
    site_url.join(page).map_err(|source| CliError::InvalidUrl { url: page.to_string(), source })
}

/// `file:` のページ URL に対応するディレクトリ
fn page_dir(page_url: &Url, root: &Path) -> PathBuf {
    if page_url.scheme() == "file"
        && let Ok(path) = page_url.to_file_path()
    {
        if page_url.path().ends_with('/') {
            return path;
        }
        if let Some(parent) = path.parent() {
            return parent.to_path_buf();
        }
    }
    root.to_path_buf()
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let _guard = match init_tracing(cli.log_file.as_deref()) {
        Ok(guard) => guard,
        Err(error) => {
            let _ = writeln!(std::io::stderr(), "{error}");
            return ExitCode::FAILURE;
        }
    };

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!("{}", error);
            ExitCode::FAILURE
        }
    }
}

/// サブコマンドを実行する
async fn run(cli: Cli) -> Result<(), CliError> {
    let root = std::fs::canonicalize(cli.root.as_deref().unwrap_or_else(|| Path::new(".")))?;

    let mut config_manager = ConfigManager::new();
    config_manager.load_settings(Some(&root))?;
    let settings = config_manager.get_settings();

    let site_url = match &cli.base_url {
        Some(base_url) => base_url.clone(),
        None => Url::from_directory_path(&root).map_err(|()| CliError::InvalidRoot(root.clone()))?,
    };
    let page_url = page_url(&site_url, cli.url.as_deref())?;
    tracing::debug!(url = %page_url, "Page URL resolved");

    let mut page = StaticPage::new(page_url.clone()).with_attributes(settings.page_attributes());
    if let Some(locale) = cli.locale.or_else(|| std::env::var("LANG").ok()) {
        page = page.with_locale(locale);
    }
    let page = Arc::new(page);

    let fetcher: Arc<dyn Fetcher> = if cli.base_url.is_some() {
        Arc::new(HttpFetcher::new(page_url.clone()))
    } else {
        Arc::new(FsFetcher::new(&root, page_dir(&page_url, &root)))
    };
    let store: Arc<dyn PreferenceStore> =
        Arc::new(FilePreferenceStore::new(cli.state.unwrap_or_else(|| root.join(STATE_FILE_NAME))));

    let mut out = std::io::stdout();
    match cli.command {
        Command::Translate { keys, params } => {
            let translations = TranslationService::new(settings, fetcher, page, store);
            translations.initialize().await;

            let params: Vec<(&str, &str)> = params.iter().map(|(name, value)| (name.as_str(), value.as_str())).collect();
            for key in &keys {
                writeln!(out, "{}", translations.t(key, None, &params))?;
            }
        }
        Command::SetLanguage { code } => {
            let translations = TranslationService::new(settings, fetcher, page.clone(), store);
            translations.initialize().await;
            translations.set_language(&code).await;

            let language = translations.language().map(|language| language.to_string()).unwrap_or_default();
            writeln!(out, "{language}")?;
            writeln!(out, "{}", page.current_url())?;
        }
        Command::Load { path, lang, no_cache } => {
            let resources = ResourceLoader::new(fetcher, page);
            let options = LoadOptions { use_cache: !no_cache, language: lang.as_deref() };

            let value = resources.load(&path, options).await?;
            writeln!(out, "{}", serde_json::to_string_pretty(&*value)?)?;
        }
        Command::Icon { names } => {
            let icons = IconLoader::new(settings, fetcher, page);
            let names: Vec<&str> = names.iter().map(|name| icons.mapped(name)).collect();

            icons.preload(&names).await;
            for name in names {
                writeln!(out, "{}", icons.inline(name))?;
            }
        }
    }

    Ok(())
}
