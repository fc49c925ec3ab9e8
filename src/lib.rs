//! site-i18n
//!
//! 多言語静的サイト向けの翻訳サービスとキャッシュ付き JSON リソースローダー

pub mod base_path;
pub mod config;
pub mod fetch;
pub mod i18n;
pub mod icons;
pub mod loader;
pub mod page;
pub mod storage;
pub mod tracing_config;
pub mod types;

#[cfg(test)]
mod test_utils;

// 主要な型を再エクスポート
pub use i18n::{
    Translate,
    TranslationService,
};
pub use icons::IconLoader;
pub use loader::ResourceLoader;
