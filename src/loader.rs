//! JSON resource loading with a per-(path, language) cache.

/// Loaded resource cache
mod cache;
/// Load errors
mod error;
/// Resource loader
mod resource;

pub use cache::{
    CacheKey,
    ResourceCache,
};
pub use error::LoadError;
pub use resource::{
    LoadOptions,
    PreloadRequest,
    ResourceLoader,
};
