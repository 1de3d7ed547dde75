//! Draft persistence: the remote draft service and the local fallback copy

mod client;
mod error;
mod fallback;
mod traits;

pub use client::HttpDraftStorage;
pub use error::StorageError;
pub use fallback::{CacheError, FallbackCache, FileFallbackCache, MemoryFallbackCache, FALLBACK_KEY};
pub use traits::DraftStorage;

#[cfg(test)]
pub use traits::MockDraftStorage;
