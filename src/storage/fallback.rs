//! Local fallback copy of the form
//!
//! A single slot, keyed `requirement-draft`, holding the JSON form. It is a
//! last-resort recovery copy and never the source of truth.

use crate::state::RequirementFormData;
use parking_lot::Mutex;
use std::fs;
use std::path::{Path, PathBuf};

/// Key of the single fallback slot
pub const FALLBACK_KEY: &str = "requirement-draft";

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("fallback cache I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("fallback cache contents are not a valid form: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Single-slot local store for the form
pub trait FallbackCache: Send + Sync {
    fn store(&self, form: &RequirementFormData) -> Result<(), CacheError>;
    fn load(&self) -> Result<Option<RequirementFormData>, CacheError>;
}

/// Fallback cache stored as `{dir}/requirement-draft.json`
#[derive(Debug, Clone)]
pub struct FileFallbackCache {
    path: PathBuf,
}

impl FileFallbackCache {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(format!("{FALLBACK_KEY}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FallbackCache for FileFallbackCache {
    fn store(&self, form: &RequirementFormData) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string(form)?)?;
        Ok(())
    }

    fn load(&self) -> Result<Option<RequirementFormData>, CacheError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }
}

/// In-process fallback cache, holding the serialized form like a
/// key-value store would
#[derive(Debug, Default)]
pub struct MemoryFallbackCache {
    slot: Mutex<Option<String>>,
}

impl MemoryFallbackCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw JSON currently in the slot
    pub fn raw(&self) -> Option<String> {
        self.slot.lock().clone()
    }
}

impl FallbackCache for MemoryFallbackCache {
    fn store(&self, form: &RequirementFormData) -> Result<(), CacheError> {
        *self.slot.lock() = Some(serde_json::to_string(form)?);
        Ok(())
    }

    fn load(&self) -> Result<Option<RequirementFormData>, CacheError> {
        match self.slot.lock().as_deref() {
            Some(json) => Ok(Some(serde_json::from_str(json)?)),
            None => Ok(None),
        }
    }
}
