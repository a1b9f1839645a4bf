//! Memoization of code point queries. Resolving a query against the database walks every assigned
//! code point, so results are kept by content hash, in memory and optionally as JSON files.

use crate::collections::Map;
use crate::sparse_set::SparseSet;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("unable to access cache file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unable to serialize cache entry")]
    Json(#[from] serde_json::Error),
}

/// Lowercase hex SHA-256 of the JSON serialization of `value`.
pub fn content_hash<T: Serialize + ?Sized>(value: &T) -> Result<String, CacheError> {
    let json = serde_json::to_vec(value)?;
    let digest = Sha256::digest(&json);
    Ok(digest.iter().map(|byte| format!("{:02x}", byte)).collect())
}

#[derive(Debug, Default)]
pub struct CodePointCache {
    sets: Map<String, SparseSet>,
    dir: Option<PathBuf>,
}

impl CodePointCache {
    /// A cache that persists entries in `dir`.
    pub fn new(dir: PathBuf) -> CodePointCache {
        CodePointCache {
            sets: Default::default(),
            dir: Some(dir),
        }
    }

    pub fn in_memory() -> CodePointCache {
        Default::default()
    }

    fn path(dir: &Path, hash: &str) -> PathBuf {
        dir.join(format!("Unicode_CodePoints_{}.json", hash))
    }

    /// Look up `hash`, reading the cache directory on a memory miss. Unreadable or corrupt files
    /// are treated as misses.
    pub fn get(&mut self, hash: &str) -> Option<&SparseSet> {
        if !self.sets.contains_key(hash) {
            let path = Self::path(self.dir.as_deref()?, hash);
            let text = fs::read_to_string(&path).ok()?;
            match serde_json::from_str::<SparseSet>(&text) {
                Ok(set) => {
                    debug!(path = %path.display(), "read cached code points");
                    self.sets.insert(hash.to_owned(), set);
                }
                Err(err) => {
                    warn!(path = %path.display(), %err, "ignoring corrupt cache file");
                    return None;
                }
            }
        }
        self.sets.get(hash)
    }

    /// Record `set` (which must be finished) under `hash`. Storing a hash twice keeps the first
    /// set.
    pub fn store(&mut self, hash: &str, set: &SparseSet) -> Result<(), CacheError> {
        if self.sets.contains_key(hash) {
            return Ok(());
        }

        if let Some(dir) = &self.dir {
            fs::create_dir_all(dir).map_err(|source| CacheError::Io {
                path: dir.clone(),
                source,
            })?;
            let path = Self::path(dir, hash);
            let json = serde_json::to_string(set)?;
            fs::write(&path, json).map_err(|source| CacheError::Io { path, source })?;
        }

        self.sets.insert(hash.to_owned(), set.clone());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(elements: &[(u32, u32)]) -> SparseSet {
        let mut set = SparseSet::from_elements(elements.iter().copied()).unwrap();
        set.finish().unwrap();
        set
    }

    #[test]
    fn hash_is_stable() {
        let a = content_hash(&["Lu", "Ll"]).unwrap();
        let b = content_hash(&["Lu", "Ll"]).unwrap();
        let c = content_hash(&["Ll", "Lu"]).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn memory() {
        let mut cache = CodePointCache::in_memory();
        assert!(cache.get("abc").is_none());
        cache.store("abc", &set(&[(1, 5)])).unwrap();
        cache.store("abc", &set(&[(7, 9)])).unwrap();
        assert_eq!(cache.get("abc"), Some(&set(&[(1, 5)])));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn disk() {
        let dir = std::env::temp_dir().join(format!("ucd_predicates_cache_{}", std::process::id()));
        let stored = set(&[(0x41, 0x5A), (0x61, 0x61)]);

        let mut cache = CodePointCache::new(dir.clone());
        cache.store("letters", &stored).unwrap();

        let mut reloaded = CodePointCache::new(dir.clone());
        assert_eq!(reloaded.get("letters"), Some(&stored));

        fs::write(dir.join("Unicode_CodePoints_corrupt.json"), "{").unwrap();
        assert!(reloaded.get("corrupt").is_none());

        fs::remove_dir_all(&dir).unwrap();
    }
}
