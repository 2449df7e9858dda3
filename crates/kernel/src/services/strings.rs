//! Arbitrary-string translation support.
//!
//! Strings have no host-assigned id, so they are addressed by a stable
//! identifier derived from the source text, and resolved through an
//! in-memory read-through cache to keep the hot render path off the
//! database.

use dashmap::DashMap;
use sha2::{Digest, Sha256};

/// Derive the object id for a source string.
///
/// First eight bytes of SHA-256 over the text, masked non-negative so the
/// id fits the same BIGINT column as host-assigned ids.
pub fn string_object_id(text: &str) -> i64 {
    let digest = Sha256::digest(text.as_bytes());
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    i64::from_be_bytes(prefix) & i64::MAX
}

/// Cache of resolved string translations: key = "language\0object_id".
///
/// Uses a null byte separator to keep keys unambiguous. Only positive
/// results are cached; misses always consult the store.
#[derive(Default)]
pub struct StringCache {
    entries: DashMap<String, String>,
}

impl StringCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a cached translation.
    pub fn get(&self, language: &str, object_id: i64) -> Option<String> {
        self.entries
            .get(&cache_key(language, object_id))
            .map(|v| v.clone())
    }

    /// Cache a resolved translation.
    pub fn insert(&self, language: &str, object_id: i64, translated: String) {
        self.entries.insert(cache_key(language, object_id), translated);
    }

    /// Drop cached entries for one string in one language.
    pub fn invalidate(&self, language: &str, object_id: i64) {
        self.entries.remove(&cache_key(language, object_id));
    }

    /// Drop cached entries for one string across every language.
    pub fn invalidate_all_languages(&self, object_id: i64) {
        let suffix = format!("\0{object_id}");
        self.entries.retain(|key, _| !key.ends_with(&suffix));
    }

    /// Clear the cache.
    pub fn clear(&self) {
        self.entries.clear();
    }
}

fn cache_key(language: &str, object_id: i64) -> String {
    format!("{language}\0{object_id}")
}

impl std::fmt::Debug for StringCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StringCache")
            .field("cache_size", &self.entries.len())
            .finish()
    }
}
