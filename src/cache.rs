use crate::error::LoadError;
use crate::workbook::{Dataset, load_workbook_bytes};
use chrono::{DateTime, Utc};
use log::{debug, info};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;

/// SHA-256 of the workbook bytes, hex encoded.
pub fn fingerprint(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

#[derive(Clone, Debug)]
struct CachedDataset {
    dataset: Arc<Dataset>,
    loaded_at: DateTime<Utc>,
}

/// Parsed datasets keyed by the fingerprint of their workbook.
///
/// The same bytes are parsed once; [`WorkbookCache::clear`] forces the next
/// request to parse again.
#[derive(Debug, Default)]
pub struct WorkbookCache {
    entries: HashMap<String, CachedDataset>,
}

impl WorkbookCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_load(&mut self, bytes: &[u8]) -> Result<Arc<Dataset>, LoadError> {
        let key = fingerprint(bytes);
        if let Some(entry) = self.entries.get(&key) {
            debug!("workbook cache hit {} (loaded {})", &key[..12], entry.loaded_at);
            return Ok(Arc::clone(&entry.dataset));
        }

        info!("workbook cache miss {}; parsing {} bytes", &key[..12], bytes.len());
        let dataset = Arc::new(load_workbook_bytes(bytes)?);
        self.entries.insert(
            key,
            CachedDataset {
                dataset: Arc::clone(&dataset),
                loaded_at: Utc::now(),
            },
        );
        Ok(dataset)
    }

    /// When the dataset for `bytes` was parsed, if it is cached.
    pub fn loaded_at(&self, bytes: &[u8]) -> Option<DateTime<Utc>> {
        self.entries.get(&fingerprint(bytes)).map(|e| e.loaded_at)
    }

    /// Forgets the dataset parsed from `bytes`. Returns whether one was cached.
    pub fn evict(&mut self, bytes: &[u8]) -> bool {
        let key = fingerprint(bytes);
        let removed = self.entries.remove(&key).is_some();
        if removed {
            debug!("evicted workbook {}", &key[..12]);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        info!("clearing workbook cache ({} entries)", self.entries.len());
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_stable_hex() {
        let a = fingerprint(b"workbook");
        assert_eq!(a, fingerprint(b"workbook"));
        assert_ne!(a, fingerprint(b"workbook2"));
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn unreadable_bytes_are_not_cached() {
        let mut cache = WorkbookCache::new();
        assert!(cache.get_or_load(b"not a workbook").is_err());
        assert!(cache.is_empty());
        assert!(cache.loaded_at(b"not a workbook").is_none());
        assert!(!cache.evict(b"not a workbook"));
    }
}
