//! Parsed-upload cache keyed by content digest

use std::collections::VecDeque;
use std::sync::Arc;

use tracing::debug;

use crate::error::Result;
use crate::ingest::{read_table, ParsedUpload, Upload, UploadDigest};

/// Bounded cache of parsed uploads (oldest evicted first).
///
/// Re-uploading identical bytes reuses the earlier parse. Entries are
/// immutable, so a hit and a fresh parse are indistinguishable to callers.
#[derive(Debug)]
pub struct UploadCache {
    capacity: usize,
    entries: VecDeque<(UploadDigest, Arc<ParsedUpload>)>,
    hits: u64,
    misses: u64,
}

impl UploadCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
            hits: 0,
            misses: 0,
        }
    }

    /// Return the parsed table for an upload, parsing on a miss.
    pub fn get_or_parse(&mut self, upload: &Upload) -> Result<Arc<ParsedUpload>> {
        let digest = upload.digest();

        if let Some((_, parsed)) = self.entries.iter().find(|(d, _)| *d == digest) {
            self.hits += 1;
            debug!(digest = %digest, "Upload cache hit");
            return Ok(Arc::clone(parsed));
        }

        self.misses += 1;
        let parsed = Arc::new(read_table(&upload.bytes)?);

        if self.capacity > 0 {
            if self.entries.len() >= self.capacity {
                self.entries.pop_front();
            }
            self.entries.push_back((digest, Arc::clone(&parsed)));
        }
        debug!(digest = %digest, cached = self.entries.len(), "Upload cache miss");

        Ok(parsed)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// (hits, misses) since creation
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_bytes_hit_the_cache() {
        let mut cache = UploadCache::new(2);
        let a = Upload::new("a.csv", "SHAKER #3 (PERCENT)\n50\n");
        let renamed = Upload::new("b.csv", "SHAKER #3 (PERCENT)\n50\n");

        let first = cache.get_or_parse(&a).unwrap();
        let second = cache.get_or_parse(&renamed).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.stats(), (1, 1));
    }

    #[test]
    fn oldest_entry_is_evicted() {
        let mut cache = UploadCache::new(2);
        let uploads: Vec<Upload> = (0..3)
            .map(|i| Upload::new("u.csv", format!("SHAKER #3 (PERCENT)\n{i}\n")))
            .collect();
        for u in &uploads {
            cache.get_or_parse(u).unwrap();
        }
        assert_eq!(cache.len(), 2);

        cache.get_or_parse(&uploads[0]).unwrap();
        assert_eq!(cache.stats(), (0, 4));
    }

    #[test]
    fn zero_capacity_never_stores() {
        let mut cache = UploadCache::new(0);
        cache
            .get_or_parse(&Upload::new("u.csv", "SHAKER #3 (PERCENT)\n1\n"))
            .unwrap();
        assert!(cache.is_empty());
    }
}
