use std::num::NonZeroUsize;
use std::sync::RwLock;

use lru::LruCache;
use tracing::trace;

use crate::application::repos::ObjectCache;
use crate::config::CacheSettings;
use crate::domain::entities::ContentItem;
use crate::domain::types::ItemId;
use crate::infra::lock::{rw_read, rw_write};

const SOURCE: &str = "duomark::infra::memory::cache";

/// Bounded object cache keyed by `(bucket, id)`, evicting least recently
/// used entries once full.
pub struct MemoryObjectCache {
    entries: RwLock<LruCache<(String, ItemId), ContentItem>>,
    persistent: bool,
}

impl MemoryObjectCache {
    pub fn new(capacity: NonZeroUsize, persistent: bool) -> Self {
        Self {
            entries: RwLock::new(LruCache::new(capacity)),
            persistent,
        }
    }

    pub fn from_settings(settings: &CacheSettings) -> Self {
        Self::new(settings.capacity, settings.persistent)
    }

    pub fn len(&self) -> usize {
        rw_read(&self.entries, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Unconditional insert, used by the host when it loads an item.
    pub fn put(&self, bucket: &str, item: ContentItem) {
        let key = (bucket.to_string(), item.id);
        rw_write(&self.entries, SOURCE, "put").put(key, item);
    }
}

impl ObjectCache for MemoryObjectCache {
    fn get(&self, id: ItemId, bucket: &str) -> Option<ContentItem> {
        // LRU bookkeeping mutates on read.
        rw_write(&self.entries, SOURCE, "get")
            .get(&(bucket.to_string(), id))
            .cloned()
    }

    fn evict(&self, id: ItemId, bucket: &str) -> bool {
        let removed = rw_write(&self.entries, SOURCE, "evict")
            .pop(&(bucket.to_string(), id))
            .is_some();
        trace!(target = SOURCE, item = %id, bucket, removed, "cache entry evicted");
        removed
    }

    fn add(&self, id: ItemId, bucket: &str, item: ContentItem) -> bool {
        let mut entries = rw_write(&self.entries, SOURCE, "add");
        let key = (bucket.to_string(), id);
        if entries.contains(&key) {
            return false;
        }
        entries.put(key, item);
        true
    }

    fn is_persistent(&self) -> bool {
        self.persistent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::repos::ITEMS_BUCKET;
    use crate::domain::types::ItemKind;

    fn item(id: u64, rendered: &str) -> ContentItem {
        ContentItem {
            id: ItemId::new(id),
            kind: ItemKind::Post,
            name: String::new(),
            parent: None,
            rendered_content: rendered.into(),
            source_content: String::new(),
        }
    }

    fn cache(capacity: usize) -> MemoryObjectCache {
        MemoryObjectCache::new(NonZeroUsize::new(capacity).unwrap(), true)
    }

    #[test]
    fn add_does_not_overwrite() {
        let cache = cache(4);
        assert!(cache.add(ItemId::new(1), ITEMS_BUCKET, item(1, "first")));
        assert!(!cache.add(ItemId::new(1), ITEMS_BUCKET, item(1, "second")));
        assert_eq!(
            cache.get(ItemId::new(1), ITEMS_BUCKET).unwrap().rendered_content,
            "first"
        );
    }

    #[test]
    fn buckets_are_separate() {
        let cache = cache(4);
        cache.put(ITEMS_BUCKET, item(1, "a"));
        assert!(cache.get(ItemId::new(1), "other").is_none());
        assert!(!cache.evict(ItemId::new(1), "other"));
        assert!(cache.evict(ItemId::new(1), ITEMS_BUCKET));
        assert!(cache.is_empty());
    }

    #[test]
    fn least_recently_used_entry_is_dropped() {
        let cache = cache(2);
        cache.put(ITEMS_BUCKET, item(1, "a"));
        cache.put(ITEMS_BUCKET, item(2, "b"));
        cache.get(ItemId::new(1), ITEMS_BUCKET);
        cache.put(ITEMS_BUCKET, item(3, "c"));

        assert!(cache.get(ItemId::new(1), ITEMS_BUCKET).is_some());
        assert!(cache.get(ItemId::new(2), ITEMS_BUCKET).is_none());
        assert_eq!(cache.len(), 2);
    }
}
