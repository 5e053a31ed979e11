use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use tracing::{debug, trace};

use crate::application::engine::HostAdapters;
use crate::application::repos::{
    ContentFilters, ContentStore, ITEMS_BUCKET, ItemMetadataStore, ListingQuery, ObjectCache,
    RepoError, Scope, ScopeSettingsStore,
};
use crate::domain::entities::{ContentItem, ItemDraft};
use crate::domain::types::{ItemId, ItemKind};
use crate::infra::lock::{rw_read, rw_write};

use super::cache::MemoryObjectCache;

const SOURCE: &str = "duomark::infra::memory::store";

/// In-process host: item table, item metadata, scope settings and an
/// optional object cache sitting in front of reads.
pub struct MemoryHost {
    items: RwLock<BTreeMap<ItemId, ContentItem>>,
    next_id: AtomicU64,
    flags: RwLock<HashSet<ItemId>>,
    settings: RwLock<HashMap<Scope, bool>>,
    cache: Option<Arc<MemoryObjectCache>>,
    keep_revisions: AtomicBool,
    reject_flag_writes: AtomicBool,
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self {
            items: RwLock::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
            flags: RwLock::new(HashSet::new()),
            settings: RwLock::new(HashMap::new()),
            cache: None,
            keep_revisions: AtomicBool::new(true),
            reject_flag_writes: AtomicBool::new(false),
        }
    }
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cache(mut self, cache: Arc<MemoryObjectCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn cache(&self) -> Option<Arc<MemoryObjectCache>> {
        self.cache.clone()
    }

    /// Turns automatic revision snapshots on update on or off.
    pub fn set_keep_revisions(&self, keep: bool) {
        self.keep_revisions.store(keep, Ordering::Relaxed);
    }

    /// Makes every subsequent flag write report failure.
    pub fn set_reject_flag_writes(&self, reject: bool) {
        self.reject_flag_writes.store(reject, Ordering::Relaxed);
    }

    /// Item as stored, bypassing the object cache.
    pub fn stored(&self, id: ItemId) -> Option<ContentItem> {
        rw_read(&self.items, SOURCE, "stored").get(&id).cloned()
    }

    /// Revisions of `parent`, oldest first.
    pub fn revisions_of(&self, parent: ItemId) -> Vec<ContentItem> {
        rw_read(&self.items, SOURCE, "revisions_of")
            .values()
            .filter(|item| item.kind.is_revision() && item.parent == Some(parent))
            .cloned()
            .collect()
    }

    /// Hands this host to the engine for every capability, with `filters`
    /// as the save filter chain.
    pub fn adapters(self: &Arc<Self>, filters: Arc<dyn ContentFilters>) -> HostAdapters {
        HostAdapters {
            store: Arc::clone(self) as Arc<dyn ContentStore>,
            metadata: Arc::clone(self) as Arc<dyn ItemMetadataStore>,
            settings: Arc::clone(self) as Arc<dyn ScopeSettingsStore>,
            cache: self
                .cache
                .clone()
                .map(|cache| cache as Arc<dyn ObjectCache>),
            filters,
        }
    }

    fn allocate_id(&self) -> ItemId {
        ItemId::new(self.next_id.fetch_add(1, Ordering::Relaxed))
    }
}

#[async_trait]
impl ContentStore for MemoryHost {
    async fn find(&self, id: ItemId) -> Result<Option<ContentItem>, RepoError> {
        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.get(id, ITEMS_BUCKET) {
                trace!(target = SOURCE, item = %id, "served from object cache");
                return Ok(Some(hit));
            }
        }

        let found = self.stored(id);
        if let (Some(cache), Some(item)) = (&self.cache, &found) {
            cache.put(ITEMS_BUCKET, item.clone());
        }
        Ok(found)
    }

    async fn write(&self, draft: ItemDraft) -> Result<ContentItem, RepoError> {
        let id = match draft.id {
            Some(id) => {
                if !rw_read(&self.items, SOURCE, "write.exists").contains_key(&id) {
                    return Err(RepoError::NotFound);
                }
                id
            }
            None => self.allocate_id(),
        };

        let item = ContentItem {
            id,
            kind: draft.kind,
            name: draft.name,
            parent: draft.parent,
            rendered_content: draft.rendered_content,
            source_content: draft.source_content,
        };

        rw_write(&self.items, SOURCE, "write").insert(id, item.clone());
        if let Some(cache) = &self.cache {
            cache.evict(id, ITEMS_BUCKET);
        }

        debug!(target = SOURCE, item = %id, kind = %item.kind, "item written");
        Ok(item)
    }

    async fn latest_revision(&self, parent: ItemId) -> Result<Option<ContentItem>, RepoError> {
        Ok(self.revisions_of(parent).pop())
    }

    async fn revision_snapshot(
        &self,
        item: &ContentItem,
    ) -> Result<Option<ItemDraft>, RepoError> {
        if !self.keep_revisions.load(Ordering::Relaxed) {
            return Ok(None);
        }

        let draft = ItemDraft::new(ItemKind::Revision, item.rendered_content.clone())
            .with_parent(item.id)
            .with_name(format!("{}-revision-v1", item.id))
            .with_source(item.source_content.clone());
        Ok(Some(draft))
    }

    async fn list(&self, query: &ListingQuery) -> Result<Vec<ContentItem>, RepoError> {
        let items = rw_read(&self.items, SOURCE, "list");
        Ok(items
            .values()
            .rev()
            .filter(|item| query.kinds.is_empty() || query.kinds.contains(&item.kind))
            .take(query.limit)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ItemMetadataStore for MemoryHost {
    async fn is_flagged(&self, id: ItemId) -> Result<bool, RepoError> {
        Ok(rw_read(&self.flags, SOURCE, "is_flagged").contains(&id))
    }

    async fn set_flagged(&self, id: ItemId) -> Result<bool, RepoError> {
        if self.reject_flag_writes.load(Ordering::Relaxed) {
            return Ok(false);
        }
        rw_write(&self.flags, SOURCE, "set_flagged").insert(id);
        Ok(true)
    }
}

#[async_trait]
impl ScopeSettingsStore for MemoryHost {
    async fn get_flag(&self, scope: Scope) -> Result<Option<bool>, RepoError> {
        Ok(rw_read(&self.settings, SOURCE, "get_flag").get(&scope).copied())
    }

    async fn set_flag(&self, scope: Scope, value: bool) -> Result<(), RepoError> {
        rw_write(&self.settings, SOURCE, "set_flag").insert(scope, value);
        Ok(())
    }
}
