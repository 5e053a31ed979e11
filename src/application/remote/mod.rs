//! Remote publishing sessions.
//!
//! Remote clients read items straight from storage and expect Markdown in
//! the rendered field. A [`RemoteSession`] primes the host object cache
//! with swapped copies for the items a call will read, swaps listings after
//! the query, and evicts what it primed when the session ends.

mod payload;

use std::sync::Arc;

use metrics::counter;
use tracing::{debug, info, warn};

use crate::application::registry::MarkdownRegistry;
use crate::application::repos::{
    ContentStore, ITEMS_BUCKET, ListingQuery, ObjectCache, RepoError,
};
use crate::application::sync::swap_for_editing;
use crate::domain::entities::ContentItem;
use crate::domain::types::ItemId;

pub use payload::{
    EarlyMethod, EarlyTarget, PayloadError, RemoteCall, detect_early_target, parse_call,
};

const SOURCE: &str = "duomark::remote";

/// Listing methods whose queries must stay filterable.
pub const LISTING_METHODS: [&str; 3] =
    ["metaWeblog.getRecentPosts", "wp.getPosts", "wp.getPages"];

/// Method that resolves its item after the session sees the call.
pub const GET_POST_METHOD: &str = "wp.getPost";
const GET_POST_ID_POSITION: usize = 3;

/// State for one remote session. Dropped at the end of the session, after
/// [`RemoteSession::finish`].
pub struct RemoteSession {
    registry: MarkdownRegistry,
    store: Arc<dyn ContentStore>,
    cache: Option<Arc<dyn ObjectCache>>,
    primed: Vec<ItemId>,
    listing_filterable: bool,
}

impl RemoteSession {
    pub fn new(
        registry: MarkdownRegistry,
        store: Arc<dyn ContentStore>,
        cache: Option<Arc<dyn ObjectCache>>,
    ) -> Self {
        Self {
            registry,
            store,
            cache,
            primed: Vec::new(),
            listing_filterable: false,
        }
    }

    /// Session start. Methods that read their item before dispatch are
    /// detected from the raw body and primed right away.
    pub async fn open(&mut self, raw_payload: &str) -> Option<EarlyTarget> {
        if !self.registry.is_posting_enabled().await {
            return None;
        }

        match detect_early_target(raw_payload) {
            Ok(Some(target)) => {
                debug!(
                    target = SOURCE,
                    method = target.method.as_str(),
                    item = %target.id,
                    "early remote method detected"
                );
                self.prime(target.id).await;
                Some(target)
            }
            Ok(None) => None,
            Err(err) => {
                warn!(target = SOURCE, error = %err, "remote payload not understood; serving rendered content");
                None
            }
        }
    }

    /// Dispatch notification for a decoded call.
    pub async fn on_call(&mut self, call: &RemoteCall) {
        if !self.registry.is_posting_enabled().await {
            return;
        }

        if LISTING_METHODS.contains(&call.method.as_str()) {
            self.listing_filterable = true;
            return;
        }

        if call.method == GET_POST_METHOD {
            match call.item_id(GET_POST_ID_POSITION) {
                Ok(id) => self.prime(id).await,
                Err(err) => {
                    warn!(target = SOURCE, method = GET_POST_METHOD, error = %err, "remote call without usable item id");
                }
            }
        }
    }

    /// Replaces the cached copy of a flagged item with its editable swap.
    pub async fn prime(&mut self, id: ItemId) {
        // The cache already holds the swapped copy.
        if self.primed.contains(&id) || !self.registry.is_markdown(id).await {
            return;
        }
        let Some(cache) = self.cache.clone() else {
            debug!(target = SOURCE, item = %id, "no object cache; priming skipped");
            return;
        };

        let item = match self.store.find(id).await {
            Ok(Some(item)) if item.has_source() => item,
            Ok(_) => return,
            Err(err) => {
                warn!(target = SOURCE, item = %id, error = %err, "could not load item to prime");
                return;
            }
        };

        cache.evict(id, ITEMS_BUCKET);
        cache.add(id, ITEMS_BUCKET, swap_for_editing(&item));
        self.primed.push(id);
        counter!("duomark_remote_primed_total").increment(1);
        info!(target = SOURCE, item = %id, "object cache primed with markdown copy");
    }

    /// Listing queries must run with post-query filters so the swap is
    /// reachable.
    pub fn prepare_listing(&self, query: &mut ListingQuery) {
        if self.listing_filterable {
            query.suppress_filters = false;
        }
    }

    /// Swaps every flagged item that carries Markdown. Listings pass through
    /// untouched while posting is disabled.
    pub async fn swap_listing(&self, items: Vec<ContentItem>) -> Vec<ContentItem> {
        if !self.registry.is_posting_enabled().await {
            return items;
        }

        let mut swapped = Vec::with_capacity(items.len());
        for item in items {
            if item.has_source() && self.registry.is_markdown(item.id).await {
                swapped.push(swap_for_editing(&item));
            } else {
                swapped.push(item);
            }
        }
        swapped
    }

    /// Runs a listing query the way the host does for remote clients.
    pub async fn fetch_listing(
        &self,
        mut query: ListingQuery,
    ) -> Result<Vec<ContentItem>, RepoError> {
        self.prepare_listing(&mut query);
        let items = self.store.list(&query).await?;
        if query.suppress_filters {
            Ok(items)
        } else {
            Ok(self.swap_listing(items).await)
        }
    }

    pub fn primed(&self) -> &[ItemId] {
        &self.primed
    }

    pub fn is_listing_filterable(&self) -> bool {
        self.listing_filterable
    }

    /// Session end. Primed copies are evicted when the cache outlives the
    /// request.
    pub fn finish(self) -> usize {
        let Some(cache) = self.cache else {
            return 0;
        };
        if !cache.is_persistent() {
            return 0;
        }

        let mut evicted = 0;
        for id in &self.primed {
            if cache.evict(*id, ITEMS_BUCKET) {
                evicted += 1;
            }
        }
        counter!("duomark_remote_evicted_total").increment(evicted as u64);
        debug!(target = SOURCE, evicted, primed = self.primed.len(), "remote session finished");
        evicted
    }
}
