//! Host capability traits. The engine never persists anything itself; it
//! drives these adapters in a fixed order.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::{ContentItem, ItemDraft};
use crate::domain::types::{ItemId, ItemKind};

/// Object-cache bucket holding whole content items.
pub const ITEMS_BUCKET: &str = "items";

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

/// The two site-wide enablement scopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Posting,
    Commenting,
}

impl Scope {
    /// Key under which the host persists the toggle.
    pub fn setting_key(self) -> &'static str {
        match self {
            Scope::Posting => "duomark_publish_posts_with_markdown",
            Scope::Commenting => "duomark_publish_comments_with_markdown",
        }
    }
}

#[async_trait]
pub trait ScopeSettingsStore: Send + Sync {
    /// `Ok(None)` when the setting was never written.
    async fn get_flag(&self, scope: Scope) -> Result<Option<bool>, RepoError>;

    async fn set_flag(&self, scope: Scope, value: bool) -> Result<(), RepoError>;
}

#[async_trait]
pub trait ItemMetadataStore: Send + Sync {
    async fn is_flagged(&self, id: ItemId) -> Result<bool, RepoError>;

    /// Returns whether the host accepted the write.
    async fn set_flagged(&self, id: ItemId) -> Result<bool, RepoError>;
}

/// Listing request issued by a remote session or an admin screen.
#[derive(Debug, Clone)]
pub struct ListingQuery {
    pub kinds: Vec<ItemKind>,
    pub limit: usize,
    /// When set, the host skips post-query filters (and therefore the swap).
    pub suppress_filters: bool,
}

impl ListingQuery {
    pub fn recent(kind: ItemKind, limit: usize) -> Self {
        Self {
            kinds: vec![kind],
            limit,
            suppress_filters: true,
        }
    }
}

#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn find(&self, id: ItemId) -> Result<Option<ContentItem>, RepoError>;

    /// Inserts when `draft.id` is `None`, updates otherwise.
    async fn write(&self, draft: ItemDraft) -> Result<ContentItem, RepoError>;

    /// Newest revision row whose parent is `parent`.
    async fn latest_revision(&self, parent: ItemId) -> Result<Option<ContentItem>, RepoError>;

    /// Revision the host wants recorded after `item` was updated, if any.
    async fn revision_snapshot(&self, item: &ContentItem)
    -> Result<Option<ItemDraft>, RepoError>;

    async fn list(&self, query: &ListingQuery) -> Result<Vec<ContentItem>, RepoError>;
}

/// Transient object cache consulted by the host before hitting storage.
pub trait ObjectCache: Send + Sync {
    fn get(&self, id: ItemId, bucket: &str) -> Option<ContentItem>;

    fn evict(&self, id: ItemId, bucket: &str) -> bool;

    /// Inserts only when no entry exists.
    fn add(&self, id: ItemId, bucket: &str, item: ContentItem) -> bool;

    /// Whether entries outlive the current request.
    fn is_persistent(&self) -> bool;
}

/// Host filter chain applied to content about to be saved.
pub trait ContentFilters: Send + Sync {
    fn sanitize_on_save(&self, content: String) -> String;
}
