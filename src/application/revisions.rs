//! Keeps Markdown consistent across revision restores.
//!
//! A host restore copies the revision's fields onto the item and saves it,
//! which feeds HTML into the write path and snapshots that HTML as the
//! newest revision's Markdown. [`RevisionService::on_revision_restored`]
//! re-saves the item from the revision's Markdown and repairs that snapshot.

use std::sync::Arc;

use tracing::{debug, info};

use crate::application::registry::MarkdownRegistry;
use crate::application::render::codeblock_restore;
use crate::application::repos::ContentStore;
use crate::application::sync::{ContentSynchronizer, SyncError, WriteOptions};
use crate::domain::entities::ContentItem;
use crate::domain::types::ItemId;

const SOURCE: &str = "duomark::revisions";

/// Label under which revision screens show the stored Markdown.
pub const REVISION_SOURCE_LABEL: &str = "Markdown content";

#[derive(Clone)]
pub struct RevisionService {
    registry: MarkdownRegistry,
    sync: ContentSynchronizer,
    store: Arc<dyn ContentStore>,
}

impl RevisionService {
    pub fn new(
        registry: MarkdownRegistry,
        sync: ContentSynchronizer,
        store: Arc<dyn ContentStore>,
    ) -> Self {
        Self {
            registry,
            sync,
            store,
        }
    }

    /// Restores `revision_id` onto `item_id` the way a host does, then runs
    /// the Markdown repair.
    pub async fn restore(
        &self,
        item_id: ItemId,
        revision_id: ItemId,
    ) -> Result<ContentItem, SyncError> {
        let item = self.load("item", item_id).await?;
        let revision = self.load("revision", revision_id).await?;

        let mut draft = item.to_draft();
        draft.rendered_content = revision.rendered_content;
        draft.source_content = revision.source_content;
        self.sync.save(draft, WriteOptions::editor()).await?;

        self.on_revision_restored(item_id, revision_id).await?;
        self.load("item", item_id).await
    }

    /// Returns whether a repair was needed. Nothing is repaired while
    /// posting is disabled.
    pub async fn on_revision_restored(
        &self,
        item_id: ItemId,
        revision_id: ItemId,
    ) -> Result<bool, SyncError> {
        if !self.registry.is_posting_enabled().await {
            debug!(target = SOURCE, revision = %revision_id, "posting disabled; restore left to the host");
            return Ok(false);
        }
        if !self.registry.is_markdown(revision_id).await {
            debug!(target = SOURCE, revision = %revision_id, "revision has no markdown; nothing to repair");
            return Ok(false);
        }

        let revision = self.load("revision", revision_id).await?;
        let item = self.load("item", item_id).await?;

        let mut draft = item.to_draft();
        // The write path preserves code blocks again on save.
        draft.rendered_content = codeblock_restore(&revision.source_content);
        let restored = self
            .sync
            .save(draft, WriteOptions::editor().without_revision())
            .await?;

        self.fix_latest_revision(&restored).await?;

        info!(target = SOURCE, item = %item_id, revision = %revision_id, "markdown restored from revision");
        Ok(true)
    }

    async fn fix_latest_revision(&self, item: &ContentItem) -> Result<(), SyncError> {
        let Some(latest) = self.store.latest_revision(item.id).await? else {
            debug!(target = SOURCE, item = %item.id, "no trailing revision to repair");
            return Ok(());
        };

        let mut draft = latest.to_draft();
        draft.source_content = item.source_content.clone();
        self.sync
            .save(draft, WriteOptions::editor().without_revision())
            .await?;
        Ok(())
    }

    async fn load(&self, entity: &'static str, id: ItemId) -> Result<ContentItem, SyncError> {
        self.store
            .find(id)
            .await?
            .ok_or(SyncError::not_found(entity, id))
    }
}
