//! Dual-representation synchronizer.
//!
//! Every write request runs through the same ordered stages:
//!
//! 1. save filter (code-block preservation, optional list escaping);
//! 2. field preparation, which decides which field is the source of truth
//!    and runs the host sanitizer over the HTML it settles on;
//! 3. persistence through the host [`ContentStore`];
//! 4. flag commitment for the ids queued in stage 2;
//! 5. the host's revision snapshot, written through stages 1 to 4.

mod comments;
mod pending;
mod types;
mod view;

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::application::registry::MarkdownRegistry;
use crate::application::render::{
    TransformContext, TransformPipeline, codeblock_preserve, codeblock_restore, escape_lists,
};
use crate::application::repos::{ContentFilters, ContentStore};
use crate::domain::entities::{ContentItem, ItemDraft};
use crate::domain::types::ItemId;

use pending::PendingFlags;

pub use comments::comment_namespace;
pub use types::{RevisionRetention, SyncError, SyncPolicy, WriteOptions, WriteOrigin};
pub use view::{EditableView, swap_for_editing};

const SOURCE: &str = "duomark::sync";

#[derive(Clone)]
pub struct ContentSynchronizer {
    registry: MarkdownRegistry,
    pipeline: TransformPipeline,
    store: Arc<dyn ContentStore>,
    filters: Arc<dyn ContentFilters>,
    policy: SyncPolicy,
}

impl ContentSynchronizer {
    pub fn new(
        registry: MarkdownRegistry,
        pipeline: TransformPipeline,
        store: Arc<dyn ContentStore>,
        filters: Arc<dyn ContentFilters>,
        policy: SyncPolicy,
    ) -> Self {
        Self {
            registry,
            pipeline,
            store,
            filters,
            policy,
        }
    }

    pub fn policy(&self) -> &SyncPolicy {
        &self.policy
    }

    pub fn pipeline(&self) -> &TransformPipeline {
        &self.pipeline
    }

    /// Persists one write request and returns the stored item.
    pub async fn save(
        &self,
        draft: ItemDraft,
        options: WriteOptions,
    ) -> Result<ContentItem, SyncError> {
        if options.origin == WriteOrigin::BulkEdit {
            debug!(target = SOURCE, kind = %draft.kind, "bulk edit bypasses markdown handling");
            return Ok(self.store.write(draft).await?);
        }

        let mut pending = PendingFlags::default();
        let is_update = draft.id.is_some();
        let saved = self.write_one(draft, options.origin, &mut pending).await?;

        if is_update
            && !saved.kind.is_revision()
            && options.retention == RevisionRetention::Keep
        {
            if let Some(snapshot) = self.store.revision_snapshot(&saved).await? {
                let revision = self
                    .write_one(snapshot, WriteOrigin::Editor, &mut pending)
                    .await?;
                debug!(target = SOURCE, item = %saved.id, revision = %revision.id, "revision snapshot recorded");
            }
        }

        if !pending.is_empty() {
            debug!(target = SOURCE, item = %saved.id, "pending flags left unconsumed");
        }

        Ok(saved)
    }

    /// Text the editor should display for `id` in place of `content`.
    /// Stored HTML is shown as-is while posting is disabled.
    pub async fn edit_view(&self, content: &str, id: ItemId) -> String {
        if !self.registry.is_posting_enabled().await || !self.registry.is_markdown(id).await {
            return content.to_string();
        }

        match self.find_with_source(id).await {
            Some(item) => EditableView::from_stored(&item).markdown,
            None => content.to_string(),
        }
    }

    /// Filtered-field read: stale Markdown never surfaces once posting has
    /// been disabled for a flagged item.
    pub async fn edit_filtered_view(&self, content: &str, id: ItemId) -> String {
        if self.registry.is_posting_enabled().await || !self.registry.is_markdown(id).await {
            return content.to_string();
        }

        match self.find_with_source(id).await {
            Some(_) => String::new(),
            None => content.to_string(),
        }
    }

    /// Editable view of a stored item, `None` when it has no Markdown.
    pub async fn editable_view(&self, id: ItemId) -> Result<Option<EditableView>, SyncError> {
        let item = self
            .store
            .find(id)
            .await?
            .ok_or(SyncError::not_found("item", id))?;

        if item.has_source() && self.registry.is_markdown(id).await {
            Ok(Some(EditableView::from_stored(&item)))
        } else {
            Ok(None)
        }
    }

    async fn find_with_source(&self, id: ItemId) -> Option<ContentItem> {
        match self.store.find(id).await {
            Ok(Some(item)) if item.has_source() => Some(item),
            Ok(_) => None,
            Err(err) => {
                warn!(target = SOURCE, item = %id, error = %err, "item lookup failed");
                None
            }
        }
    }

    async fn write_one(
        &self,
        draft: ItemDraft,
        origin: WriteOrigin,
        pending: &mut PendingFlags,
    ) -> Result<ContentItem, SyncError> {
        let mut draft = draft;
        draft.rendered_content = self.save_filter(draft.rendered_content);

        let draft = self.prepare(draft, origin, pending).await;
        let saved = self.store.write(draft).await?;

        if pending.take_for(&saved) && self.registry.set_markdown(saved.id).await {
            info!(target = SOURCE, item = %saved.id, kind = %saved.kind, "item flagged as markdown");
        }

        Ok(saved)
    }

    fn save_filter(&self, content: String) -> String {
        let content = codeblock_preserve(&content);
        if self.policy.list_escaping {
            escape_lists(&content)
        } else {
            content
        }
    }

    /// Host sanitizer over the field that ends up holding HTML.
    fn sanitize_rendered(&self, draft: &mut ItemDraft) {
        let content = std::mem::take(&mut draft.rendered_content);
        draft.rendered_content = self.filters.sanitize_on_save(content);
    }

    async fn prepare(
        &self,
        mut draft: ItemDraft,
        origin: WriteOrigin,
        pending: &mut PendingFlags,
    ) -> ItemDraft {
        if !self.registry.is_posting_enabled().await || !self.policy.supports(&draft.kind) {
            return self.prepare_disabled(draft).await;
        }

        if !draft.kind.is_revision() && origin != WriteOrigin::QuickEdit {
            let namespace = draft.id.map(|id| id.to_string());
            self.derive_fields(&mut draft, namespace);
        } else if let Some(parent) = draft.autosave_parent() {
            self.derive_fields(&mut draft, Some(parent.to_string()));
        } else {
            debug!(target = SOURCE, kind = %draft.kind, ?origin, "fields kept in place");
            self.sanitize_rendered(&mut draft);
        }

        match draft.id {
            Some(id) => pending.queue_item(id),
            None => pending.queue_content(draft.rendered_content.clone()),
        }

        if draft.kind.is_revision() {
            if let Some(parent) = draft.parent {
                if self.registry.is_markdown(parent).await {
                    pending.queue_parent(parent);
                }
            }
        }

        draft
    }

    async fn prepare_disabled(&self, mut draft: ItemDraft) -> ItemDraft {
        if let Some(id) = draft.id {
            if !draft.source_content.is_empty() && self.registry.is_markdown(id).await {
                debug!(target = SOURCE, item = %id, "clearing stale markdown source");
                draft.source_content.clear();
            }
        }
        draft.rendered_content = codeblock_restore(&draft.rendered_content);
        self.sanitize_rendered(&mut draft);
        draft
    }

    fn derive_fields(&self, draft: &mut ItemDraft, namespace: Option<String>) {
        let ctx = TransformContext {
            id: namespace,
            ..TransformContext::default()
        };
        let authored = std::mem::take(&mut draft.rendered_content);

        draft.source_content = self.pipeline.hooks().run_pre(authored.clone(), &ctx);
        draft.rendered_content = self.pipeline.transform(&authored, &ctx);
        self.sanitize_rendered(draft);
    }
}

#[cfg(test)]
mod tests;
