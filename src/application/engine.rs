//! Wiring of the registry, transform pipeline, synchronizer, revision
//! manager and remote sessions over one set of host adapters.

use std::sync::Arc;

use crate::application::registry::MarkdownRegistry;
use crate::application::remote::RemoteSession;
use crate::application::render::{
    MarkdownRenderer, TransformContext, TransformHooks, TransformPipeline, unescape_lists,
};
use crate::application::repos::{
    ContentFilters, ContentStore, ItemMetadataStore, ObjectCache, ScopeSettingsStore,
};
use crate::application::revisions::RevisionService;
use crate::application::sync::{
    ContentSynchronizer, EditableView, SyncError, SyncPolicy, WriteOptions,
};
use crate::config::{DEFAULT_STRUCTURED_MARKERS, DEFAULT_SUPPORT_URL, MarkdownSettings};
use crate::domain::entities::{ContentItem, ItemDraft};
use crate::domain::types::ItemId;

/// Host capabilities the engine drives.
#[derive(Clone)]
pub struct HostAdapters {
    pub store: Arc<dyn ContentStore>,
    pub metadata: Arc<dyn ItemMetadataStore>,
    pub settings: Arc<dyn ScopeSettingsStore>,
    pub cache: Option<Arc<dyn ObjectCache>>,
    pub filters: Arc<dyn ContentFilters>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    pub policy: SyncPolicy,
    pub structured_markers: Vec<String>,
    pub support_url: String,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            policy: SyncPolicy::default(),
            structured_markers: DEFAULT_STRUCTURED_MARKERS
                .iter()
                .map(|marker| marker.to_string())
                .collect(),
            support_url: DEFAULT_SUPPORT_URL.to_string(),
        }
    }
}

impl From<&MarkdownSettings> for EngineOptions {
    fn from(settings: &MarkdownSettings) -> Self {
        Self {
            policy: SyncPolicy {
                supported_kinds: settings.supported_kinds.clone(),
                list_escaping: settings.list_escaping,
            },
            structured_markers: settings.structured_markers.clone(),
            support_url: settings.support_url.clone(),
        }
    }
}

#[derive(Clone)]
pub struct MarkdownEngine {
    registry: MarkdownRegistry,
    sync: ContentSynchronizer,
    revisions: RevisionService,
    store: Arc<dyn ContentStore>,
    cache: Option<Arc<dyn ObjectCache>>,
    support_url: String,
}

impl MarkdownEngine {
    pub fn new(
        adapters: HostAdapters,
        renderer: Arc<dyn MarkdownRenderer>,
        hooks: TransformHooks,
        options: EngineOptions,
    ) -> Self {
        let HostAdapters {
            store,
            metadata,
            settings,
            cache,
            filters,
        } = adapters;
        let EngineOptions {
            policy,
            structured_markers,
            support_url,
        } = options;

        let hooks = if policy.list_escaping {
            hooks.before(|text, _| unescape_lists(&text))
        } else {
            hooks
        };

        let registry = MarkdownRegistry::new(settings, metadata);
        let pipeline = TransformPipeline::new(renderer, hooks, structured_markers);
        let sync = ContentSynchronizer::new(
            registry.clone(),
            pipeline,
            Arc::clone(&store),
            filters,
            policy,
        );
        let revisions = RevisionService::new(registry.clone(), sync.clone(), Arc::clone(&store));

        Self {
            registry,
            sync,
            revisions,
            store,
            cache,
            support_url,
        }
    }

    pub fn registry(&self) -> &MarkdownRegistry {
        &self.registry
    }

    pub fn sync(&self) -> &ContentSynchronizer {
        &self.sync
    }

    pub fn revisions(&self) -> &RevisionService {
        &self.revisions
    }

    pub fn pipeline(&self) -> &TransformPipeline {
        self.sync.pipeline()
    }

    /// Where authors can read up on the supported syntax.
    pub fn support_url(&self) -> &str {
        &self.support_url
    }

    pub fn transform(&self, text: &str, ctx: &TransformContext) -> String {
        self.pipeline().transform(text, ctx)
    }

    pub async fn save(
        &self,
        draft: ItemDraft,
        options: WriteOptions,
    ) -> Result<ContentItem, SyncError> {
        self.sync.save(draft, options).await
    }

    pub async fn edit_view(&self, content: &str, id: ItemId) -> String {
        self.sync.edit_view(content, id).await
    }

    pub async fn edit_filtered_view(&self, content: &str, id: ItemId) -> String {
        self.sync.edit_filtered_view(content, id).await
    }

    pub async fn editable_view(&self, id: ItemId) -> Result<Option<EditableView>, SyncError> {
        self.sync.editable_view(id).await
    }

    pub async fn prepare_comment(&self, content: &str) -> String {
        self.sync.prepare_comment(content).await
    }

    pub async fn preview_post(&self, text: &str) -> String {
        self.sync.preview_post(text).await
    }

    pub async fn preview_comment(&self, text: &str) -> String {
        self.sync.preview_comment(text).await
    }

    pub async fn restore_revision(
        &self,
        item_id: ItemId,
        revision_id: ItemId,
    ) -> Result<ContentItem, SyncError> {
        self.revisions.restore(item_id, revision_id).await
    }

    /// Fresh state for one remote publishing session.
    pub fn remote_session(&self) -> RemoteSession {
        RemoteSession::new(
            self.registry.clone(),
            Arc::clone(&self.store),
            self.cache.clone(),
        )
    }
}
