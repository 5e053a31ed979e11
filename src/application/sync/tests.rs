use std::sync::{Arc, Mutex};

use super::*;
use crate::application::render::{
    MarkdownRenderer, RenderError, RenderOptions, TransformHooks, unescape_lists,
};
use crate::application::repos::{ContentFilters, ItemMetadataStore, RepoError};
use crate::domain::types::ItemKind;
use crate::infra::memory::MemoryHost;
use crate::infra::sanitize::PassthroughFilters;

/// Wraps the Markdown it receives so tests can see what reached the
/// renderer and under which footnote prefix.
struct TaggingRenderer;

impl MarkdownRenderer for TaggingRenderer {
    fn render(&self, markdown: &str, options: &RenderOptions) -> Result<String, RenderError> {
        Ok(format!(
            "<md ns=\"{}\">{}</md>",
            options.footnote_prefix, markdown
        ))
    }
}

struct Fixture {
    host: Arc<MemoryHost>,
    registry: MarkdownRegistry,
    sync: ContentSynchronizer,
}

async fn fixture_with(posting: bool, policy: SyncPolicy, hooks: TransformHooks) -> Fixture {
    let host = Arc::new(MemoryHost::new());
    let registry = MarkdownRegistry::new(host.clone(), host.clone());
    registry
        .set_posting_enabled(posting)
        .await
        .expect("settings write");

    let pipeline = TransformPipeline::new(
        Arc::new(TaggingRenderer),
        hooks,
        vec!["<!-- wp:".to_string()],
    );
    let sync = ContentSynchronizer::new(
        registry.clone(),
        pipeline,
        host.clone(),
        Arc::new(PassthroughFilters),
        policy,
    );

    Fixture {
        host,
        registry,
        sync,
    }
}

async fn fixture(posting: bool) -> Fixture {
    fixture_with(posting, SyncPolicy::default(), TransformHooks::new()).await
}

#[tokio::test]
async fn new_item_gets_both_representations_and_flag() {
    let fx = fixture(true).await;

    let saved = fx
        .sync
        .save(ItemDraft::new(ItemKind::Post, "hello"), WriteOptions::editor())
        .await
        .unwrap();

    assert_eq!(saved.source_content, "hello");
    assert_eq!(saved.rendered_content, "<md ns=\"\">hello</md>");
    assert!(fx.registry.is_markdown(saved.id).await);
}

#[tokio::test]
async fn update_namespaces_footnotes_with_item_id() {
    let fx = fixture(true).await;
    let saved = fx
        .sync
        .save(ItemDraft::new(ItemKind::Post, "v1"), WriteOptions::editor())
        .await
        .unwrap();

    let mut draft = saved.to_draft();
    draft.rendered_content = "v2".into();
    let updated = fx.sync.save(draft, WriteOptions::editor()).await.unwrap();

    assert_eq!(
        updated.rendered_content,
        format!("<md ns=\"{}-\">v2</md>", saved.id)
    );
    assert_eq!(updated.source_content, "v2");
}

#[tokio::test]
async fn disabled_posting_leaves_content_and_flags_alone() {
    let fx = fixture(false).await;

    let saved = fx
        .sync
        .save(ItemDraft::new(ItemKind::Post, "<p>plain</p>"), WriteOptions::editor())
        .await
        .unwrap();

    assert_eq!(saved.rendered_content, "<p>plain</p>");
    assert_eq!(saved.source_content, "");
    assert!(!fx.registry.is_markdown(saved.id).await);
}

#[tokio::test]
async fn unsupported_kind_is_treated_as_disabled() {
    let fx = fixture(true).await;

    let saved = fx
        .sync
        .save(ItemDraft::new(ItemKind::Comment, "*hi*"), WriteOptions::editor())
        .await
        .unwrap();

    assert_eq!(saved.rendered_content, "*hi*");
    assert!(!saved.has_source());
    assert!(!fx.registry.is_markdown(saved.id).await);
}

#[tokio::test]
async fn disabling_posting_hides_and_then_clears_stale_markdown() {
    let fx = fixture(true).await;
    let saved = fx
        .sync
        .save(ItemDraft::new(ItemKind::Post, "draft"), WriteOptions::editor())
        .await
        .unwrap();

    fx.registry.set_posting_enabled(false).await.unwrap();
    assert_eq!(fx.sync.edit_filtered_view("draft", saved.id).await, "");

    let mut draft = saved.to_draft();
    draft.rendered_content = "<p>edited in the visual editor</p>".into();
    let resaved = fx.sync.save(draft, WriteOptions::editor()).await.unwrap();

    assert_eq!(resaved.source_content, "");
    assert_eq!(resaved.rendered_content, "<p>edited in the visual editor</p>");
    assert_eq!(
        fx.sync.edit_filtered_view("anything", saved.id).await,
        "anything"
    );
}

#[tokio::test]
async fn quick_edit_keeps_saved_markdown() {
    let fx = fixture(true).await;
    let saved = fx
        .sync
        .save(ItemDraft::new(ItemKind::Post, "source"), WriteOptions::editor())
        .await
        .unwrap();

    let mut draft = saved.to_draft();
    draft.rendered_content = "<p>inline</p>".into();
    let edited = fx.sync.save(draft, WriteOptions::quick_edit()).await.unwrap();

    assert_eq!(edited.rendered_content, "<p>inline</p>");
    assert_eq!(edited.source_content, "source");
    assert!(fx.registry.is_markdown(saved.id).await);
}

#[tokio::test]
async fn bulk_edit_skips_every_stage() {
    let fx = fixture(true).await;
    let fenced = "```\n<b>\n```";

    let saved = fx
        .sync
        .save(ItemDraft::new(ItemKind::Post, fenced), WriteOptions::bulk_edit())
        .await
        .unwrap();

    assert_eq!(saved.rendered_content, fenced);
    assert!(!fx.registry.is_markdown(saved.id).await);
}

#[tokio::test]
async fn code_blocks_are_stored_encoded_and_edited_raw() {
    let fx = fixture(true).await;
    let fenced = "```html\n<b>bold</b>\n```";

    let saved = fx
        .sync
        .save(ItemDraft::new(ItemKind::Post, fenced), WriteOptions::editor())
        .await
        .unwrap();

    assert!(saved.source_content.contains("&lt;b&gt;bold&lt;/b&gt;"));
    // The renderer sees the decoded body.
    assert!(saved.rendered_content.contains("<b>bold</b>"));
    assert_eq!(fx.sync.edit_view("ignored", saved.id).await, fenced);
}

#[tokio::test]
async fn edit_view_shows_html_while_posting_is_disabled() {
    let fx = fixture(true).await;
    let saved = fx
        .sync
        .save(ItemDraft::new(ItemKind::Post, "*draft*"), WriteOptions::editor())
        .await
        .unwrap();

    fx.registry.set_posting_enabled(false).await.unwrap();
    assert_eq!(
        fx.sync.edit_view(&saved.rendered_content, saved.id).await,
        saved.rendered_content
    );
}

/// Host filter that records every value it was asked to clean.
#[derive(Default)]
struct RecordingFilters {
    seen: Mutex<Vec<String>>,
}

impl ContentFilters for RecordingFilters {
    fn sanitize_on_save(&self, content: String) -> String {
        self.seen.lock().unwrap().push(content.clone());
        content
    }
}

#[tokio::test]
async fn host_filter_only_sees_html() {
    let host = Arc::new(MemoryHost::new());
    let registry = MarkdownRegistry::new(host.clone(), host.clone());
    registry.set_posting_enabled(true).await.unwrap();
    let filters = Arc::new(RecordingFilters::default());
    let sync = ContentSynchronizer::new(
        registry,
        TransformPipeline::with_renderer(Arc::new(TaggingRenderer)),
        host.clone(),
        filters.clone(),
        SyncPolicy::default(),
    );

    let saved = sync
        .save(ItemDraft::new(ItemKind::Post, "a & b"), WriteOptions::editor())
        .await
        .unwrap();

    assert_eq!(saved.source_content, "a & b");
    assert_eq!(
        filters.seen.lock().unwrap().as_slice(),
        ["<md ns=\"\">a & b</md>".to_string()]
    );
}

#[tokio::test]
async fn edit_view_passes_through_unflagged_items() {
    let fx = fixture(false).await;
    let saved = fx
        .sync
        .save(ItemDraft::new(ItemKind::Post, "<p>html</p>"), WriteOptions::editor())
        .await
        .unwrap();

    assert_eq!(fx.sync.edit_view("<p>html</p>", saved.id).await, "<p>html</p>");
    assert!(fx.sync.editable_view(saved.id).await.unwrap().is_none());
}

#[tokio::test]
async fn update_records_flagged_revision_with_source() {
    let fx = fixture(true).await;
    let saved = fx
        .sync
        .save(ItemDraft::new(ItemKind::Post, "one"), WriteOptions::editor())
        .await
        .unwrap();

    let mut draft = saved.to_draft();
    draft.rendered_content = "two".into();
    fx.sync.save(draft, WriteOptions::editor()).await.unwrap();

    let revisions = fx.host.revisions_of(saved.id);
    assert_eq!(revisions.len(), 1);
    assert_eq!(revisions[0].source_content, "two");
    assert!(fx.registry.is_markdown(revisions[0].id).await);
}

#[tokio::test]
async fn suppressed_retention_writes_no_revision() {
    let fx = fixture(true).await;
    let saved = fx
        .sync
        .save(ItemDraft::new(ItemKind::Post, "one"), WriteOptions::editor())
        .await
        .unwrap();

    fx.sync
        .save(saved.to_draft(), WriteOptions::editor().without_revision())
        .await
        .unwrap();

    assert!(fx.host.revisions_of(saved.id).is_empty());
}

#[tokio::test]
async fn autosave_renders_under_parent_namespace() {
    let fx = fixture(true).await;
    let parent = fx
        .sync
        .save(ItemDraft::new(ItemKind::Post, "parent"), WriteOptions::editor())
        .await
        .unwrap();

    let autosave = ItemDraft::new(ItemKind::Revision, "preview me")
        .with_parent(parent.id)
        .with_name(format!("{}-autosave-v1", parent.id));
    let saved = fx.sync.save(autosave, WriteOptions::editor()).await.unwrap();

    assert_eq!(saved.source_content, "preview me");
    assert_eq!(
        saved.rendered_content,
        format!("<md ns=\"{}-\">preview me</md>", parent.id)
    );
    assert!(fx.registry.is_markdown(saved.id).await);
}

#[tokio::test]
async fn rejected_flag_write_leaves_item_unflagged() {
    let fx = fixture(true).await;
    fx.host.set_reject_flag_writes(true);

    let saved = fx
        .sync
        .save(ItemDraft::new(ItemKind::Post, "text"), WriteOptions::editor())
        .await
        .unwrap();

    assert_eq!(saved.source_content, "text");
    assert!(!fx.host.is_flagged(saved.id).await.unwrap());
}

#[tokio::test]
async fn list_escaping_keeps_literal_bullets_out_of_html_lists() {
    let policy = SyncPolicy {
        list_escaping: true,
        ..SyncPolicy::default()
    };
    let hooks = TransformHooks::new().before(|text, _| unescape_lists(&text));
    let fx = fixture_with(true, policy, hooks).await;

    let saved = fx
        .sync
        .save(ItemDraft::new(ItemKind::Post, "* one"), WriteOptions::editor())
        .await
        .unwrap();

    assert_eq!(saved.source_content, "* one");
    assert_eq!(saved.rendered_content, "<md ns=\"\">* one</md>");
}

#[tokio::test]
async fn update_of_missing_item_is_reported() {
    let fx = fixture(true).await;

    let err = fx
        .sync
        .save(
            ItemDraft::new(ItemKind::Post, "x").with_id(ItemId::new(404)),
            WriteOptions::editor(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::Repo(RepoError::NotFound)));
}

#[tokio::test]
async fn editable_view_of_unknown_item_is_not_found() {
    let fx = fixture(true).await;

    let err = fx.sync.editable_view(ItemId::new(9)).await.unwrap_err();
    assert!(matches!(err, SyncError::NotFound { entity: "item", .. }));
}

#[tokio::test]
async fn comments_follow_the_commenting_scope() {
    let fx = fixture(true).await;
    assert_eq!(fx.sync.prepare_comment("*hi*").await, "*hi*");

    fx.registry.set_commenting_enabled(true).await.unwrap();
    let namespace = comment_namespace("*hi*");
    assert_eq!(
        fx.sync.prepare_comment("*hi*").await,
        format!("<md ns=\"{namespace}-\">*hi*</md>")
    );
    assert_eq!(
        fx.sync.preview_comment("*hi*").await,
        "<md ns=\"\">*hi*</md>"
    );
}

#[tokio::test]
async fn post_preview_follows_the_posting_scope() {
    let fx = fixture(false).await;
    assert_eq!(fx.sync.preview_post("*a*").await, "*a*");

    fx.registry.set_posting_enabled(true).await.unwrap();
    assert_eq!(fx.sync.preview_post("*a*").await, "<md ns=\"\">*a*</md>");
}
