use std::sync::Arc;

use duomark::application::engine::{EngineOptions, MarkdownEngine};
use duomark::application::render::{ComrakRenderer, TransformHooks};
use duomark::application::sync::WriteOptions;
use duomark::domain::entities::{ContentItem, ItemDraft};
use duomark::domain::types::{ItemId, ItemKind};
use duomark::infra::memory::MemoryHost;
use duomark::infra::sanitize::PassthroughFilters;

const FIRST: &str = "# Hi\n\n*there*";
const SECOND: &str = "# Hi\n\n**there**";

async fn engine() -> (MarkdownEngine, Arc<MemoryHost>) {
    let host = Arc::new(MemoryHost::new());
    let engine = MarkdownEngine::new(
        host.adapters(Arc::new(PassthroughFilters)),
        Arc::new(ComrakRenderer::default()),
        TransformHooks::new(),
        EngineOptions::default(),
    );
    engine
        .registry()
        .set_posting_enabled(true)
        .await
        .expect("enable posting");
    (engine, host)
}

async fn edit(engine: &MarkdownEngine, item: &ContentItem, markdown: &str) -> ContentItem {
    let mut draft = item.to_draft();
    draft.rendered_content = markdown.to_string();
    engine
        .save(draft, WriteOptions::editor())
        .await
        .expect("edit")
}

/// Item whose history holds a revision of [`FIRST`] followed by one of
/// [`SECOND`], with [`SECOND`] current.
async fn item_with_history(engine: &MarkdownEngine) -> ContentItem {
    let created = engine
        .save(ItemDraft::new(ItemKind::Post, FIRST), WriteOptions::editor())
        .await
        .expect("create");
    let first = edit(engine, &created, FIRST).await;
    edit(engine, &first, SECOND).await
}

#[tokio::test]
async fn restoring_a_revision_restores_its_markdown() {
    let (engine, host) = engine().await;
    let item = item_with_history(&engine).await;
    assert_eq!(item.source_content, SECOND);

    let revisions = host.revisions_of(item.id);
    assert_eq!(revisions.len(), 2);
    assert_eq!(revisions[0].source_content, FIRST);

    let restored = engine
        .restore_revision(item.id, revisions[0].id)
        .await
        .expect("restore");

    assert_eq!(restored.source_content, FIRST);
    assert!(restored.rendered_content.contains("<h1>Hi</h1>"), "{}", restored.rendered_content);
    assert!(restored.rendered_content.contains("<em>there</em>"), "{}", restored.rendered_content);
    assert!(!restored.rendered_content.contains("<strong>"), "{}", restored.rendered_content);
    assert_eq!(engine.edit_view(&restored.rendered_content, item.id).await, FIRST);
}

#[tokio::test]
async fn trailing_revision_keeps_markdown_after_restore() {
    let (engine, host) = engine().await;
    let item = item_with_history(&engine).await;
    let target = host.revisions_of(item.id)[0].id;

    engine
        .restore_revision(item.id, target)
        .await
        .expect("restore");

    let revisions = host.revisions_of(item.id);
    let latest = revisions.last().expect("trailing revision");
    assert_ne!(latest.id, target);
    assert_eq!(latest.source_content, FIRST);
    assert!(engine.registry().is_markdown(latest.id).await);
}

#[tokio::test]
async fn restored_code_blocks_are_not_double_encoded() {
    let (engine, host) = engine().await;
    let fenced = "```\na < b\n```";

    let created = engine
        .save(ItemDraft::new(ItemKind::Post, fenced), WriteOptions::editor())
        .await
        .expect("create");
    let with_code = edit(&engine, &created, fenced).await;
    let current = edit(&engine, &with_code, "replaced").await;

    let target = host.revisions_of(current.id)[0].id;
    let restored = engine
        .restore_revision(current.id, target)
        .await
        .expect("restore");

    assert_eq!(restored.source_content, "```\na &lt; b\n```");
    assert!(restored.rendered_content.contains("a &lt; b"), "{}", restored.rendered_content);
    assert!(!restored.rendered_content.contains("&amp;lt;"), "{}", restored.rendered_content);
}

#[tokio::test]
async fn revisions_without_markdown_need_no_repair() {
    let (engine, host) = engine().await;
    engine
        .registry()
        .set_posting_enabled(false)
        .await
        .expect("disable posting");

    let created = engine
        .save(ItemDraft::new(ItemKind::Post, "<p>a</p>"), WriteOptions::editor())
        .await
        .expect("create");
    let current = edit(&engine, &created, "<p>b</p>").await;
    let revision = host.revisions_of(current.id)[0].id;

    let repaired = engine
        .revisions()
        .on_revision_restored(current.id, revision)
        .await
        .expect("repair check");
    assert!(!repaired);
}

#[tokio::test]
async fn disabled_scope_restore_keeps_revision_html() {
    let (engine, host) = engine().await;
    let item = item_with_history(&engine).await;
    let target = host.revisions_of(item.id)[0].clone();
    engine
        .registry()
        .set_posting_enabled(false)
        .await
        .expect("disable posting");

    let repaired = engine
        .revisions()
        .on_revision_restored(item.id, target.id)
        .await
        .expect("repair check");
    assert!(!repaired);

    let restored = engine
        .restore_revision(item.id, target.id)
        .await
        .expect("restore");
    assert_eq!(restored.rendered_content, target.rendered_content);
    assert!(restored.rendered_content.contains("<h1>Hi</h1>"), "{}", restored.rendered_content);

    let trailing = host.revisions_of(item.id);
    let latest = trailing.last().expect("trailing revision");
    assert_eq!(latest.rendered_content, target.rendered_content);
}

#[tokio::test]
async fn restoring_unknown_revision_is_not_found() {
    let (engine, _host) = engine().await;
    let item = item_with_history(&engine).await;

    let err = engine
        .restore_revision(item.id, ItemId::new(999))
        .await
        .expect_err("missing revision");
    assert!(err.to_string().contains("999"), "{err}");
}
