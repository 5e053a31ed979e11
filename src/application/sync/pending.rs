use std::collections::HashSet;

use crate::domain::entities::ContentItem;
use crate::domain::types::ItemId;

/// Items waiting for their Markdown flag until the write that produced them
/// has committed. Lives for exactly one `save` call.
#[derive(Debug, Default)]
pub(crate) struct PendingFlags {
    items: HashSet<ItemId>,
    contents: Vec<String>,
    parents: HashSet<ItemId>,
}

impl PendingFlags {
    pub(crate) fn queue_item(&mut self, id: ItemId) {
        self.items.insert(id);
    }

    /// New items have no id yet; they are recognised by the content that
    /// gets persisted.
    pub(crate) fn queue_content(&mut self, content: String) {
        self.contents.push(content);
    }

    pub(crate) fn queue_parent(&mut self, parent: ItemId) {
        self.parents.insert(parent);
    }

    /// Consumes the entries matching `saved` and reports whether it must be
    /// flagged. A content match and an id match are checked independently;
    /// the parent entry is only consulted when the id was not queued.
    pub(crate) fn take_for(&mut self, saved: &ContentItem) -> bool {
        let content_hit = match self
            .contents
            .iter()
            .position(|content| *content == saved.rendered_content)
        {
            Some(index) => {
                self.contents.swap_remove(index);
                true
            }
            None => false,
        };

        let item_hit = self.items.remove(&saved.id);
        let parent_hit = !item_hit
            && saved
                .parent
                .is_some_and(|parent| self.parents.remove(&parent));

        content_hit || item_hit || parent_hit
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.items.is_empty() && self.contents.is_empty() && self.parents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::ItemKind;

    fn stored(id: u64, parent: Option<u64>, rendered: &str) -> ContentItem {
        ContentItem {
            id: ItemId::new(id),
            kind: ItemKind::Post,
            name: String::new(),
            parent: parent.map(ItemId::new),
            rendered_content: rendered.into(),
            source_content: String::new(),
        }
    }

    #[test]
    fn content_snapshot_matches_new_item() {
        let mut pending = PendingFlags::default();
        pending.queue_content("<p>hi</p>".into());

        assert!(!pending.take_for(&stored(1, None, "<p>other</p>")));
        assert!(pending.take_for(&stored(2, None, "<p>hi</p>")));
        assert!(pending.is_empty());
    }

    #[test]
    fn id_entries_are_consumed_once() {
        let mut pending = PendingFlags::default();
        pending.queue_item(ItemId::new(4));

        assert!(pending.take_for(&stored(4, None, "")));
        assert!(!pending.take_for(&stored(4, None, "")));
    }

    #[test]
    fn parent_entry_flags_child() {
        let mut pending = PendingFlags::default();
        pending.queue_parent(ItemId::new(10));

        assert!(pending.take_for(&stored(11, Some(10), "")));
        assert!(pending.is_empty());
    }

    #[test]
    fn id_hit_leaves_parent_entry_queued() {
        let mut pending = PendingFlags::default();
        pending.queue_item(ItemId::new(11));
        pending.queue_parent(ItemId::new(10));

        assert!(pending.take_for(&stored(11, Some(10), "")));
        assert!(!pending.is_empty());
    }
}
