//! Content entities as the host persists them.

use serde::Serialize;

use crate::domain::types::{ItemId, ItemKind};

/// A stored content item. The engine only ever touches the two content
/// fields; everything else is owned by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentItem {
    pub id: ItemId,
    pub kind: ItemKind,
    /// Host slug. Autosaves are recognised by a `{parent}-autosave` prefix.
    pub name: String,
    pub parent: Option<ItemId>,
    /// HTML served for display.
    pub rendered_content: String,
    /// Markdown kept for re-editing.
    pub source_content: String,
}

impl ContentItem {
    pub fn has_source(&self) -> bool {
        !self.source_content.is_empty()
    }

    /// Draft that would write this item back unchanged.
    pub fn to_draft(&self) -> ItemDraft {
        ItemDraft {
            id: Some(self.id),
            kind: self.kind.clone(),
            name: self.name.clone(),
            parent: self.parent,
            rendered_content: self.rendered_content.clone(),
            source_content: self.source_content.clone(),
        }
    }
}

/// Field values carried by a write request. `id` is `None` until the host
/// assigns one on insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemDraft {
    pub id: Option<ItemId>,
    pub kind: ItemKind,
    pub name: String,
    pub parent: Option<ItemId>,
    pub rendered_content: String,
    pub source_content: String,
}

impl ItemDraft {
    pub fn new(kind: ItemKind, content: impl Into<String>) -> Self {
        Self {
            id: None,
            kind,
            name: String::new(),
            parent: None,
            rendered_content: content.into(),
            source_content: String::new(),
        }
    }

    pub fn with_id(mut self, id: ItemId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_parent(mut self, parent: ItemId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source_content = source.into();
        self
    }

    /// Autosaves written for previews are named `{parent}-autosave-v1`.
    pub fn autosave_parent(&self) -> Option<ItemId> {
        let parent = self.parent?;
        self.name
            .starts_with(&format!("{parent}-autosave"))
            .then_some(parent)
    }
}
