use thiserror::Error;

use crate::application::repos::RepoError;
use crate::domain::types::{ItemId, ItemKind};

/// Where a write request came from. Only the editor path re-derives both
/// representations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteOrigin {
    #[default]
    Editor,
    /// Inline list-screen edit; never overwrites saved Markdown.
    QuickEdit,
    /// Bulk edit writes go straight to storage with every stage skipped.
    BulkEdit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RevisionRetention {
    #[default]
    Keep,
    /// The write must not leave a revision snapshot behind.
    Suppress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WriteOptions {
    pub origin: WriteOrigin,
    pub retention: RevisionRetention,
}

impl WriteOptions {
    pub fn editor() -> Self {
        Self::default()
    }

    pub fn quick_edit() -> Self {
        Self {
            origin: WriteOrigin::QuickEdit,
            ..Self::default()
        }
    }

    pub fn bulk_edit() -> Self {
        Self {
            origin: WriteOrigin::BulkEdit,
            ..Self::default()
        }
    }

    pub fn without_revision(mut self) -> Self {
        self.retention = RevisionRetention::Suppress;
        self
    }
}

/// Which items the synchronizer manages and how it filters saves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncPolicy {
    pub supported_kinds: Vec<ItemKind>,
    pub list_escaping: bool,
}

impl Default for SyncPolicy {
    fn default() -> Self {
        Self {
            supported_kinds: vec![ItemKind::Post, ItemKind::Page, ItemKind::Revision],
            list_escaping: false,
        }
    }
}

impl SyncPolicy {
    pub fn supports(&self, kind: &ItemKind) -> bool {
        self.supported_kinds.contains(kind)
    }
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: ItemId },
}

impl SyncError {
    pub fn not_found(entity: &'static str, id: ItemId) -> Self {
        Self::NotFound { entity, id }
    }
}
