//! Markdown enablement: the two scope toggles and the per-item flag.
//!
//! Nothing is cached here. Every query goes to the host so a toggle flipped
//! mid-request is observed by the very next read.

use std::sync::Arc;

use metrics::counter;
use tracing::{debug, warn};

use crate::application::repos::{ItemMetadataStore, RepoError, Scope, ScopeSettingsStore};
use crate::domain::types::ItemId;

const SOURCE: &str = "duomark::registry";

#[derive(Clone)]
pub struct MarkdownRegistry {
    settings: Arc<dyn ScopeSettingsStore>,
    metadata: Arc<dyn ItemMetadataStore>,
}

impl MarkdownRegistry {
    pub fn new(settings: Arc<dyn ScopeSettingsStore>, metadata: Arc<dyn ItemMetadataStore>) -> Self {
        Self { settings, metadata }
    }

    pub async fn is_posting_enabled(&self) -> bool {
        self.scope_enabled(Scope::Posting).await
    }

    pub async fn is_commenting_enabled(&self) -> bool {
        self.scope_enabled(Scope::Commenting).await
    }

    pub async fn set_posting_enabled(&self, enabled: bool) -> Result<(), RepoError> {
        self.settings.set_flag(Scope::Posting, enabled).await
    }

    pub async fn set_commenting_enabled(&self, enabled: bool) -> Result<(), RepoError> {
        self.settings.set_flag(Scope::Commenting, enabled).await
    }

    pub async fn is_markdown(&self, id: ItemId) -> bool {
        match self.metadata.is_flagged(id).await {
            Ok(flagged) => flagged,
            Err(err) => {
                warn!(target = SOURCE, item = %id, error = %err, "markdown flag lookup failed");
                false
            }
        }
    }

    /// Records `id` as Markdown-authored. A failed write leaves the item
    /// unflagged; callers do not retry.
    pub async fn set_markdown(&self, id: ItemId) -> bool {
        match self.metadata.set_flagged(id).await {
            Ok(true) => {
                counter!("duomark_flag_commit_total").increment(1);
                debug!(target = SOURCE, item = %id, "markdown flag committed");
                true
            }
            Ok(false) => {
                counter!("duomark_flag_commit_failed_total").increment(1);
                warn!(target = SOURCE, item = %id, "host rejected markdown flag write");
                false
            }
            Err(err) => {
                counter!("duomark_flag_commit_failed_total").increment(1);
                warn!(target = SOURCE, item = %id, error = %err, "markdown flag write failed");
                false
            }
        }
    }

    async fn scope_enabled(&self, scope: Scope) -> bool {
        match self.settings.get_flag(scope).await {
            Ok(value) => value.unwrap_or(false),
            Err(err) => {
                warn!(
                    target = SOURCE,
                    setting = scope.setting_key(),
                    error = %err,
                    "scope setting lookup failed"
                );
                false
            }
        }
    }
}

/// Raw settings-form value cast to a boolean toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeToggle(pub bool);

impl ScopeToggle {
    pub fn from_form_value(raw: &str) -> Self {
        let value = raw.trim();
        let off = value.is_empty()
            || value == "0"
            || value.eq_ignore_ascii_case("false")
            || value.eq_ignore_ascii_case("off");
        Self(!off)
    }
}
