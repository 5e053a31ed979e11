use sha2::{Digest, Sha256};
use tracing::debug;

use crate::application::render::TransformContext;

use super::{ContentSynchronizer, SOURCE};

/// Footnote namespace for a comment body. Comments have no id at save time,
/// so the namespace is derived from the text itself.
pub fn comment_namespace(content: &str) -> String {
    let digest = Sha256::digest(content.as_bytes());
    format!("c-{}", hex::encode(&digest[..4]))
}

impl ContentSynchronizer {
    /// Comment body as it should be stored. Unchanged unless commenting with
    /// Markdown is enabled.
    pub async fn prepare_comment(&self, content: &str) -> String {
        if !self.registry.is_commenting_enabled().await {
            return content.to_string();
        }

        let ctx = TransformContext::with_id(comment_namespace(content));
        debug!(target = SOURCE, namespace = ?ctx.id, "transforming comment");
        self.pipeline.transform(content, &ctx)
    }

    /// Live preview of post text while posting with Markdown is enabled.
    pub async fn preview_post(&self, text: &str) -> String {
        if self.registry.is_posting_enabled().await {
            self.pipeline.transform(text, &TransformContext::default())
        } else {
            text.to_string()
        }
    }

    pub async fn preview_comment(&self, text: &str) -> String {
        if self.registry.is_commenting_enabled().await {
            self.pipeline.transform(text, &TransformContext::default())
        } else {
            text.to_string()
        }
    }
}
