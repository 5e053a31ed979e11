mod codeblock;
pub(crate) mod config;
mod normalize;
mod renderer;
mod rewrite;

use std::{fmt, sync::Arc};

use tracing::{debug, warn};

use crate::application::render::hooks::TransformHooks;
use crate::application::render::types::{MarkdownRenderer, RenderOptions, TransformContext};

pub use codeblock::{codeblock_preserve, codeblock_restore};
pub use normalize::{escape_lists, unescape_lists};
pub use renderer::ComrakRenderer;

/// Marker identifying content authored in the structured block editor.
pub const DEFAULT_STRUCTURED_MARKER: &str = "<!-- wp:";

const SOURCE: &str = "duomark::render";

/// Markdown to HTML conversion with the normalisation the editors need on
/// either side of the renderer.
#[derive(Clone)]
pub struct TransformPipeline {
    renderer: Arc<dyn MarkdownRenderer>,
    hooks: TransformHooks,
    structured_markers: Vec<String>,
}

impl TransformPipeline {
    pub fn new(
        renderer: Arc<dyn MarkdownRenderer>,
        hooks: TransformHooks,
        structured_markers: Vec<String>,
    ) -> Self {
        Self {
            renderer,
            hooks,
            structured_markers,
        }
    }

    /// Pipeline with no hooks and the default structured-content marker.
    pub fn with_renderer(renderer: Arc<dyn MarkdownRenderer>) -> Self {
        Self::new(
            renderer,
            TransformHooks::default(),
            vec![DEFAULT_STRUCTURED_MARKER.to_string()],
        )
    }

    pub fn hooks(&self) -> &TransformHooks {
        &self.hooks
    }

    pub fn transform(&self, text: &str, ctx: &TransformContext) -> String {
        if normalize::is_structured(text, &self.structured_markers) {
            debug!(target = SOURCE, "structured content left untouched");
            return text.to_string();
        }

        let input = if ctx.unslash {
            normalize::unslash(text)
        } else {
            text.to_string()
        };

        match self.convert(input, ctx) {
            Ok(html) if ctx.unslash => normalize::slash(&html),
            Ok(html) => html,
            Err(raw) => raw,
        }
    }

    /// Rendered HTML, or the renderer's raw output when it failed.
    fn convert(&self, text: String, ctx: &TransformContext) -> Result<String, String> {
        let text = self.hooks.run_pre(text, ctx);
        let text = editor_cleanup_stage(&text);
        let options = RenderOptions {
            footnote_prefix: ctx.footnote_prefix(),
        };
        let text = if ctx.decode_code_blocks {
            codeblock_restore(&text)
        } else {
            text
        };

        match self.renderer.render(&text, &options) {
            Ok(html) => {
                let html = normalize::fix_footnote_ids(&html);
                let html = html.trim_end().to_string();
                Ok(self.hooks.run_post(html, ctx))
            }
            Err(err) => {
                warn!(
                    target = SOURCE,
                    id = ctx.id.as_deref().unwrap_or_default(),
                    error = %err,
                    "renderer failed; returning raw output"
                );
                Err(err.into_raw_output())
            }
        }
    }
}

impl fmt::Debug for TransformPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformPipeline")
            .field("hooks", &self.hooks)
            .field("structured_markers", &self.structured_markers)
            .finish_non_exhaustive()
    }
}

fn editor_cleanup_stage(text: &str) -> String {
    let joined = normalize::join_paragraphs(text);
    let unwrapped = normalize::unwrap_paragraphs(&joined);
    normalize::repair_blockquotes(&unwrapped)
}
