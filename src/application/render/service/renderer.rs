use comrak::{Arena, format_html, nodes::AstNode, parse_document};

use crate::application::render::types::{MarkdownRenderer, RenderError, RenderOptions};
use crate::config::RendererSettings;

use super::config::options_for;
use super::rewrite::namespace_footnotes;

/// GFM renderer backed by comrak.
pub struct ComrakRenderer {
    options: comrak::options::Options<'static>,
}

impl ComrakRenderer {
    pub fn new(settings: &RendererSettings) -> Self {
        Self {
            options: options_for(settings),
        }
    }
}

impl Default for ComrakRenderer {
    fn default() -> Self {
        Self::new(&RendererSettings::default())
    }
}

impl MarkdownRenderer for ComrakRenderer {
    fn render(&self, markdown: &str, options: &RenderOptions) -> Result<String, RenderError> {
        let arena = Arena::new();
        let root = parse_document(&arena, markdown, &self.options);
        namespace_footnotes(root, &options.footnote_prefix);
        render_html_stage(root, &self.options)
    }
}

fn render_html_stage<'a>(
    root: &'a AstNode<'a>,
    options: &comrak::options::Options<'static>,
) -> Result<String, RenderError> {
    let mut html = String::new();
    match format_html(root, options, &mut html) {
        Ok(()) => Ok(html),
        Err(err) => Err(RenderError::Markdown {
            message: err.to_string(),
            partial_html: (!html.is_empty()).then_some(html),
        }),
    }
}
