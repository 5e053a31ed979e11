//! Markdown transform pipeline.
//!
//! The pipeline is pure: it accepts editor text, hands the normalised
//! Markdown to an injected renderer, and returns HTML. Persisting either
//! representation is the synchronizer's job.

mod hooks;
pub(crate) mod service;
mod types;

pub use hooks::{TransformHook, TransformHooks};
pub use service::{
    ComrakRenderer, DEFAULT_STRUCTURED_MARKER, TransformPipeline, codeblock_preserve,
    codeblock_restore, escape_lists, unescape_lists,
};
pub use types::{MarkdownRenderer, RenderError, RenderOptions, TransformContext};
