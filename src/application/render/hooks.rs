//! Extension points run before and after conversion.

use std::{fmt, sync::Arc};

use super::types::TransformContext;

pub type TransformHook = Arc<dyn Fn(String, &TransformContext) -> String + Send + Sync>;

/// Ordered callables invoked at the two fixed points of the pipeline.
#[derive(Clone, Default)]
pub struct TransformHooks {
    pre: Vec<TransformHook>,
    post: Vec<TransformHook>,
}

impl TransformHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rewrite of the Markdown input. Also applied to the source
    /// text the synchronizer stores.
    pub fn before<F>(mut self, hook: F) -> Self
    where
        F: Fn(String, &TransformContext) -> String + Send + Sync + 'static,
    {
        self.pre.push(Arc::new(hook));
        self
    }

    /// Register a rewrite of the rendered HTML.
    pub fn after<F>(mut self, hook: F) -> Self
    where
        F: Fn(String, &TransformContext) -> String + Send + Sync + 'static,
    {
        self.post.push(Arc::new(hook));
        self
    }

    pub fn run_pre(&self, text: String, ctx: &TransformContext) -> String {
        self.pre.iter().fold(text, |acc, hook| hook(acc, ctx))
    }

    pub fn run_post(&self, html: String, ctx: &TransformContext) -> String {
        self.post.iter().fold(html, |acc, hook| hook(acc, ctx))
    }
}

impl fmt::Debug for TransformHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformHooks")
            .field("pre", &self.pre.len())
            .field("post", &self.post.len())
            .finish()
    }
}
