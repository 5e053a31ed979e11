use thiserror::Error;

/// Per-call parameters of [`super::TransformPipeline::transform`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformContext {
    /// Namespace for footnote anchors; `None` or empty means no prefix.
    pub id: Option<String>,
    /// Input arrives backslash-escaped and the output must be escaped again.
    pub unslash: bool,
    /// Fenced code bodies are already entity-encoded and must be decoded
    /// before the renderer encodes them a second time.
    pub decode_code_blocks: bool,
}

impl Default for TransformContext {
    fn default() -> Self {
        Self {
            id: None,
            unslash: false,
            decode_code_blocks: true,
        }
    }
}

impl TransformContext {
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    pub fn unslashed(mut self, unslash: bool) -> Self {
        self.unslash = unslash;
        self
    }

    pub fn decoding_code_blocks(mut self, decode: bool) -> Self {
        self.decode_code_blocks = decode;
        self
    }

    /// Footnote anchor prefix derived from the namespace.
    pub fn footnote_prefix(&self) -> String {
        match self.id.as_deref() {
            Some(id) if !id.is_empty() => format!("{id}-"),
            _ => String::new(),
        }
    }
}

/// Options handed to a renderer for a single call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOptions {
    pub footnote_prefix: String,
}

/// Failures reported by a renderer. `partial_html` carries whatever output
/// the renderer produced before giving up.
#[derive(Debug, Clone, Error)]
pub enum RenderError {
    #[error("markdown rendering failed: {message}")]
    Markdown {
        message: String,
        partial_html: Option<String>,
    },
}

impl RenderError {
    pub fn markdown(message: impl Into<String>) -> Self {
        Self::Markdown {
            message: message.into(),
            partial_html: None,
        }
    }

    /// Raw output surfaced to callers in place of rendered HTML.
    pub fn into_raw_output(self) -> String {
        match self {
            RenderError::Markdown {
                partial_html: Some(html),
                ..
            } => html,
            other => other.to_string(),
        }
    }
}

/// Markdown to HTML capability. Implementations must be deterministic.
pub trait MarkdownRenderer: Send + Sync {
    fn render(&self, markdown: &str, options: &RenderOptions) -> Result<String, RenderError>;
}
