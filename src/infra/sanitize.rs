//! Host save filters.

use ammonia::Builder as AmmoniaBuilder;

use crate::application::render::service::config::build_content_sanitizer;
use crate::application::repos::ContentFilters;

/// Leaves content untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughFilters;

impl ContentFilters for PassthroughFilters {
    fn sanitize_on_save(&self, content: String) -> String {
        content
    }
}

/// Allow-list HTML cleaning on every save.
pub struct AmmoniaFilters {
    builder: AmmoniaBuilder<'static>,
}

impl AmmoniaFilters {
    pub fn new() -> Self {
        Self {
            builder: build_content_sanitizer(),
        }
    }
}

impl Default for AmmoniaFilters {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentFilters for AmmoniaFilters {
    fn sanitize_on_save(&self, content: String) -> String {
        self.builder.clean(&content).to_string()
    }
}
