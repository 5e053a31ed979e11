//! Editable views: the Markdown side of a stored item, produced without
//! touching the stored value.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::application::render::codeblock_restore;
use crate::domain::entities::ContentItem;
use crate::domain::types::ItemId;

static ESCAPED_QUOTE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^&gt; ").expect("valid blockquote pattern"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditableView {
    pub id: ItemId,
    /// Text handed to the editor.
    pub markdown: String,
    /// Rendered HTML kept alongside for previews.
    pub html: String,
}

impl EditableView {
    pub fn from_stored(item: &ContentItem) -> Self {
        let markdown = codeblock_restore(&item.source_content);
        let markdown = ESCAPED_QUOTE_LINE.replace_all(&markdown, "> ").into_owned();
        Self {
            id: item.id,
            markdown,
            html: item.rendered_content.clone(),
        }
    }

    /// Copy of `stored` whose content fields carry this view, Markdown in the
    /// rendered position. Used where readers only look at `rendered_content`.
    pub fn into_swapped(self, stored: &ContentItem) -> ContentItem {
        ContentItem {
            rendered_content: self.markdown,
            source_content: self.html,
            ..stored.clone()
        }
    }
}

pub fn swap_for_editing(item: &ContentItem) -> ContentItem {
    EditableView::from_stored(item).into_swapped(item)
}
