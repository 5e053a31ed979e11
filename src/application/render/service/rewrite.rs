use comrak::nodes::{AstNode, NodeValue};

/// Prefixes every footnote label in the tree so anchors from several items
/// rendered on one page cannot collide.
pub(crate) fn namespace_footnotes<'a>(root: &'a AstNode<'a>, prefix: &str) -> usize {
    if prefix.is_empty() {
        return 0;
    }

    let mut renamed = 0;
    for node in root.descendants() {
        let mut data = node.data.borrow_mut();
        match &mut data.value {
            NodeValue::FootnoteReference(reference) => {
                reference.name = format!("{prefix}{}", reference.name).into();
                renamed += 1;
            }
            NodeValue::FootnoteDefinition(definition) => {
                definition.name = format!("{prefix}{}", definition.name).into();
                renamed += 1;
            }
            _ => {}
        }
    }
    renamed
}

#[cfg(test)]
mod tests {
    use comrak::{Arena, format_html, parse_document};

    use super::*;
    use crate::application::render::service::config::default_options;

    #[test]
    fn labels_gain_prefix() {
        let options = default_options();
        let arena = Arena::new();
        let root = parse_document(&arena, "Note[^a].\n\n[^a]: Body.\n", &options);

        assert_eq!(namespace_footnotes(root, "42-"), 2);

        let mut html = String::new();
        format_html(root, &options, &mut html).unwrap();
        assert!(html.contains("href=\"#fn-42-a\""), "{html}");
        assert!(html.contains("id=\"fn-42-a\""), "{html}");
    }

    #[test]
    fn empty_prefix_leaves_tree_alone() {
        let options = default_options();
        let arena = Arena::new();
        let root = parse_document(&arena, "Note[^a].\n\n[^a]: Body.\n", &options);
        assert_eq!(namespace_footnotes(root, ""), 0);
    }
}
