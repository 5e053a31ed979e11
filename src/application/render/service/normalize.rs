//! Text normalisation applied around the renderer call.

use once_cell::sync::Lazy;
use regex::Regex;

static UNWRAP_PARAGRAPH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<p>(.*?)</p>(\n|$)").expect("valid paragraph pattern"));
static ESCAPED_QUOTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^&gt;").expect("valid blockquote pattern"));
static COLON_FOOTNOTE_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r##"((id|href)="#?fn(ref)?):"##).expect("valid footnote id pattern")
});
static LITERAL_BULLET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\* ").expect("valid bullet pattern"));
static ESCAPED_BULLET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^&#0?42; ").expect("valid escaped bullet pattern"));

/// Whether `text` carries any of the structured-editor markers.
pub(crate) fn is_structured(text: &str, markers: &[String]) -> bool {
    markers
        .iter()
        .any(|marker| !marker.is_empty() && text.contains(marker.as_str()))
}

pub(crate) fn join_paragraphs(text: &str) -> String {
    text.replace("</p><p>", "</p>\n\n<p>")
        .replace("</p>\n<p>", "</p>\n\n<p>")
}

/// Drops `<p>` wrappers a visual editor added around Markdown lines.
pub(crate) fn unwrap_paragraphs(text: &str) -> String {
    UNWRAP_PARAGRAPH.replace_all(text, "$1$2").into_owned()
}

pub(crate) fn repair_blockquotes(text: &str) -> String {
    ESCAPED_QUOTE.replace_all(text, ">").into_owned()
}

/// Rewrites colon-style footnote anchors (`fn:1`) into the dashed form
/// sanitizers accept.
pub(crate) fn fix_footnote_ids(html: &str) -> String {
    COLON_FOOTNOTE_ID.replace_all(html, "${1}-").into_owned()
}

/// Protects line-initial `* ` from being read as a list marker.
pub fn escape_lists(text: &str) -> String {
    LITERAL_BULLET.replace_all(text, "&#42; ").into_owned()
}

pub fn unescape_lists(text: &str) -> String {
    ESCAPED_BULLET.replace_all(text, "* ").into_owned()
}

/// Removes one level of backslash escaping.
pub(crate) fn unslash(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some('0') => output.push('\0'),
                Some(escaped) => output.push(escaped),
                None => {}
            }
        } else {
            output.push(ch);
        }
    }
    output
}

/// Adds backslash escaping to quotes, backslashes and NUL.
pub(crate) fn slash(text: &str) -> String {
    let mut output = String::with_capacity(text.len() + text.len() / 8);
    for ch in text.chars() {
        match ch {
            '\'' | '"' | '\\' => {
                output.push('\\');
                output.push(ch);
            }
            '\0' => output.push_str("\\0"),
            _ => output.push(ch),
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structured_markers_short_circuit() {
        let markers = vec!["<!-- wp:".to_string()];
        assert!(is_structured("<!-- wp:paragraph -->x", &markers));
        assert!(!is_structured("plain *markdown*", &markers));
        assert!(!is_structured("anything", &[String::new()]));
    }

    #[test]
    fn adjacent_paragraphs_are_separated() {
        assert_eq!(
            join_paragraphs("<p>a</p><p>b</p>\n<p>c</p>"),
            "<p>a</p>\n\n<p>b</p>\n\n<p>c</p>"
        );
    }

    #[test]
    fn editor_paragraphs_are_unwrapped() {
        assert_eq!(
            unwrap_paragraphs("<p>*one*</p>\n\n<p>two</p>"),
            "*one*\n\ntwo"
        );
        assert_eq!(unwrap_paragraphs("<p>inline</p> tail"), "<p>inline</p> tail");
    }

    #[test]
    fn encoded_quote_markers_are_repaired() {
        assert_eq!(repair_blockquotes("&gt; quoted\ntext &gt; kept"), "> quoted\ntext &gt; kept");
    }

    #[test]
    fn colon_footnote_ids_become_dashed() {
        let html = r##"<sup id="fnref:1"><a href="#fn:1">1</a></sup><li id="fn:1">"##;
        assert_eq!(
            fix_footnote_ids(html),
            r##"<sup id="fnref-1"><a href="#fn-1">1</a></sup><li id="fn-1">"##
        );
    }

    #[test]
    fn list_escaping_round_trips() {
        let text = "* first\n* second\nnot * here\n&#42; already";
        let escaped = escape_lists(text);
        assert_eq!(escaped, "&#42; first\n&#42; second\nnot * here\n&#42; already");
        assert_eq!(unescape_lists(&escaped), "* first\n* second\nnot * here\n* already");
        assert_eq!(unescape_lists("&#042; legacy"), "* legacy");
    }

    #[test]
    fn slashing_round_trips() {
        let text = r#"it's "quoted" \ and a nul: "#.to_string() + "\0";
        assert_eq!(unslash(&slash(&text)), text);
        assert_eq!(unslash(r"a\'b\\c"), r"a'b\c");
    }
}
