//! Entity-encoding of fenced code bodies so a host sanitizer cannot mangle
//! them between the editor and the renderer.

use once_cell::sync::Lazy;
use regex::Regex;

// The closing fence must repeat the opening one; the regex engine has no
// back-references so the comparison happens in `rewrite_fences`.
static FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^([`~]{3})([^`\n]+)?\n([^`~]+)([`~]{3})").expect("valid fence pattern")
});

const ENCODE_TABLE: [(char, &str); 5] = [
    ('&', "&amp;"),
    ('<', "&lt;"),
    ('>', "&gt;"),
    ('"', "&quot;"),
    ('\'', "&#039;"),
];

const DECODE_TABLE: [(&str, char); 7] = [
    ("&amp;", '&'),
    ("&lt;", '<'),
    ("&gt;", '>'),
    ("&quot;", '"'),
    ("&#039;", '\''),
    ("&#39;", '\''),
    ("&#x27;", '\''),
];

/// Encode HTML-sensitive characters inside every recognised fence body.
pub fn codeblock_preserve(text: &str) -> String {
    rewrite_fences(text, encode_entities)
}

/// Exact inverse of [`codeblock_preserve`].
pub fn codeblock_restore(text: &str) -> String {
    rewrite_fences(text, decode_entities)
}

fn rewrite_fences(text: &str, rewrite: fn(&str) -> String) -> String {
    let mut output = String::with_capacity(text.len());
    let mut copied = 0;
    let mut cursor = 0;

    while cursor < text.len() {
        let Some(caps) = FENCE.captures_at(text, cursor) else {
            break;
        };
        let (Some(whole), Some(open), Some(body), Some(close)) =
            (caps.get(0), caps.get(1), caps.get(3), caps.get(4))
        else {
            break;
        };

        if open.as_str() != close.as_str() {
            // Fence characters are ASCII, so one byte on is a char boundary.
            cursor = whole.start() + 1;
            continue;
        }

        output.push_str(&text[copied..body.start()]);
        output.push_str(&rewrite(body.as_str()));
        output.push_str(close.as_str());
        copied = whole.end();
        cursor = whole.end();
    }

    output.push_str(&text[copied..]);
    output
}

fn encode_entities(body: &str) -> String {
    let mut encoded = String::with_capacity(body.len());
    for ch in body.chars() {
        match ENCODE_TABLE.iter().find(|(needle, _)| *needle == ch) {
            Some((_, entity)) => encoded.push_str(entity),
            None => encoded.push(ch),
        }
    }
    encoded
}

fn decode_entities(body: &str) -> String {
    let mut decoded = String::with_capacity(body.len());
    let mut rest = body;

    while let Some(pos) = rest.find('&') {
        decoded.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        match DECODE_TABLE
            .iter()
            .find(|(entity, _)| tail.starts_with(entity))
        {
            Some((entity, ch)) => {
                decoded.push(*ch);
                rest = &tail[entity.len()..];
            }
            None => {
                decoded.push('&');
                rest = &tail[1..];
            }
        }
    }

    decoded.push_str(rest);
    decoded
}
