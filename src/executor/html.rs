// Visible-text extraction from HTML pages

use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Elements whose whole subtree is dropped before text extraction
const DROPPED_ELEMENTS: [&str; 5] = ["script", "style", "nav", "footer", "header"];

static COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid comment regex"));

static DROPPED: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    DROPPED_ELEMENTS
        .iter()
        .map(|tag| {
            Regex::new(&format!(r"(?is)<{tag}\b[^>]*>.*?</{tag}\s*>"))
                .expect("valid element regex")
        })
        .collect()
});

/// A tag must open with a name, `/`, `!` or `?`; a bare `<` in text stays text
static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[/!?a-zA-Z][^>]*>").expect("valid tag regex"));

static TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<title\b[^>]*>(.*?)</title\s*>").expect("valid title regex")
});

static ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|[a-zA-Z]+);").expect("valid entity regex")
});

/// Text of the `<title>` element, or `None` when absent or blank
pub fn extract_title(html: &str) -> Option<String> {
    let raw = TITLE.captures(html)?.get(1)?.as_str();
    let title = decode_entities(raw).trim().to_string();
    (!title.is_empty()).then_some(title)
}

/// Visible text of a page: one trimmed text node per line, empty nodes dropped
pub fn extract_text(html: &str) -> String {
    let mut cleaned = COMMENT.replace_all(html, "").into_owned();
    for element in DROPPED.iter() {
        cleaned = element.replace_all(&cleaned, "").into_owned();
    }

    TAG.split(&cleaned)
        .map(|node| decode_entities(node).trim().to_string())
        .filter(|node| !node.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Flatten an inline fragment (a link title, a snippet) to single-spaced text
pub fn inline_text(fragment: &str) -> String {
    let stripped = TAG.replace_all(fragment, "");
    decode_entities(&stripped)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Decode numeric and the common named character references in one pass
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    ENTITY
        .replace_all(text, |caps: &Captures| {
            let body = &caps[1];
            let decoded = if let Some(hex) = body
                .strip_prefix("#x")
                .or_else(|| body.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = body.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                named_entity(body)
            };
            match decoded {
                Some(c) => c.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

fn named_entity(name: &str) -> Option<char> {
    let c = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        "copy" => '©',
        "reg" => '®',
        "hellip" => '…',
        "mdash" => '—',
        "ndash" => '–',
        "lsquo" => '‘',
        "rsquo" => '’',
        "ldquo" => '“',
        "rdquo" => '”',
        _ => return None,
    };
    Some(c)
}
