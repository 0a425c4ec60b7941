//! Plain-text helpers for the HTML fields the content API returns.

use regex::Regex;
use std::sync::OnceLock;

fn tag_pattern() -> &'static Regex {
    static TAG: OnceLock<Regex> = OnceLock::new();
    TAG.get_or_init(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"))
}

/// Drop every markup tag and expand the `[&hellip;]` read-more marker.
///
/// Entities other than the read-more marker are left as they are.
pub fn strip_html(html: &str) -> String {
    tag_pattern()
        .replace_all(html, "")
        .replace("[&hellip;]", "...")
}

/// Cut `text` to at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}
