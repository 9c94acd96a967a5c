use std::sync::LazyLock;

use regex::Regex;

/// A `<think>…</think>` span, newlines included, shortest match.
static REASONING_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<think>.*?</think>").expect("static regex"));

/// Removes model reasoning markup from generated text.
///
/// Every complete `<think>…</think>` span is dropped, markers included. Removal
/// repeats until no complete span is left, so the result is a fixed point.
/// Unpaired markers and everything outside the spans are kept as is.
pub fn strip_reasoning(text: &str) -> String {
    let mut current = text.to_string();
    while REASONING_SPAN.is_match(&current) {
        current = REASONING_SPAN.replace_all(&current, "").into_owned();
    }
    current
}
