/// Sanitize user input for embedding in a Markdown heading.
/// Replaces newlines (which would break heading structure) with spaces.
pub(crate) fn sanitize_heading(s: &str) -> String {
    s.chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect()
}

/// Wrap a URL as a Markdown autolink unless it contains characters that end one.
pub(crate) fn autolink(url: &str) -> String {
    if url.contains(['<', '>', ' ']) {
        url.to_string()
    } else {
        format!("<{url}>")
    }
}
