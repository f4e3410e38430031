//! Input helpers shared by the resource plugins.

/// Trims and HTML-escapes free-text input before it is persisted.
pub fn sanitize(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.trim().chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            other => out.push(other),
        }
    }
    out
}

/// Drops anything between `<` and `>` so derived excerpts never carry markup.
pub fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            other if !in_tag => out.push(other),
            _ => {}
        }
    }
    out
}

/// Form fields arrive as strings; accept the usual truthy spellings.
pub fn parse_bool(value: &str) -> bool {
    matches!(value.trim(), "1" | "true" | "TRUE" | "True" | "on")
}

/// Resolves a record id for DELETE requests: the query parameter wins,
/// otherwise the JSON body is probed for an `id` field.
pub fn delete_id(query_id: Option<i32>, body: &[u8]) -> Option<i32> {
    if query_id.is_some() {
        return query_id;
    }
    serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("id").and_then(|id| id.as_i64()))
        .map(|id| id as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_trims_and_escapes() {
        assert_eq!(sanitize("  <b>hi</b> "), "&lt;b&gt;hi&lt;/b&gt;");
        assert_eq!(sanitize("a \"quote\""), "a &quot;quote&quot;");
    }

    #[test]
    fn strip_tags_removes_markup() {
        assert_eq!(strip_tags("<p>Hello <em>world</em></p>"), "Hello world");
        assert_eq!(strip_tags("no markup"), "no markup");
    }

    #[test]
    fn delete_id_prefers_query_param() {
        assert_eq!(delete_id(Some(7), br#"{"id": 3}"#), Some(7));
        assert_eq!(delete_id(None, br#"{"id": 3}"#), Some(3));
        assert_eq!(delete_id(None, b"not json"), None);
        assert_eq!(delete_id(None, b""), None);
    }
}
