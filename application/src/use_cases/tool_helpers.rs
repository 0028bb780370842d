//! Shared helpers for tool use cases.

use workbench_domain::tool::entities::ToolCall;

/// Extract a short preview string from tool call arguments.
///
/// Looks for well-known keys (`file`, `url`, `base_url`, `sql`, `container`,
/// `script`, `query`) first, then falls back to the first string value found.
pub(crate) fn tool_args_preview(call: &ToolCall) -> String {
    let keys = ["file", "url", "base_url", "sql", "container", "script", "query"];
    for key in &keys {
        if let Some(serde_json::Value::String(s)) = call.arguments.get(*key) {
            return truncate_preview(s, 50);
        }
    }
    let mut strings: Vec<(&String, &str)> = call
        .arguments
        .iter()
        .filter_map(|(k, v)| v.as_str().map(|s| (k, s)))
        .collect();
    strings.sort_by(|a, b| a.0.cmp(b.0));
    strings
        .first()
        .map(|(_, s)| truncate_preview(s, 50))
        .unwrap_or_default()
}

fn truncate_preview(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{}…", truncated)
    }
}
