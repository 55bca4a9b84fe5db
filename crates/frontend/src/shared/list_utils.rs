//! Cell formatting shared by event tables and dashboard panels
use leptos::prelude::*;

/// Width of hostname/user/process cells.
pub const CELL_TEXT_LEN: usize = 20;

/// Cut `text` to `max_chars` characters, marking the cut with "...".
pub fn truncate_text(text: Option<&str>, max_chars: usize) -> String {
    let text = text.unwrap_or_default();
    if text.chars().count() > max_chars {
        let head: String = text.chars().take(max_chars).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

pub fn severity_class(severity: &str) -> String {
    format!("severity-{}", severity.to_lowercase())
}

/// Colored severity label; missing severity shows as LOW.
#[component]
pub fn SeverityBadge(#[prop(into)] severity: String) -> impl IntoView {
    let level = if severity.trim().is_empty() {
        "low".to_string()
    } else {
        severity.to_lowercase()
    };
    let class = format!("severity-badge {}", severity_class(&level));

    view! { <span class=class>{level.to_uppercase()}</span> }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text(Some("web-01"), CELL_TEXT_LEN), "web-01");
        assert_eq!(
            truncate_text(Some("a-very-long-hostname-in-the-dmz"), CELL_TEXT_LEN),
            "a-very-long-hostname..."
        );
        assert_eq!(truncate_text(Some("ровно-двадцать-букв!"), CELL_TEXT_LEN), "ровно-двадцать-букв!");
        assert_eq!(truncate_text(None, CELL_TEXT_LEN), "");
    }

    #[test]
    fn test_severity_class() {
        assert_eq!(severity_class("HIGH"), "severity-high");
    }
}
