//! Plain-text rendering of projections for the terminal.

use chrono::{DateTime, Utc};
use std::fmt::Write;

use crate::core::{relative_time, ConversationSummary, Message, SenderRole, ThreadView};

/// Conversation list, one line per conversation. `selected` is marked with `>`.
pub fn render_summaries(
    summaries: &[ConversationSummary],
    selected: Option<&str>,
    now: DateTime<Utc>,
) -> String {
    let mut out = String::new();

    if summaries.is_empty() {
        out.push_str("No conversations.\n");
        return out;
    }

    for summary in summaries {
        let marker = if selected == Some(summary.id.as_str()) { '>' } else { ' ' };
        let unread = if summary.unread_count > 0 {
            format!(" ({} unread)", summary.unread_count)
        } else {
            String::new()
        };
        let _ = writeln!(
            out,
            "{} {:<4} {:<18} [{}]{}",
            marker, summary.id, summary.customer_name, summary.channel, unread
        );
        let _ = writeln!(
            out,
            "       {}  {}",
            truncate(&summary.last_message_text, 60),
            summary.last_message_age(now)
        );
    }

    out
}

/// Active conversation header and messages.
pub fn render_thread(view: &ThreadView, now: DateTime<Utc>) -> String {
    let mut out = String::new();

    let ThreadView::Active(active) = view else {
        out.push_str("No Conversation Selected\n");
        out.push_str("Select a conversation from the list to view messages\n");
        return out;
    };

    let _ = writeln!(
        out,
        "{} ({}) - {}",
        active.customer.name,
        active.customer.id,
        active.channel.label()
    );
    if let Some(at) = active.last_active {
        let _ = writeln!(out, "Last active {}", relative_time(at, now));
    }
    out.push_str(&"-".repeat(40));
    out.push('\n');

    for message in &active.messages {
        out.push_str(&render_message(message));
    }

    out
}

pub fn render_message(message: &Message) -> String {
    let indent = match message.sender {
        SenderRole::Customer => "",
        SenderRole::Operator | SenderRole::Assistant => "    ",
    };
    format!(
        "{}[{}] {}: {}\n",
        indent,
        message.clock_time(),
        message.sender.label(),
        message.text
    )
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    truncated.push_str("...");
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{active_thread_view, conversation_summaries, SelectionController};
    use crate::seed::SeedData;

    #[test]
    fn test_render_summaries() {
        let now = Utc::now();
        let registry = SeedData::demo().unwrap().into_registry(now).unwrap();
        let out = render_summaries(&conversation_summaries(&registry), Some("c2"), now);

        assert!(out.contains("Sarah Wilson"));
        assert!(out.contains("(2 unread)"));
        assert!(out.contains("> c2"));
        assert!(out.contains("1 hour ago"));
    }

    #[test]
    fn test_render_empty_thread() {
        let out = render_thread(&ThreadView::Empty, Utc::now());
        assert!(out.starts_with("No Conversation Selected"));
    }

    #[test]
    fn test_render_active_thread() {
        let now = Utc::now();
        let mut registry = SeedData::demo().unwrap().into_registry(now).unwrap();
        let mut selection = SelectionController::new();
        selection.select(&mut registry, "c1").unwrap();

        let out = render_thread(&active_thread_view(&registry, &selection), now);
        assert!(out.contains("Sarah Wilson (cust1) - Facebook Messenger"));
        assert!(out.contains("Last active 10 mins ago"));
        assert!(out.contains("AI Assistant: Hello! Yes, we do ship to Canada."));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghijkl", 8), "abcde...");
    }
}
