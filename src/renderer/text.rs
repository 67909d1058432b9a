use crate::stats::*;

/// Character limits for quoted message text.
const TOP_THREAD_MAX_CHARS: usize = 60;
const OPEN_QUESTION_MAX_CHARS: usize = 80;

const TITLE: &str = "📊 Daily Slack Recap (Yesterday)";

/// Render a digest as the plain-text message posted to the channel.
pub fn render(digest: &Digest) -> String {
    // Title is followed by a blank line
    let mut lines = vec![format!("{}\n", TITLE)];
    let highlights = &digest.highlights;

    if let Some(ref thread) = highlights.top_thread {
        lines.push(format!(
            "🔥 Top thread: \"{}\" ({} replies)",
            truncate(&thread.text, TOP_THREAD_MAX_CHARS),
            thread.reply_count
        ));
    }

    if let Some(channel) = highlights.active_channels.first() {
        lines.push(format!(
            "💬 Most active: #{} ({} messages)",
            channel.name, channel.message_count
        ));
    }

    if let Some(ref contributor) = highlights.helpful_contributor {
        lines.push(format!(
            "⭐ Shoutout: @{} ({} reactions)",
            contributor.display_name, contributor.reaction_total
        ));
    }

    if let Some(ref question) = highlights.open_question {
        lines.push(format!(
            "❓ Open question: \"{}\"",
            truncate(&question.text, OPEN_QUESTION_MAX_CHARS)
        ));
    }

    lines.push(format!(
        "📈 {} messages · {} active members",
        digest.total_messages, digest.active_members
    ));

    lines.join("\n")
}

/// Keep the first `max_chars` characters and append "..." when text is longer.
fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}
