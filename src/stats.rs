use serde::{Deserialize, Serialize};

use crate::window::DigestWindow;

/// A public channel visible to the bot.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Channel {
    pub id: String,
    pub name: String,
}

/// A single reaction bucket on a message (one emoji, `count` users).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Reaction {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub count: u32,
}

/// A message in the digest corpus, tagged with the channel it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    /// Slack timestamp (`"1710354600.000200"`), unique within a channel
    pub ts: String,
    /// Absent for system and app messages
    pub author_id: Option<String>,
    pub text: String,
    pub channel_name: String,
    /// Timestamp of the thread parent, when the message belongs to a thread
    pub thread_id: Option<String>,
    pub reply_count: u32,
    pub reactions: Vec<Reaction>,
}

impl Message {
    /// Sum of all reaction counts on this message.
    pub fn reaction_total(&self) -> u64 {
        self.reactions.iter().map(|r| u64::from(r.count)).sum()
    }

    /// The timestamp as fractional epoch seconds, if it parses.
    pub fn ts_seconds(&self) -> Option<f64> {
        self.ts.parse().ok()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopThread {
    pub text: String,
    pub reply_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveChannel {
    pub name: String,
    pub message_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HelpfulContributor {
    pub author_id: String,
    pub display_name: String,
    pub reaction_total: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpenQuestion {
    pub text: String,
}

/// Highlights extracted from one day's corpus. Every entry may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Highlights {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_thread: Option<TopThread>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub active_channels: Vec<ActiveChannel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub helpful_contributor: Option<HelpfulContributor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_question: Option<OpenQuestion>,
}

/// Everything the report is rendered from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Digest {
    pub window: DigestWindow,
    pub highlights: Highlights,
    pub total_messages: usize,
    pub active_members: usize,
    /// Channels whose history could not be fetched
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped_channels: Vec<String>,
}
