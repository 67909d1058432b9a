/// Wire records returned by the Slack Web API.
///
/// Fields the API may omit are defaulted here, once, so nothing downstream
/// has to re-query optional keys.
use serde::Deserialize;

use crate::stats::{Channel, Message, Reaction};

/// A message as returned by `conversations.history`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageRecord {
    pub ts: String,
    /// Absent for bot_message/system subtypes
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub thread_ts: Option<String>,
    #[serde(default)]
    pub reply_count: u32,
    #[serde(default)]
    pub reactions: Vec<Reaction>,
}

impl MessageRecord {
    /// Convert into a corpus message tagged with its channel.
    pub fn into_message(self, channel_name: &str) -> Message {
        Message {
            ts: self.ts,
            author_id: self.user.filter(|u| !u.is_empty()),
            text: self.text,
            channel_name: channel_name.to_string(),
            thread_id: self.thread_ts.filter(|t| !t.is_empty()),
            reply_count: self.reply_count,
            reactions: self.reactions,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChannelRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub is_archived: bool,
}

impl From<ChannelRecord> for Channel {
    fn from(record: ChannelRecord) -> Self {
        Channel {
            id: record.id,
            name: record.name,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Identity of the token owner, from `auth.test`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthIdentity {
    pub user_id: String,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub team: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ResponseMetadata {
    #[serde(default)]
    pub next_cursor: String,
}

impl ResponseMetadata {
    /// Slack signals the last page with an empty cursor.
    pub fn cursor(metadata: Option<ResponseMetadata>) -> Option<String> {
        metadata
            .map(|m| m.next_cursor)
            .filter(|c| !c.is_empty())
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChannelsPage {
    #[serde(default)]
    pub channels: Vec<ChannelRecord>,
    #[serde(default)]
    pub response_metadata: Option<ResponseMetadata>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HistoryPage {
    #[serde(default)]
    pub messages: Vec<MessageRecord>,
    #[serde(default)]
    pub response_metadata: Option<ResponseMetadata>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserInfo {
    pub user: UserRecord,
}
