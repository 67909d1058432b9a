//! Test fixtures: an in-memory workspace and message builders.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::error::ApiError;
use crate::slack::{normalize_channel_name, MessageRecord, WorkspaceApi};
use crate::stats::{Channel, Message, Reaction};

/// Timestamp inside the 2024-03-14 (+05:30) window.
pub const IN_WINDOW_TS: &str = "1710400000.000100";

/// Corpus message with no author, thread, or reactions.
pub fn msg(channel: &str, text: &str) -> Message {
    Message {
        ts: IN_WINDOW_TS.to_string(),
        author_id: None,
        text: text.to_string(),
        channel_name: channel.to_string(),
        thread_id: None,
        reply_count: 0,
        reactions: Vec::new(),
    }
}

/// Wire record authored by `user`.
pub fn record(user: Option<&str>, text: &str) -> MessageRecord {
    MessageRecord {
        ts: IN_WINDOW_TS.to_string(),
        user: user.map(str::to_string),
        text: text.to_string(),
        ..MessageRecord::default()
    }
}

pub fn reactions(counts: &[u32]) -> Vec<Reaction> {
    counts
        .iter()
        .map(|&count| Reaction {
            name: "tada".to_string(),
            count,
        })
        .collect()
}

/// In-memory [`WorkspaceApi`] with injectable failures.
#[derive(Default)]
pub struct FakeWorkspace {
    channels: Vec<Channel>,
    history: HashMap<String, Vec<MessageRecord>>,
    failing_channels: HashSet<String>,
    slow_channels: HashMap<String, Duration>,
    users: HashMap<String, String>,
    fail_channel_listing: bool,
    fail_posting: bool,
    posts: Mutex<Vec<(String, String)>>,
    fetches: Mutex<Vec<String>>,
    lookups: AtomicUsize,
}

impl FakeWorkspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_channel(mut self, id: &str, name: &str, messages: Vec<MessageRecord>) -> Self {
        self.channels.push(Channel {
            id: id.to_string(),
            name: name.to_string(),
        });
        self.history.insert(id.to_string(), messages);
        self
    }

    pub fn with_failing_channel(mut self, id: &str, name: &str) -> Self {
        self.channels.push(Channel {
            id: id.to_string(),
            name: name.to_string(),
        });
        self.failing_channels.insert(id.to_string());
        self
    }

    pub fn with_slow_channel(mut self, id: &str, delay: Duration) -> Self {
        self.slow_channels.insert(id.to_string(), delay);
        self
    }

    pub fn with_user(mut self, id: &str, name: &str) -> Self {
        self.users.insert(id.to_string(), name.to_string());
        self
    }

    pub fn failing_channel_listing(mut self) -> Self {
        self.fail_channel_listing = true;
        self
    }

    pub fn failing_posts(mut self) -> Self {
        self.fail_posting = true;
        self
    }

    pub fn channels(&self) -> Vec<Channel> {
        self.channels.clone()
    }

    /// `(channel_id, text)` pairs posted so far.
    pub fn posts(&self) -> Vec<(String, String)> {
        self.posts.lock().unwrap().clone()
    }

    pub fn fetched_channels(&self) -> Vec<String> {
        self.fetches.lock().unwrap().clone()
    }

    pub fn lookup_calls(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WorkspaceApi for FakeWorkspace {
    async fn list_channels(&self) -> Result<Vec<Channel>, ApiError> {
        if self.fail_channel_listing {
            return Err(ApiError::Api {
                method: "conversations.list",
                code: "invalid_auth".to_string(),
            });
        }
        Ok(self.channels.clone())
    }

    async fn fetch_messages(
        &self,
        channel_id: &str,
        _oldest_ts: i64,
        _latest_ts: i64,
    ) -> Result<Vec<MessageRecord>, ApiError> {
        self.fetches.lock().unwrap().push(channel_id.to_string());

        if let Some(delay) = self.slow_channels.get(channel_id) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing_channels.contains(channel_id) {
            return Err(ApiError::Api {
                method: "conversations.history",
                code: "not_in_channel".to_string(),
            });
        }
        Ok(self.history.get(channel_id).cloned().unwrap_or_default())
    }

    async fn lookup_user_display_name(&self, user_id: &str) -> Result<String, ApiError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.users
            .get(user_id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("user {}", user_id)))
    }

    async fn resolve_channel_id(&self, channel_name: &str) -> Result<String, ApiError> {
        let wanted = normalize_channel_name(channel_name);
        self.channels
            .iter()
            .find(|c| c.name == wanted)
            .map(|c| c.id.clone())
            .ok_or_else(|| ApiError::NotFound(format!("channel #{}", wanted)))
    }

    async fn post_message(&self, channel_id: &str, text: &str) -> Result<(), ApiError> {
        if self.fail_posting {
            return Err(ApiError::Api {
                method: "chat.postMessage",
                code: "is_archived".to_string(),
            });
        }
        self.posts
            .lock()
            .unwrap()
            .push((channel_id.to_string(), text.to_string()));
        Ok(())
    }
}
