/// Slack workspace access.
///
/// The digest engine only talks to the workspace through [`WorkspaceApi`];
/// [`SlackClient`] is the production implementation over the Web API.
use async_trait::async_trait;

use crate::error::ApiError;
use crate::stats::Channel;

pub mod client;
pub mod pagination;
pub mod types;

pub use client::SlackClient;
pub use types::MessageRecord;

/// Capabilities the digest needs from the messaging platform.
///
/// Pagination, authentication and rate limiting are the implementor's
/// concern; every method returns the complete result set.
#[async_trait]
pub trait WorkspaceApi: Send + Sync {
    /// Public, non-archived channels.
    async fn list_channels(&self) -> Result<Vec<Channel>, ApiError>;

    /// Messages posted in `channel_id` between `oldest_ts` and `latest_ts`
    /// (epoch seconds, both inclusive), in the order the platform returns them.
    async fn fetch_messages(
        &self,
        channel_id: &str,
        oldest_ts: i64,
        latest_ts: i64,
    ) -> Result<Vec<MessageRecord>, ApiError>;

    /// Handle shown for a user (e.g. `alice`).
    async fn lookup_user_display_name(&self, user_id: &str) -> Result<String, ApiError>;

    /// Channel id for a channel name, with or without a leading `#`.
    async fn resolve_channel_id(&self, channel_name: &str) -> Result<String, ApiError>;

    async fn post_message(&self, channel_id: &str, text: &str) -> Result<(), ApiError>;
}

/// Normalize a user-supplied channel name (`#general` → `general`).
pub fn normalize_channel_name(name: &str) -> &str {
    name.trim().trim_start_matches('#')
}
