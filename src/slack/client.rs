/// Slack Web API client.
///
/// Implements [`WorkspaceApi`] with bearer-token authentication, cursor
/// pagination and `Retry-After` handling for rate-limited calls.
use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::time::Duration;
use url::Url;

use super::normalize_channel_name;
use super::pagination::{collect_pages, collect_pages_partial, Page};
use super::types::{
    AuthIdentity, ChannelsPage, HistoryPage, MessageRecord, ResponseMetadata, UserInfo,
};
use super::WorkspaceApi;
use crate::error::ApiError;
use crate::stats::Channel;

pub const DEFAULT_API_BASE: &str = "https://slack.com/api/";

/// Page sizes per request; Slack caps history pages at 1000.
const CHANNEL_PAGE_LIMIT: u32 = 200;
const HISTORY_PAGE_LIMIT: u32 = 1000;

/// Per-request HTTP timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Retries after a 429 before giving up.
const MAX_RATE_LIMIT_RETRIES: usize = 3;
/// Ceiling on a server-provided `Retry-After`.
const MAX_RETRY_AFTER_SECS: u64 = 60;

#[derive(Clone, Debug)]
pub struct SlackClient {
    http: reqwest::Client,
    base: Url,
    token: String,
}

impl SlackClient {
    /// Creates a client for the API rooted at `base` (e.g. `https://slack.com/api/`).
    pub fn new(token: impl Into<String>, mut base: Url) -> Result<Self, ApiError> {
        // Url::join drops the last path segment unless it ends with '/'
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base,
            token: token.into(),
        })
    }

    /// Identity of the token owner. Used to learn the bot's own user id.
    pub async fn auth_test(&self) -> Result<AuthIdentity, ApiError> {
        let body = self.get("auth.test", Vec::new()).await?;
        decode("auth.test", body)
    }

    fn endpoint(&self, method: &str) -> Url {
        // Method names are plain ASCII path segments, joining cannot fail
        self.base
            .join(method)
            .unwrap_or_else(|_| self.base.clone())
    }

    async fn get(
        &self,
        method: &'static str,
        query: Vec<(&'static str, String)>,
    ) -> Result<Value, ApiError> {
        let url = self.endpoint(method);
        self.send(method, || self.http.get(url.clone()).query(&query))
            .await
    }

    async fn post(&self, method: &'static str, body: Value) -> Result<Value, ApiError> {
        let url = self.endpoint(method);
        self.send(method, || self.http.post(url.clone()).json(&body))
            .await
    }

    /// Sends a request, honouring `Retry-After` on 429, and unwraps Slack's `ok` envelope.
    async fn send<F>(&self, method: &'static str, build: F) -> Result<Value, ApiError>
    where
        F: Fn() -> RequestBuilder,
    {
        for attempt in 0..=MAX_RATE_LIMIT_RETRIES {
            let response = build().bearer_auth(&self.token).send().await?;

            if response.status() == StatusCode::TOO_MANY_REQUESTS {
                if attempt == MAX_RATE_LIMIT_RETRIES {
                    break;
                }
                let wait = retry_after_secs(&response);
                tracing::warn!(method, attempt, wait, "Rate limited, backing off");
                tokio::time::sleep(Duration::from_secs(wait)).await;
                continue;
            }

            let body: Value = response.error_for_status()?.json().await?;
            return check_ok(method, body);
        }

        Err(ApiError::RateLimited { method })
    }

    async fn channels_page(&self, cursor: Option<String>) -> Result<Page<Channel>, ApiError> {
        let mut query = vec![
            ("types", "public_channel".to_string()),
            ("exclude_archived", "true".to_string()),
            ("limit", CHANNEL_PAGE_LIMIT.to_string()),
        ];
        if let Some(cursor) = cursor {
            query.push(("cursor", cursor));
        }

        let page: ChannelsPage = decode(
            "conversations.list",
            self.get("conversations.list", query).await?,
        )?;
        Ok(Page {
            items: page
                .channels
                .into_iter()
                .filter(|c| !c.is_archived)
                .map(Channel::from)
                .collect(),
            next_cursor: ResponseMetadata::cursor(page.response_metadata),
        })
    }

    async fn history_page(
        &self,
        channel_id: &str,
        oldest_ts: i64,
        latest_ts: i64,
        cursor: Option<String>,
    ) -> Result<Page<MessageRecord>, ApiError> {
        let mut query = vec![
            ("channel", channel_id.to_string()),
            ("oldest", oldest_ts.to_string()),
            ("latest", latest_ts.to_string()),
            ("inclusive", "true".to_string()),
            ("limit", HISTORY_PAGE_LIMIT.to_string()),
        ];
        if let Some(cursor) = cursor {
            query.push(("cursor", cursor));
        }

        let page: HistoryPage = decode(
            "conversations.history",
            self.get("conversations.history", query).await?,
        )?;
        Ok(Page {
            items: page.messages,
            next_cursor: ResponseMetadata::cursor(page.response_metadata),
        })
    }
}

#[async_trait]
impl WorkspaceApi for SlackClient {
    /// Channels listed before a failing page are kept; the failure is logged.
    async fn list_channels(&self) -> Result<Vec<Channel>, ApiError> {
        let (channels, error) =
            collect_pages_partial("conversations.list", |cursor| self.channels_page(cursor)).await;
        if let Some(error) = error {
            tracing::warn!(kept = channels.len(), "Channel listing stopped early: {}", error);
        }
        Ok(channels)
    }

    async fn fetch_messages(
        &self,
        channel_id: &str,
        oldest_ts: i64,
        latest_ts: i64,
    ) -> Result<Vec<MessageRecord>, ApiError> {
        collect_pages("conversations.history", |cursor| {
            self.history_page(channel_id, oldest_ts, latest_ts, cursor)
        })
        .await
    }

    async fn lookup_user_display_name(&self, user_id: &str) -> Result<String, ApiError> {
        let body = self
            .get("users.info", vec![("user", user_id.to_string())])
            .await?;
        let info: UserInfo = decode("users.info", body)?;
        if info.user.name.is_empty() {
            return Err(ApiError::NotFound(format!("name for user {}", info.user.id)));
        }
        Ok(info.user.name)
    }

    async fn resolve_channel_id(&self, channel_name: &str) -> Result<String, ApiError> {
        let wanted = normalize_channel_name(channel_name);
        self.list_channels()
            .await?
            .into_iter()
            .find(|c| c.name == wanted)
            .map(|c| c.id)
            .ok_or_else(|| ApiError::NotFound(format!("channel #{}", wanted)))
    }

    async fn post_message(&self, channel_id: &str, text: &str) -> Result<(), ApiError> {
        self.post(
            "chat.postMessage",
            json!({ "channel": channel_id, "text": text }),
        )
        .await?;
        Ok(())
    }
}

fn check_ok(method: &'static str, body: Value) -> Result<Value, ApiError> {
    if body.get("ok").and_then(Value::as_bool) == Some(true) {
        return Ok(body);
    }
    let code = body
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or("unknown_error")
        .to_string();
    Err(ApiError::Api { method, code })
}

fn decode<T: DeserializeOwned>(method: &'static str, body: Value) -> Result<T, ApiError> {
    serde_json::from_value(body).map_err(|source| ApiError::Decode { method, source })
}

fn retry_after_secs(response: &reqwest::Response) -> u64 {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(1)
        .min(MAX_RETRY_AFTER_SECS)
}
