/// Message corpus assembly.
///
/// Fetches one day of history from every channel, tags each message with its
/// channel and drops the bot's own messages. A channel that fails or times
/// out is recorded and skipped; the rest of the run carries on.
use futures_util::StreamExt;
use std::collections::HashSet;
use std::time::Duration;

use crate::error::ApiError;
use crate::progress::FetchProgress;
use crate::slack::{MessageRecord, WorkspaceApi};
use crate::stats::{Channel, Message};
use crate::window::DigestWindow;

/// Maximum number of channel histories fetched concurrently.
const MAX_CONCURRENT_FETCHES: usize = 8;

/// Upper bound for fetching one channel's full history, all pages included.
const FETCH_TIMEOUT: Duration = Duration::from_secs(120);

/// A channel whose history could not be fetched.
#[derive(Debug)]
pub struct ChannelFailure {
    pub channel: String,
    pub error: ApiError,
}

/// All in-window messages of one run.
#[derive(Debug, Default)]
pub struct Corpus {
    /// Messages in channel-list order, then fetch order within a channel
    pub messages: Vec<Message>,
    /// Distinct non-null authors
    pub authors: HashSet<String>,
    pub failures: Vec<ChannelFailure>,
}

impl Corpus {
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn active_members(&self) -> usize {
        self.authors.len()
    }

    fn absorb(
        &mut self,
        channel: &Channel,
        records: Vec<MessageRecord>,
        window: &DigestWindow,
        bot_author_id: &str,
    ) -> usize {
        let mut kept = 0;
        for record in records {
            if record.user.as_deref() == Some(bot_author_id) {
                continue;
            }

            let message = record.into_message(&channel.name);
            if let Some(ts) = message.ts_seconds() {
                if !window.contains(ts) {
                    continue;
                }
            }

            if let Some(ref author) = message.author_id {
                self.authors.insert(author.clone());
            }
            self.messages.push(message);
            kept += 1;
        }
        kept
    }
}

/// Builds the corpus for `window` from every channel in `channels`.
pub async fn build_corpus<A>(
    api: &A,
    channels: &[Channel],
    window: &DigestWindow,
    bot_author_id: &str,
    progress: &FetchProgress,
) -> Corpus
where
    A: WorkspaceApi + ?Sized,
{
    build_corpus_with_timeout(api, channels, window, bot_author_id, progress, FETCH_TIMEOUT).await
}

async fn build_corpus_with_timeout<A>(
    api: &A,
    channels: &[Channel],
    window: &DigestWindow,
    bot_author_id: &str,
    progress: &FetchProgress,
    fetch_timeout: Duration,
) -> Corpus
where
    A: WorkspaceApi + ?Sized,
{
    let (oldest_ts, latest_ts) = (window.start_ts(), window.end_ts());

    // `buffered` yields in input order, so the corpus order never depends on
    // which fetch finishes first
    let mut stream = futures_util::stream::iter(channels)
        .map(|channel| async move {
            let fetch = api.fetch_messages(&channel.id, oldest_ts, latest_ts);
            let fetched = tokio::time::timeout(fetch_timeout, fetch).await;
            let result = fetched.unwrap_or_else(|_| {
                Err(ApiError::Timeout {
                    seconds: fetch_timeout.as_secs(),
                })
            });
            (channel, result)
        })
        .buffered(MAX_CONCURRENT_FETCHES);

    let mut corpus = Corpus::default();

    while let Some((channel, result)) = stream.next().await {
        match result {
            Ok(records) => {
                let fetched = records.len();
                let kept = corpus.absorb(channel, records, window, bot_author_id);
                tracing::debug!(
                    channel = %channel.name,
                    fetched,
                    kept,
                    "Fetched channel history"
                );
                progress.channel_done(&channel.name, kept);
            }
            Err(error) => {
                tracing::warn!(channel = %channel.name, "Failed to fetch history: {}", error);
                progress.channel_failed(&channel.name, &error.to_string());
                corpus.failures.push(ChannelFailure {
                    channel: channel.name.clone(),
                    error,
                });
            }
        }
    }

    progress.finish();

    tracing::info!(
        messages = corpus.messages.len(),
        members = corpus.active_members(),
        failed_channels = corpus.failures.len(),
        "Corpus built"
    );

    corpus
}
