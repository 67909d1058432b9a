/// Digest orchestration.
///
/// Resolve window → list channels → build corpus → extract highlights →
/// render → post. Nothing is posted when the corpus is empty.
use chrono::{DateTime, TimeZone};

use crate::corpus::build_corpus;
use crate::error::{DigestError, Result};
use crate::highlights;
use crate::progress::FetchProgress;
use crate::renderer;
use crate::slack::{normalize_channel_name, WorkspaceApi};
use crate::stats::Digest;
use crate::timefmt::format_instant;
use crate::window::DigestWindow;

/// Runs digests against one workspace.
pub struct DigestRunner<'a, A: ?Sized> {
    api: &'a A,
    show_progress: bool,
}

impl<'a, A> DigestRunner<'a, A>
where
    A: WorkspaceApi + ?Sized,
{
    pub fn new(api: &'a A) -> Self {
        Self {
            api,
            show_progress: false,
        }
    }

    /// Report per-channel fetch progress on stderr.
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Computes the digest for the day before `now` without posting it.
    ///
    /// Returns `None` when the window holds no messages.
    pub async fn compute<Tz: TimeZone>(
        &self,
        now: &DateTime<Tz>,
        bot_author_id: &str,
    ) -> Result<Option<Digest>> {
        let window = DigestWindow::yesterday(now)?;
        tracing::info!(
            "Analyzing activity from {} to {}",
            format_instant(&window.start),
            format_instant(&window.end)
        );

        let channels = match self.api.list_channels().await {
            Ok(channels) => channels,
            Err(e) => {
                tracing::warn!("Failed to list channels, continuing without any: {}", e);
                Vec::new()
            }
        };
        tracing::info!("Found {} public channels", channels.len());

        let progress = if self.show_progress {
            FetchProgress::new(channels.len())
        } else {
            FetchProgress::hidden()
        };

        let corpus = build_corpus(self.api, &channels, &window, bot_author_id, &progress).await;
        if corpus.is_empty() {
            tracing::info!("No messages found for {}", window.day);
            return Ok(None);
        }

        let highlights = highlights::extract(self.api, &corpus.messages).await;

        Ok(Some(Digest {
            window,
            highlights,
            total_messages: corpus.messages.len(),
            active_members: corpus.active_members(),
            skipped_channels: corpus.failures.into_iter().map(|f| f.channel).collect(),
        }))
    }

    /// Renders `digest` and posts it to `target_channel_name`.
    ///
    /// Returns the posted text.
    pub async fn post(&self, digest: &Digest, target_channel_name: &str) -> Result<String> {
        let channel = normalize_channel_name(target_channel_name).to_string();

        let channel_id = self
            .api
            .resolve_channel_id(&channel)
            .await
            .map_err(|source| DigestError::ChannelResolution {
                channel: channel.clone(),
                source,
            })?;

        let text = renderer::text::render(digest);

        self.api
            .post_message(&channel_id, &text)
            .await
            .map_err(|source| DigestError::Delivery {
                channel: channel.clone(),
                source,
            })?;

        tracing::info!("Posted summary to #{}", channel);
        Ok(text)
    }

    /// Computes and posts in one go. `None` means there was nothing to post.
    pub async fn generate_and_post<Tz: TimeZone>(
        &self,
        now: &DateTime<Tz>,
        target_channel_name: &str,
        bot_author_id: &str,
    ) -> Result<Option<String>> {
        match self.compute(now, bot_author_id).await? {
            Some(digest) => self.post(&digest, target_channel_name).await.map(Some),
            None => Ok(None),
        }
    }
}

/// Generates yesterday's digest and posts it to `target_channel_name`.
///
/// Returns the posted text, or `None` when there was no activity and nothing
/// was posted.
pub async fn generate_and_post_digest<A, Tz>(
    api: &A,
    now: &DateTime<Tz>,
    target_channel_name: &str,
    bot_author_id: &str,
) -> Result<Option<String>>
where
    A: WorkspaceApi + ?Sized,
    Tz: TimeZone,
{
    DigestRunner::new(api)
        .generate_and_post(now, target_channel_name, bot_author_id)
        .await
}
