use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::Path;

use slack_recap::config::{resolve_data_root, Config};
use slack_recap::slack::{normalize_channel_name, SlackClient};
use slack_recap::window::parse_instant;
use slack_recap::{logging, renderer, DigestRunner};

mod login;
mod status;

const NO_ACTIVITY: &str = "No activity detected for yesterday. Skipping summary post.";

#[derive(Parser)]
#[command(name = "slack-recap")]
#[command(about = "Daily Slack activity digest", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize yesterday's activity and post it to the target channel
    Run {
        /// Reference instant (RFC 3339). The digest covers the day before it. Defaults to now.
        #[arg(long)]
        now: Option<String>,

        /// Target channel name (overrides settings and RECAP_TARGET_CHANNEL)
        #[arg(long)]
        channel: Option<String>,

        /// Compute and print the digest without posting
        #[arg(long)]
        dry_run: bool,

        /// Print the digest as JSON instead of the report text
        #[arg(long)]
        json: bool,
    },
    /// Validate a bot token and store it
    Login {
        /// Bot token (xoxb-...). Prompted for if omitted.
        #[arg(long)]
        token: Option<String>,

        /// Default target channel to store alongside the token
        #[arg(long)]
        channel: Option<String>,
    },
    /// Remove stored credentials
    Logout,
    /// Show configuration and token status
    Status,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let data_root = resolve_data_root();

    let runtime = tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")?;

    match cli.command {
        Commands::Run {
            now,
            channel,
            dry_run,
            json,
        } => {
            logging::init_logging(&data_root, "run")?;
            runtime.block_on(run_digest(&data_root, now, channel, dry_run, json))
        }
        Commands::Login { token, channel } => {
            logging::init_logging(&data_root, "login")?;
            runtime.block_on(login::run(&data_root, token, channel))
        }
        Commands::Logout => login::logout(&data_root),
        Commands::Status => runtime.block_on(status::run(&data_root)),
    }
}

async fn run_digest(
    data_root: &Path,
    now: Option<String>,
    channel: Option<String>,
    dry_run: bool,
    json: bool,
) -> Result<()> {
    let config = Config::load(data_root)?;
    let target = channel
        .as_deref()
        .map(normalize_channel_name)
        .unwrap_or(config.target_channel.as_str())
        .to_string();

    let now = match now {
        Some(raw) => parse_instant(&raw)?,
        None => Utc::now().fixed_offset(),
    };

    let client = SlackClient::new(config.bot_token, config.api_base)?;
    let identity = client
        .auth_test()
        .await
        .context("Failed to identify the bot user via auth.test")?;
    tracing::info!(bot_user_id = %identity.user_id, target = %target, "Starting digest run");

    let runner = DigestRunner::new(&client).with_progress(!json);
    let Some(digest) = runner.compute(&now, &identity.user_id).await? else {
        eprintln!("{}", NO_ACTIVITY);
        return Ok(());
    };

    if !digest.skipped_channels.is_empty() {
        eprintln!(
            "Skipped {} channel(s): {}",
            digest.skipped_channels.len(),
            digest.skipped_channels.join(", ")
        );
    }

    let text = if dry_run {
        renderer::text::render(&digest)
    } else {
        let posted = runner.post(&digest, &target).await?;
        eprintln!("Posted summary to #{}", target);
        posted
    };

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&digest).context("Failed to serialize digest")?
        );
    } else {
        println!("{}", text);
    }

    Ok(())
}
