use anyhow::{Context, Result};
use rpassword::prompt_password;
use std::path::Path;

use slack_recap::config::{resolve_api_base, Settings, REQUIRED_SCOPES};
use slack_recap::slack::{normalize_channel_name, SlackClient};

/// Validate a bot token against `auth.test` and store it.
pub async fn run(
    data_root: &Path,
    token_flag: Option<String>,
    channel_flag: Option<String>,
) -> Result<()> {
    let mut settings = Settings::load(data_root)?;

    let token = match token_flag {
        Some(token) => token,
        None => {
            eprintln!("Bot token scopes required: {}", REQUIRED_SCOPES);
            prompt_password("Bot token (xoxb-...): ")?
        }
    };
    let token = token.trim().to_string();
    if token.is_empty() {
        anyhow::bail!("no token provided");
    }
    if !token.starts_with("xoxb-") {
        eprintln!("Warning: token does not look like a bot token (expected xoxb-...)");
    }

    let api_base = resolve_api_base(settings.api_base.clone(), |var| std::env::var(var).ok())?;

    let client = SlackClient::new(token.clone(), api_base)?;
    let identity = client
        .auth_test()
        .await
        .context("token rejected by auth.test")?;

    settings.bot_token = Some(token);
    if let Some(channel) = channel_flag {
        settings.target_channel = Some(normalize_channel_name(&channel).to_string());
    }
    settings.save(data_root)?;

    tracing::info!(user_id = %identity.user_id, "Stored bot token");
    eprintln!(
        "Logged in as {} ({}) in {}",
        identity.user.as_deref().unwrap_or("bot"),
        identity.user_id,
        identity.team.as_deref().unwrap_or("unknown workspace")
    );
    Ok(())
}

/// Remove stored settings.
pub fn logout(data_root: &Path) -> Result<()> {
    if Settings::delete(data_root)? {
        tracing::info!("Removed stored settings");
        eprintln!("Removed stored credentials from {}", data_root.display());
    } else {
        eprintln!("No stored credentials in {}", data_root.display());
    }
    Ok(())
}
