use anyhow::Result;
use std::path::Path;

use slack_recap::config::{mask_token, Config, Settings};
use slack_recap::logging::log_file_path;
use slack_recap::slack::SlackClient;

/// Print where configuration comes from and whether the token works.
pub async fn run(data_root: &Path) -> Result<()> {
    let settings = Settings::load(data_root)?;
    eprintln!("Data directory: {}", data_root.display());
    eprintln!(
        "Stored token:   {}",
        if settings.bot_token.is_some() { "✓" } else { "✗" }
    );
    eprintln!("Log file:       {}", log_file_path(data_root).display());

    let config = match Config::resolve(settings, |var| std::env::var(var).ok()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("\n{}", e);
            return Ok(());
        }
    };

    eprintln!("Bot token:      {}", mask_token(&config.bot_token));
    eprintln!(
        "App token:      {}",
        config
            .app_token
            .as_deref()
            .map(mask_token)
            .unwrap_or_else(|| "(not set)".to_string())
    );
    eprintln!("Target channel: #{}", config.target_channel);
    eprintln!("API base:       {}", config.api_base);

    let client = SlackClient::new(config.bot_token, config.api_base)?;
    match client.auth_test().await {
        Ok(identity) => eprintln!(
            "Auth:           ✓ {} ({})",
            identity.user.as_deref().unwrap_or("bot"),
            identity.user_id
        ),
        Err(e) => eprintln!("Auth:           ✗ {}", e),
    }

    Ok(())
}
