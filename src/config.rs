// src/config.rs
// Settings for slack-recap
// Stored as JSON under the data root, overridable by environment variables

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::DigestError;
use crate::slack::client::DEFAULT_API_BASE;
use crate::slack::normalize_channel_name;

pub const DEFAULT_TARGET_CHANNEL: &str = "bob-testing";

/// OAuth scopes the bot token needs.
pub const REQUIRED_SCOPES: &str =
    "channels:read, channels:history, chat:write, reactions:read, users:read";

const SETTINGS_FILE: &str = "settings.json";

// ============================================
// Stored settings
// ============================================

/// Settings persisted in `{data_root}/settings.json`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Settings {
    /// Bot User OAuth token (`xoxb-...`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot_token: Option<String>,
    /// App-level token (`xapp-...`); not needed for posting
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_token: Option<String>,
    /// Channel name (without #) where digests are posted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_channel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
}

impl Settings {
    /// Load settings from the data root. A missing file yields empty settings.
    pub fn load(data_root: &Path) -> Result<Self> {
        let path = settings_path(data_root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings from {}", path.display()))
    }

    pub fn save(&self, data_root: &Path) -> Result<()> {
        fs::create_dir_all(data_root)
            .with_context(|| format!("Failed to create directory {}", data_root.display()))?;

        let path = settings_path(data_root);
        let json = serde_json::to_string_pretty(self).context("Failed to serialize settings")?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write settings to {}", path.display()))?;

        restrict_permissions(&path)?;
        Ok(())
    }

    /// Delete stored settings. Returns whether a file was removed.
    pub fn delete(data_root: &Path) -> Result<bool> {
        let path = settings_path(data_root);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path)
            .with_context(|| format!("Failed to delete settings file {}", path.display()))?;
        Ok(true)
    }
}

// ============================================
// Resolved configuration
// ============================================

/// Configuration for one run, after merging file, environment and flags.
#[derive(Debug, Clone)]
pub struct Config {
    pub bot_token: String,
    pub app_token: Option<String>,
    pub target_channel: String,
    pub api_base: Url,
}

impl Config {
    /// Merge stored settings with environment overrides.
    ///
    /// `env` looks up a variable by name; environment values win over the file.
    pub fn resolve<F>(settings: Settings, env: F) -> std::result::Result<Self, DigestError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let pick = |var: &str, stored: Option<String>| pick_value(&env, var, stored);

        let bot_token = pick("SLACK_BOT_TOKEN", settings.bot_token).ok_or_else(|| {
            DigestError::Configuration(format!(
                "set SLACK_BOT_TOKEN or run `slack-recap login`; the bot token needs: {}",
                REQUIRED_SCOPES
            ))
        })?;

        let target_channel = pick("RECAP_TARGET_CHANNEL", settings.target_channel)
            .map(|c| normalize_channel_name(&c).to_string())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_TARGET_CHANNEL.to_string());

        let api_base = resolve_api_base(settings.api_base, &env)?;

        Ok(Self {
            bot_token,
            app_token: pick("SLACK_APP_TOKEN", settings.app_token),
            target_channel,
            api_base,
        })
    }

    /// Load settings from `data_root` and apply the process environment.
    pub fn load(data_root: &Path) -> Result<Self> {
        let settings = Settings::load(data_root)?;
        Ok(Self::resolve(settings, |var| std::env::var(var).ok())?)
    }
}

/// Slack API base from `SLACK_API_BASE`, then the stored value, then the default.
pub fn resolve_api_base<F>(stored: Option<String>, env: F) -> std::result::Result<Url, DigestError>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = pick_value(&env, "SLACK_API_BASE", stored)
        .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
    Url::parse(&raw).map_err(|e| {
        DigestError::Configuration(format!("invalid Slack API base '{}': {}", raw, e))
    })
}

/// Environment value unless blank, else the stored one, trimmed.
fn pick_value<F>(env: &F, var: &str, stored: Option<String>) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    env(var)
        .filter(|v| !v.trim().is_empty())
        .or(stored)
        .map(|v| v.trim().to_string())
}

/// Root directory for settings and logs (`RECAP_DATA_DIR`, default `.recap`).
pub fn resolve_data_root() -> PathBuf {
    std::env::var("RECAP_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(".recap"))
}

/// Show only the token prefix and last four characters.
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let prefix: String = chars.iter().take(5).collect();
    let suffix: String = chars[chars.len() - 4..].iter().collect();
    format!("{}…{}", prefix, suffix)
}

fn settings_path(data_root: &Path) -> PathBuf {
    data_root.join(SETTINGS_FILE)
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
        .with_context(|| format!("Failed to restrict permissions on {}", path.display()))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
