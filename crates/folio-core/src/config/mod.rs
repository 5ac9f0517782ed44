mod defaults;


use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::FolioError;
use defaults::*;

/// Top-level Folio configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub folio: FolioConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub langs: LangsConfig,
    #[serde(default)]
    pub relay: RelayConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// General bot settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolioConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Directory for daily-rolled log files. Empty = stderr only.
    #[serde(default)]
    pub log_dir: String,
}

impl Default for FolioConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            log_level: default_log_level(),
            log_dir: String::new(),
        }
    }
}

/// Telegram bot config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub bot_token: String,
    /// Chat that receives relayed questions.
    #[serde(default)]
    pub admin_chat_id: Option<i64>,
    /// Long-poll timeout passed to `getUpdates`.
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            admin_chat_id: None,
            poll_timeout_secs: default_poll_timeout(),
        }
    }
}

/// Paths to the two text bundles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LangsConfig {
    #[serde(default = "default_cn_bundle")]
    pub cn: String,
    #[serde(default = "default_en_bundle")]
    pub en: String,
}

impl Default for LangsConfig {
    fn default() -> Self {
        Self {
            cn: default_cn_bundle(),
            en: default_en_bundle(),
        }
    }
}

/// What the user sees when relaying their question to the admin fails.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelayFailurePolicy {
    /// Show the usual "message sent" confirmation anyway.
    #[default]
    Confirm,
    /// Show the `message_failed` text instead.
    Report,
}

/// Relay config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelayConfig {
    #[serde(default)]
    pub on_failure: RelayFailurePolicy,
}

/// Event dispatch config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Seconds a per-user worker waits for new events before exiting.
    #[serde(default = "default_worker_idle")]
    pub worker_idle_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            worker_idle_secs: default_worker_idle(),
        }
    }
}

impl Config {
    /// Apply values that came from the environment or the command line.
    ///
    /// Non-empty values win over whatever the config file said.
    pub fn apply_overrides(
        &mut self,
        bot_token: Option<&str>,
        admin_chat_id: Option<&str>,
    ) -> Result<(), FolioError> {
        if let Some(token) = bot_token.map(str::trim).filter(|t| !t.is_empty()) {
            self.telegram.bot_token = token.to_string();
        }
        if let Some(raw) = admin_chat_id.map(str::trim).filter(|s| !s.is_empty()) {
            let id = raw.parse::<i64>().map_err(|e| {
                FolioError::Config(format!("admin chat id '{raw}' is not a number: {e}"))
            })?;
            self.telegram.admin_chat_id = Some(id);
        }
        Ok(())
    }

    /// Check that both required startup values are present.
    ///
    /// Returns the admin chat id so callers don't have to unwrap it again.
    pub fn validate(&self) -> Result<i64, FolioError> {
        let mut missing = Vec::new();
        if self.telegram.bot_token.trim().is_empty() {
            missing.push("bot token (BOT_TOKEN)");
        }
        if self.telegram.admin_chat_id.is_none() {
            missing.push("admin chat id (ADMIN_CHAT_ID)");
        }
        match self.telegram.admin_chat_id {
            Some(id) if missing.is_empty() => Ok(id),
            _ => Err(FolioError::Config(format!(
                "missing required settings: {}. Set them in config.toml, the environment, or on the command line.",
                missing.join(", ")
            ))),
        }
    }
}

/// Expand `~` to home directory.
pub fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return format!("{}/{rest}", home.to_string_lossy());
        }
    }
    path.to_string()
}

/// Load configuration from a TOML file.
///
/// Falls back to defaults if the file does not exist.
pub fn load(path: &str) -> Result<Config, FolioError> {
    let path = Path::new(path);
    if !path.exists() {
        tracing::info!(
            "Config file not found at {}, using defaults",
            path.display()
        );
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| FolioError::Config(format!("failed to read {}: {}", path.display(), e)))?;

    let config: Config = toml::from_str(&content)
        .map_err(|e| FolioError::Config(format!("failed to parse config: {}", e)))?;

    Ok(config)
}
