use crate::services::telegram::TelegramCredentials;
use std::env;

/// Per-file upload cap: 5 MiB
pub const DEFAULT_MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Telegram Bot API settings
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// Bot token issued by BotFather (TELEGRAM_BOT_TOKEN)
    pub bot_token: Option<String>,

    /// Destination chat or channel id (TELEGRAM_CHAT_ID)
    pub chat_id: Option<String>,

    /// Bot API base URL (default: "https://api.telegram.org")
    pub api_base_url: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            chat_id: None,
            api_base_url: DEFAULT_TELEGRAM_API_URL.to_string(),
        }
    }
}

impl TelegramConfig {
    /// Returns the send target, or `None` when either value is absent or blank.
    pub fn credentials(&self) -> Option<TelegramCredentials> {
        let bot_token = self.bot_token.as_deref().map(str::trim).filter(|v| !v.is_empty())?;
        let chat_id = self.chat_id.as_deref().map(str::trim).filter(|v| !v.is_empty())?;

        Some(TelegramCredentials {
            bot_token: bot_token.to_string(),
            chat_id: chat_id.to_string(),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.credentials().is_some()
    }
}

/// Process-wide relay configuration, loaded once at startup
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Maximum size of each uploaded photo in bytes (default: 5 MiB)
    pub max_file_size: usize,

    pub telegram: TelegramConfig,

    /// Allowed CORS origins (comma separated). Empty allows any origin.
    pub allowed_origins: Vec<String>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            telegram: TelegramConfig::default(),
            allowed_origins: Vec::new(),
        }
    }
}

impl RelayConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            max_file_size: env::var("MAX_FILE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_file_size),

            telegram: TelegramConfig {
                bot_token: env::var("TELEGRAM_BOT_TOKEN").ok(),
                chat_id: env::var("TELEGRAM_CHAT_ID").ok(),
                api_base_url: env::var("TELEGRAM_API_URL")
                    .map(|v| v.trim_end_matches('/').to_string())
                    .unwrap_or(default.telegram.api_base_url),
            },

            allowed_origins: env::var("ALLOWED_ORIGINS")
                .map(|v| parse_origins(&v))
                .unwrap_or(default.allowed_origins),
        }
    }

    /// Request body limit: two capped files plus 1 MiB for multipart framing and text fields
    pub fn body_limit(&self) -> usize {
        self.max_file_size.saturating_mul(2).saturating_add(1024 * 1024)
    }

    /// Config with Telegram credentials set, used by tests and local runs
    pub fn with_telegram(bot_token: &str, chat_id: &str) -> Self {
        Self {
            telegram: TelegramConfig {
                bot_token: Some(bot_token.to_string()),
                chat_id: Some(chat_id.to_string()),
                ..TelegramConfig::default()
            },
            ..Self::default()
        }
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
