use crate::services::form::UploadedFile;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

const DEFAULT_PHOTO_NAME: &str = "photo.jpg";

#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("Telegram request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Telegram API error {status}: {description}")]
    Api { status: u16, description: String },

    #[error("Unexpected Telegram response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for TelegramError {
    fn from(e: reqwest::Error) -> Self {
        // Bot API URLs embed the token
        TelegramError::Transport(e.without_url())
    }
}

/// Bot token and destination chat for one send
#[derive(Clone, PartialEq, Eq)]
pub struct TelegramCredentials {
    pub bot_token: String,
    pub chat_id: String,
}

impl fmt::Debug for TelegramCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramCredentials")
            .field("bot_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

/// Every `parse_mode` value the Bot API accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParseMode {
    Markdown,
    MarkdownV2,
    #[serde(rename = "HTML")]
    Html,
}

/// Outbound messaging seam used by the upload relay
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Post a text message to the chat
    async fn send_text(
        &self,
        credentials: &TelegramCredentials,
        text: &str,
        parse_mode: ParseMode,
    ) -> Result<(), TelegramError>;

    /// Post an uploaded image as a photo message with a caption
    async fn send_photo(
        &self,
        credentials: &TelegramCredentials,
        photo: &UploadedFile,
        caption: &str,
    ) -> Result<(), TelegramError>;
}

#[derive(Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: ParseMode,
}

#[derive(Deserialize)]
struct BotApiReply {
    ok: bool,
    description: Option<String>,
    error_code: Option<u16>,
}

/// Telegram Bot API client over HTTPS
pub struct TelegramClient {
    http_client: reqwest::Client,
    api_base_url: String,
}

impl TelegramClient {
    pub fn new(api_base_url: impl Into<String>) -> Result<Self, TelegramError> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http_client,
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn method_url(&self, bot_token: &str, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base_url, bot_token, method)
    }

    async fn read_reply(response: reqwest::Response) -> Result<(), TelegramError> {
        let status = response.status();
        let body = response.text().await?;

        let reply: BotApiReply = match serde_json::from_str(&body) {
            Ok(reply) => reply,
            Err(_) if !status.is_success() => {
                return Err(TelegramError::Api {
                    status: status.as_u16(),
                    description: body.chars().take(200).collect(),
                });
            }
            Err(e) => {
                return Err(TelegramError::InvalidResponse(format!(
                    "{} (HTTP {})",
                    e, status
                )));
            }
        };

        if !status.is_success() || !reply.ok {
            return Err(TelegramError::Api {
                status: reply.error_code.unwrap_or(status.as_u16()),
                description: reply
                    .description
                    .unwrap_or_else(|| "no description".to_string()),
            });
        }

        Ok(())
    }
}

#[async_trait]
impl Messenger for TelegramClient {
    async fn send_text(
        &self,
        credentials: &TelegramCredentials,
        text: &str,
        parse_mode: ParseMode,
    ) -> Result<(), TelegramError> {
        tracing::debug!(chat_id = %credentials.chat_id, "Sending Telegram message");

        let response = self
            .http_client
            .post(self.method_url(&credentials.bot_token, "sendMessage"))
            .json(&SendMessageRequest {
                chat_id: &credentials.chat_id,
                text,
                parse_mode,
            })
            .send()
            .await?;

        Self::read_reply(response).await
    }

    async fn send_photo(
        &self,
        credentials: &TelegramCredentials,
        photo: &UploadedFile,
        caption: &str,
    ) -> Result<(), TelegramError> {
        tracing::debug!(
            chat_id = %credentials.chat_id,
            field = %photo.field_name,
            size = photo.size(),
            "Sending Telegram photo"
        );

        let content_type = photo
            .content_type
            .as_deref()
            .and_then(|ct| ct.parse::<mime::Mime>().ok())
            .unwrap_or(mime::IMAGE_JPEG);

        let part = Part::bytes(photo.data.to_vec())
            .file_name(
                photo
                    .file_name
                    .clone()
                    .unwrap_or_else(|| DEFAULT_PHOTO_NAME.to_string()),
            )
            .mime_str(content_type.as_ref())?;

        let form = Form::new()
            .text("chat_id", credentials.chat_id.clone())
            .text("caption", caption.to_string())
            .part("photo", part);

        let response = self
            .http_client
            .post(self.method_url(&credentials.bot_token, "sendPhoto"))
            .multipart(form)
            .send()
            .await?;

        Self::read_reply(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mode_wire_names() {
        assert_eq!(
            serde_json::to_value(ParseMode::Markdown).unwrap(),
            "Markdown"
        );
        assert_eq!(
            serde_json::to_value(ParseMode::MarkdownV2).unwrap(),
            "MarkdownV2"
        );
        assert_eq!(serde_json::to_value(ParseMode::Html).unwrap(), "HTML");
    }

    #[test]
    fn test_credentials_debug_hides_token() {
        let creds = TelegramCredentials {
            bot_token: "123:secret".to_string(),
            chat_id: "-100".to_string(),
        };
        let printed = format!("{:?}", creds);
        assert!(!printed.contains("secret"));
        assert!(printed.contains("-100"));
    }

    #[test]
    fn test_method_url_trims_trailing_slash() {
        let client = TelegramClient::new("http://localhost:8081/").unwrap();
        assert_eq!(
            client.method_url("TOKEN", "sendPhoto"),
            "http://localhost:8081/botTOKEN/sendPhoto"
        );
    }
}
