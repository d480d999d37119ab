use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "https://api.telegram.org";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Anything that can deliver a formatted message to a chat.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send(&self, chat_id: &str, text: &str) -> Result<()>;
}

#[derive(Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
}

#[derive(Deserialize)]
struct TelegramResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Clone)]
pub struct TelegramClient {
    client: Client,
    token: String,
    base_url: String,
}

impl TelegramClient {
    pub fn new(token: &str) -> Self {
        Self::with_base_url(token, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(token: &str, base_url: &str) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            token: token.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl Messenger for TelegramClient {
    async fn send(&self, chat_id: &str, text: &str) -> Result<()> {
        let url = format!("{}/bot{}/sendMessage", self.base_url, self.token);
        let request = SendMessageRequest {
            chat_id,
            text,
            parse_mode: "Markdown",
        };

        let response = self.client.post(&url).json(&request).send().await?;
        let status = response.status();
        let body: TelegramResponse = response
            .json()
            .await
            .map_err(|e| anyhow!("Telegram API error {}: {}", status, e))?;

        if !status.is_success() || !body.ok {
            return Err(anyhow!(
                "Telegram API error {}: {}",
                status,
                body.description.unwrap_or_default()
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let request = SendMessageRequest {
            chat_id: "-100123",
            text: "*hi*",
            parse_mode: "Markdown",
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["chat_id"], "-100123");
        assert_eq!(json["parse_mode"], "Markdown");
    }

    #[test]
    fn test_error_response() {
        let body = r#"{"ok":false,"error_code":400,"description":"Bad Request: can't parse entities"}"#;
        let parsed: TelegramResponse = serde_json::from_str(body).unwrap();
        assert!(!parsed.ok);
        assert!(parsed.description.unwrap().contains("can't parse entities"));
    }
}
