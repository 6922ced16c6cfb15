//! Low-level Telegram Bot API client.
//!
//! Thin typed wrapper over the HTTP methods the bot needs: long-polled
//! `getUpdates`, `sendMessage`, and the membership calls. Every response
//! arrives in the standard `{"ok": ..., "result": ...}` envelope.

use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

/// Failures talking to the Bot API.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("telegram api error: {description}")]
    Api {
        error_code: Option<i64>,
        description: String,
    },
}

impl ApiError {
    /// Whether the API rejected the call because the subject user is unknown
    /// to the chat. `getChatMember` answers this way for users who never
    /// interacted with the group.
    pub fn is_user_not_found(&self) -> bool {
        match self {
            ApiError::Api { description, .. } => {
                let lowered = description.to_lowercase();
                lowered.contains("user not found")
                    || lowered.contains("participant_id_invalid")
                    || lowered.contains("member not found")
            }
            ApiError::Transport(_) => false,
        }
    }
}

/// Configuration for the Bot API client.
#[derive(Debug, Clone)]
pub struct TelegramApiConfig {
    /// Bot token used in the request path.
    token: Secret<String>,
    /// Base URL for the API (default: https://api.telegram.org).
    pub base_url: String,
    /// Timeout for ordinary (non-polling) requests.
    pub timeout: Duration,
    /// Long-poll wait passed to `getUpdates`, in seconds.
    pub poll_timeout_secs: u64,
}

impl TelegramApiConfig {
    /// Creates a new configuration with the given bot token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Secret::new(token.into()),
            base_url: "https://api.telegram.org".to_string(),
            timeout: Duration::from_secs(10),
            poll_timeout_secs: 30,
        }
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn token(&self) -> &str {
        self.token.expose_secret()
    }
}

/// Typed Bot API client.
pub struct TelegramApi {
    config: TelegramApiConfig,
    client: Client,
    /// Separate client for long polls, whose timeout must exceed the poll wait.
    poll_client: Client,
}

impl TelegramApi {
    /// Creates a new client with the given configuration.
    pub fn new(config: TelegramApiConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");
        let poll_client = Client::builder()
            .timeout(Duration::from_secs(config.poll_timeout_secs + 10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            config,
            client,
            poll_client,
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.config.base_url,
            self.config.token(),
            method
        )
    }

    async fn call<T: DeserializeOwned>(
        &self,
        client: &Client,
        method: &str,
        payload: &serde_json::Value,
    ) -> Result<T, ApiError> {
        let response = client
            .post(self.method_url(method))
            .json(payload)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let envelope: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| ApiError::Transport(format!("Failed to parse response: {}", e)))?;

        match envelope {
            ApiResponse {
                ok: true,
                result: Some(result),
                ..
            } => Ok(result),
            ApiResponse {
                error_code,
                description,
                ..
            } => Err(ApiError::Api {
                error_code,
                description: description.unwrap_or_else(|| "No description".to_string()),
            }),
        }
    }

    /// Long-poll for new updates starting at the given offset.
    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>, ApiError> {
        self.call(
            &self.poll_client,
            "getUpdates",
            &json!({
                "offset": offset,
                "timeout": self.config.poll_timeout_secs,
                "allowed_updates": ["message"],
            }),
        )
        .await
    }

    /// Send a plain-text message to a chat.
    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<Message, ApiError> {
        self.call(
            &self.client,
            "sendMessage",
            &json!({ "chat_id": chat_id, "text": text }),
        )
        .await
    }

    /// Query a user's membership record in a chat.
    pub async fn get_chat_member(
        &self,
        chat_id: i64,
        user_id: i64,
    ) -> Result<ChatMemberInfo, ApiError> {
        self.call(
            &self.client,
            "getChatMember",
            &json!({ "chat_id": chat_id, "user_id": user_id }),
        )
        .await
    }

    /// Create a single-use invite link expiring at the given unix time.
    pub async fn create_chat_invite_link(
        &self,
        chat_id: i64,
        expire_date: i64,
    ) -> Result<ChatInviteLink, ApiError> {
        self.call(
            &self.client,
            "createChatInviteLink",
            &json!({
                "chat_id": chat_id,
                "expire_date": expire_date,
                "member_limit": 1,
            }),
        )
        .await
    }

    /// Remove a user from a chat.
    pub async fn ban_chat_member(&self, chat_id: i64, user_id: i64) -> Result<bool, ApiError> {
        self.call(
            &self.client,
            "banChatMember",
            &json!({ "chat_id": chat_id, "user_id": user_id }),
        )
        .await
    }

    /// Lift a ban without kicking the user if they are currently a member.
    pub async fn unban_chat_member(&self, chat_id: i64, user_id: i64) -> Result<bool, ApiError> {
        self.call(
            &self.client,
            "unbanChatMember",
            &json!({
                "chat_id": chat_id,
                "user_id": user_id,
                "only_if_banned": true,
            }),
        )
        .await
    }
}

// ----- Bot API Types -----

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
    error_code: Option<i64>,
}

/// One entry from `getUpdates`.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

/// An incoming or sent message.
#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub from: Option<User>,
    pub chat: Chat,
    pub text: Option<String>,
}

/// A Telegram user.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
}

impl User {
    /// Full display name as shown in chats.
    pub fn display_name(&self) -> String {
        match &self.last_name {
            Some(last) => format!("{} {}", self.first_name, last),
            None => self.first_name.clone(),
        }
    }
}

/// The chat a message arrived in.
#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type")]
    pub chat_type: String,
}

impl Chat {
    pub fn is_private(&self) -> bool {
        self.chat_type == "private"
    }
}

/// Result of `getChatMember`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatMemberInfo {
    pub status: String,
}

/// Result of `createChatInviteLink`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatInviteLink {
    pub invite_link: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_url_embeds_token() {
        let api = TelegramApi::new(TelegramApiConfig::new("123:abc"));
        assert_eq!(
            api.method_url("sendMessage"),
            "https://api.telegram.org/bot123:abc/sendMessage"
        );
    }

    #[test]
    fn envelope_success_carries_result() {
        let envelope: ApiResponse<ChatMemberInfo> =
            serde_json::from_str(r#"{"ok": true, "result": {"status": "member"}}"#).unwrap();
        assert!(envelope.ok);
        assert_eq!(envelope.result.unwrap().status, "member");
    }

    #[test]
    fn envelope_failure_carries_description() {
        let envelope: ApiResponse<ChatMemberInfo> = serde_json::from_str(
            r#"{"ok": false, "error_code": 400, "description": "Bad Request: user not found"}"#,
        )
        .unwrap();
        assert!(!envelope.ok);
        assert_eq!(envelope.error_code, Some(400));
        assert_eq!(
            envelope.description.as_deref(),
            Some("Bad Request: user not found")
        );
    }

    #[test]
    fn user_not_found_detection() {
        let err = ApiError::Api {
            error_code: Some(400),
            description: "Bad Request: user not found".to_string(),
        };
        assert!(err.is_user_not_found());

        let err = ApiError::Api {
            error_code: Some(400),
            description: "Bad Request: chat not found".to_string(),
        };
        assert!(!err.is_user_not_found());

        assert!(!ApiError::Transport("timeout".to_string()).is_user_not_found());
    }

    #[test]
    fn update_parses_private_text_message() {
        let update: Update = serde_json::from_str(
            r#"{
                "update_id": 7,
                "message": {
                    "message_id": 1,
                    "from": {"id": 42, "first_name": "Ada", "last_name": "L", "username": "ada"},
                    "chat": {"id": 42, "type": "private"},
                    "text": "/start"
                }
            }"#,
        )
        .unwrap();

        let message = update.message.unwrap();
        assert!(message.chat.is_private());
        assert_eq!(message.text.as_deref(), Some("/start"));
        assert_eq!(message.from.unwrap().display_name(), "Ada L");
    }

    #[test]
    fn update_without_message_is_tolerated() {
        let update: Update = serde_json::from_str(r#"{"update_id": 8}"#).unwrap();
        assert!(update.message.is_none());
    }
}
