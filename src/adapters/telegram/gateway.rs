//! GroupGateway implementation over the Bot API client.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::foundation::{ChatId, Timestamp, UserId};
use crate::ports::{GatewayError, GroupGateway, InviteLink, MemberStatus};

use super::api::{ApiError, TelegramApi};

/// Group-membership operations backed by Telegram.
pub struct TelegramGateway {
    api: Arc<TelegramApi>,
}

impl TelegramGateway {
    pub fn new(api: Arc<TelegramApi>) -> Self {
        Self { api }
    }
}

fn map_error(error: ApiError) -> GatewayError {
    match error {
        ApiError::Transport(reason) => GatewayError::transport(reason),
        ApiError::Api { description, .. } => GatewayError::api(description),
    }
}

fn map_status(status: &str) -> Result<MemberStatus, GatewayError> {
    match status {
        "creator" => Ok(MemberStatus::Owner),
        "administrator" => Ok(MemberStatus::Administrator),
        "member" => Ok(MemberStatus::Member),
        "restricted" => Ok(MemberStatus::Restricted),
        "left" => Ok(MemberStatus::Left),
        "kicked" => Ok(MemberStatus::Banned),
        other => Err(GatewayError::api(format!(
            "Unknown member status: {other}"
        ))),
    }
}

#[async_trait]
impl GroupGateway for TelegramGateway {
    async fn member_status(
        &self,
        chat: ChatId,
        user: UserId,
    ) -> Result<MemberStatus, GatewayError> {
        match self.api.get_chat_member(chat.as_i64(), user.as_i64()).await {
            Ok(info) => map_status(&info.status),
            // Users the chat has never seen are simply not present.
            Err(error) if error.is_user_not_found() => Ok(MemberStatus::Left),
            Err(error) => Err(map_error(error)),
        }
    }

    async fn create_invite_link(
        &self,
        chat: ChatId,
        expires_at: Timestamp,
    ) -> Result<InviteLink, GatewayError> {
        let link = self
            .api
            .create_chat_invite_link(chat.as_i64(), expires_at.as_unix_secs())
            .await
            .map_err(map_error)?;

        Ok(InviteLink {
            url: link.invite_link,
            expires_at,
        })
    }

    async fn send_direct_message(&self, user: UserId, text: &str) -> Result<(), GatewayError> {
        self.api
            .send_message(ChatId::from(user).as_i64(), text)
            .await
            .map(|_| ())
            .map_err(map_error)
    }

    async fn ban_member(&self, chat: ChatId, user: UserId) -> Result<(), GatewayError> {
        self.api
            .ban_chat_member(chat.as_i64(), user.as_i64())
            .await
            .map(|_| ())
            .map_err(map_error)
    }

    async fn unban_member(&self, chat: ChatId, user: UserId) -> Result<(), GatewayError> {
        self.api
            .unban_chat_member(chat.as_i64(), user.as_i64())
            .await
            .map(|_| ())
            .map_err(map_error)
    }
}
