//! In-memory group gateway.

use std::collections::HashSet;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::{ChatId, Timestamp, UserId};
use crate::ports::{GatewayError, GroupGateway, InviteLink, MemberStatus};

/// One direct message captured by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub user: UserId,
    pub text: String,
}

/// GroupGateway simulating a single group's membership roster.
///
/// Tracks members, bans, sent messages, and issued invites so tests can
/// assert on the full outward-facing effect of a flow.
#[derive(Default)]
pub struct InMemoryGroupGateway {
    members: RwLock<HashSet<i64>>,
    banned: RwLock<HashSet<i64>>,
    messages: RwLock<Vec<SentMessage>>,
    invites_issued: RwLock<u64>,
}

impl InMemoryGroupGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a user as a current group member.
    pub async fn add_member(&self, user: UserId) {
        self.members.write().await.insert(user.as_i64());
    }

    pub async fn is_member(&self, user: UserId) -> bool {
        self.members.read().await.contains(&user.as_i64())
    }

    pub async fn is_banned(&self, user: UserId) -> bool {
        self.banned.read().await.contains(&user.as_i64())
    }

    /// All direct messages sent so far, in order.
    pub async fn sent_messages(&self) -> Vec<SentMessage> {
        self.messages.read().await.clone()
    }

    pub async fn invites_issued(&self) -> u64 {
        *self.invites_issued.read().await
    }
}

#[async_trait]
impl GroupGateway for InMemoryGroupGateway {
    async fn member_status(
        &self,
        _chat: ChatId,
        user: UserId,
    ) -> Result<MemberStatus, GatewayError> {
        if self.banned.read().await.contains(&user.as_i64()) {
            return Ok(MemberStatus::Banned);
        }
        if self.members.read().await.contains(&user.as_i64()) {
            return Ok(MemberStatus::Member);
        }
        Ok(MemberStatus::Left)
    }

    async fn create_invite_link(
        &self,
        _chat: ChatId,
        expires_at: Timestamp,
    ) -> Result<InviteLink, GatewayError> {
        let mut issued = self.invites_issued.write().await;
        *issued += 1;
        Ok(InviteLink {
            url: format!("https://t.me/+invite{}", issued),
            expires_at,
        })
    }

    async fn send_direct_message(&self, user: UserId, text: &str) -> Result<(), GatewayError> {
        self.messages.write().await.push(SentMessage {
            user,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn ban_member(&self, _chat: ChatId, user: UserId) -> Result<(), GatewayError> {
        self.members.write().await.remove(&user.as_i64());
        self.banned.write().await.insert(user.as_i64());
        Ok(())
    }

    async fn unban_member(&self, _chat: ChatId, user: UserId) -> Result<(), GatewayError> {
        self.banned.write().await.remove(&user.as_i64());
        Ok(())
    }
}
