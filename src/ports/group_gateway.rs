//! Group membership gateway port.
//!
//! The messaging platform's membership primitives: invite links, direct
//! messages, membership status, and the ban/unban pair used to force a
//! member out without permanently blocking them.

use crate::domain::foundation::{ChatId, Timestamp, UserId};
use async_trait::async_trait;
use thiserror::Error;

/// A user's standing inside the restricted group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberStatus {
    Owner,
    Administrator,
    Member,
    /// In the group but with restricted permissions.
    Restricted,
    /// Not currently in the group (includes users who never joined).
    Left,
    Banned,
}

impl MemberStatus {
    /// Whether the user currently sits inside the group.
    pub fn is_present(&self) -> bool {
        matches!(
            self,
            MemberStatus::Owner
                | MemberStatus::Administrator
                | MemberStatus::Member
                | MemberStatus::Restricted
        )
    }
}

/// A freshly created single-use invite link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InviteLink {
    pub url: String,
    pub expires_at: Timestamp,
}

/// Failures talking to the messaging platform.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("api error: {0}")]
    Api(String),
}

impl GatewayError {
    pub fn transport(reason: impl Into<String>) -> Self {
        GatewayError::Transport(reason.into())
    }

    pub fn api(description: impl Into<String>) -> Self {
        GatewayError::Api(description.into())
    }
}

/// Port for group-membership operations and direct messages.
#[async_trait]
pub trait GroupGateway: Send + Sync {
    /// Query a user's standing in a chat.
    ///
    /// Users the platform has never seen in the chat resolve to
    /// [`MemberStatus::Left`]; only genuine lookup failures are errors.
    async fn member_status(&self, chat: ChatId, user: UserId)
        -> Result<MemberStatus, GatewayError>;

    /// Create a single-use invite link that expires at the given moment.
    async fn create_invite_link(
        &self,
        chat: ChatId,
        expires_at: Timestamp,
    ) -> Result<InviteLink, GatewayError>;

    /// Deliver a private message to a user.
    async fn send_direct_message(&self, user: UserId, text: &str) -> Result<(), GatewayError>;

    /// Remove a user from a chat.
    async fn ban_member(&self, chat: ChatId, user: UserId) -> Result<(), GatewayError>;

    /// Lift a removal so the user may rejoin on a future payment.
    async fn unban_member(&self, chat: ChatId, user: UserId) -> Result<(), GatewayError>;
}
