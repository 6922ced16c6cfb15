//! Telegram configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Telegram configuration (bot identity, admin, restricted group)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TelegramConfig {
    /// Bot API token issued by BotFather
    pub bot_token: String,

    /// User id of the administrator receiving notifications and /admin access
    #[serde(default)]
    pub admin_user_id: i64,

    /// Chat id of the restricted premium group (negative for supergroups)
    #[serde(default)]
    pub group_id: i64,
}

impl TelegramConfig {
    /// Validate telegram configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.bot_token.is_empty() {
            return Err(ValidationError::MissingRequired("TELEGRAM_BOT_TOKEN"));
        }
        // Tokens look like "<numeric id>:<secret>"
        if !self.bot_token.contains(':') {
            return Err(ValidationError::InvalidBotToken);
        }
        if self.admin_user_id == 0 {
            return Err(ValidationError::InvalidAdminUserId);
        }
        if self.group_id >= 0 {
            return Err(ValidationError::InvalidGroupId);
        }
        Ok(())
    }
}
