//! Telegram adapter - Bot API client, update types, and the group gateway.

mod api;
mod gateway;

pub use api::{ApiError, Chat, ChatMemberInfo, Message, TelegramApi, TelegramApiConfig, Update, User};
pub use gateway::TelegramGateway;
