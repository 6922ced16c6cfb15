//! Update dispatcher - the long-poll loop feeding the router.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::adapters::telegram::{Message, TelegramApi};
use crate::domain::foundation::UserId;
use crate::domain::subscription::SubscriberProfile;

use super::router::{BotRouter, IncomingMessage};

/// Pause after a failed `getUpdates` call before polling again.
const POLL_RETRY: Duration = Duration::from_secs(5);

/// Pulls updates from the Bot API and hands each message to the router.
pub struct UpdateDispatcher {
    api: Arc<TelegramApi>,
    router: Arc<BotRouter>,
}

impl UpdateDispatcher {
    pub fn new(api: Arc<TelegramApi>, router: Arc<BotRouter>) -> Self {
        Self { api, router }
    }

    /// Run the polling loop until the shutdown signal flips to true.
    ///
    /// A failed poll is logged and retried after a short pause; the loop
    /// never terminates because of one bad call.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut offset = 0i64;
        loop {
            if *shutdown.borrow() {
                tracing::info!("update dispatcher stopping");
                return;
            }

            tokio::select! {
                _ = shutdown.changed() => {}
                result = self.api.get_updates(offset) => match result {
                    Ok(updates) => {
                        for update in updates {
                            offset = offset.max(update.update_id + 1);
                            if let Some(message) = update.message.and_then(to_incoming) {
                                self.router.handle(message).await;
                            }
                        }
                    }
                    Err(error) => {
                        tracing::warn!(error = %error, "getUpdates failed, backing off");
                        tokio::select! {
                            _ = shutdown.changed() => {}
                            _ = tokio::time::sleep(POLL_RETRY) => {}
                        }
                    }
                }
            }
        }
    }
}

/// Strip a raw update down to what the router needs.
///
/// Messages without a sender or without text (joins, stickers, edits) are
/// dropped here.
fn to_incoming(message: Message) -> Option<IncomingMessage> {
    let from = message.from?;
    let text = message.text?;

    Some(IncomingMessage {
        profile: SubscriberProfile::new(
            UserId::new(from.id),
            from.username.clone(),
            Some(from.display_name()),
        ),
        is_private: message.chat.is_private(),
        text,
    })
}
