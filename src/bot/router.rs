//! Command router.
//!
//! Maps incoming private messages to the engine: the payment commands, the
//! status and admin queries, and the passive TXID path. Both TXID entry
//! points (`/sendtx` and plain private text) go through the same claim
//! funnel in the payment processor.

use std::sync::Arc;

use crate::application::{AdminReporter, PaymentProcessor};
use crate::domain::foundation::{Timestamp, TxId, UsdtAmount, UserId};
use crate::domain::subscription::{ClaimError, SubscriberProfile};
use crate::messages;
use crate::ports::{GroupGateway, SubscriptionStore};

/// One message as seen by the router, already stripped of transport detail.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    pub profile: SubscriberProfile,
    /// Whether the message arrived in a one-on-one chat with the bot.
    pub is_private: bool,
    pub text: String,
}

/// Fixed settings for the router.
#[derive(Debug, Clone)]
pub struct RouterSettings {
    pub admin_id: UserId,
    pub wallet_address: String,
    pub price: UsdtAmount,
    pub period_days: i64,
}

/// Routes messages to handlers and renders replies.
///
/// Replies are delivered as direct messages through the gateway; a failed
/// delivery is logged, never propagated.
pub struct BotRouter {
    processor: Arc<PaymentProcessor>,
    subscriptions: Arc<dyn SubscriptionStore>,
    reporter: AdminReporter,
    gateway: Arc<dyn GroupGateway>,
    settings: RouterSettings,
}

impl BotRouter {
    pub fn new(
        processor: Arc<PaymentProcessor>,
        subscriptions: Arc<dyn SubscriptionStore>,
        reporter: AdminReporter,
        gateway: Arc<dyn GroupGateway>,
        settings: RouterSettings,
    ) -> Self {
        Self {
            processor,
            subscriptions,
            reporter,
            gateway,
            settings,
        }
    }

    /// Handle one incoming message.
    pub async fn handle(&self, message: IncomingMessage) {
        let text = message.text.trim();
        let (command, rest) = split_command(text);

        if !message.is_private {
            // Group chatter is none of the bot's business; only a misplaced
            // command earns a pointer to the private chat.
            if matches!(command, Some("/start" | "/status" | "/admin" | "/sendtx")) {
                self.dm(message.profile.user_id, &messages::private_only())
                    .await;
            }
            return;
        }

        match command {
            Some("/start") => self.handle_start(message.profile.user_id).await,
            Some("/status") => self.handle_status(message.profile.user_id).await,
            Some("/admin") => self.handle_admin(message.profile.user_id).await,
            Some("/sendtx") => {
                if rest.is_empty() {
                    self.dm(message.profile.user_id, &messages::sendtx_usage())
                        .await;
                } else {
                    self.submit_claim(message.profile, rest).await;
                }
            }
            Some(_) => {}
            None if !text.is_empty() => self.submit_claim(message.profile, text).await,
            None => {}
        }
    }

    async fn handle_start(&self, user: UserId) {
        self.dm(
            user,
            &messages::payment_instructions(
                self.settings.price,
                self.settings.period_days,
                &self.settings.wallet_address,
            ),
        )
        .await;
    }

    async fn handle_status(&self, user: UserId) {
        let reply = match self.subscriptions.find_by_user(user).await {
            Ok(Some(subscription)) if subscription.is_active => {
                messages::status_active(&subscription, Timestamp::now())
            }
            Ok(_) => messages::status_none(),
            Err(error) => {
                tracing::error!(user_id = %user, error = %error, "status lookup failed");
                messages::persistence_failed()
            }
        };
        self.dm(user, &reply).await;
    }

    async fn handle_admin(&self, user: UserId) {
        if user != self.settings.admin_id {
            self.dm(user, &messages::not_authorized()).await;
            return;
        }

        let reply = match self.reporter.summarize().await {
            Ok(summary) => messages::admin_summary(
                summary.active_subscriptions,
                summary.total_subscriptions,
                summary.today_revenue,
            ),
            Err(error) => {
                tracing::error!(error = %error, "admin summary failed");
                messages::persistence_failed()
            }
        };
        self.dm(user, &reply).await;
    }

    /// The shared claim funnel for `/sendtx` and passive private text.
    async fn submit_claim(&self, profile: SubscriberProfile, raw: &str) {
        let user = profile.user_id;

        // A wrong-length claim gets the format error straight away; the
        // progress note only goes out once a ledger lookup will happen.
        if TxId::parse(raw).is_err() {
            self.dm(user, &messages::invalid_format()).await;
            return;
        }
        self.dm(user, &messages::checking_payment()).await;

        let reply = match self.processor.process_claim(profile, raw).await {
            Ok(grant) => {
                messages::payment_confirmed(self.settings.period_days, grant.outcome.end_date)
            }
            Err(ClaimError::InvalidFormat(_)) => messages::invalid_format(),
            Err(ClaimError::AlreadyUsed) => messages::already_used(),
            Err(ClaimError::VerificationFailed) => {
                messages::verification_failed(self.settings.price)
            }
            Err(error @ ClaimError::Membership(_)) => {
                tracing::error!(user_id = %user, error = %error, "claim failed at membership");
                messages::membership_failed()
            }
            Err(error @ ClaimError::Persistence(_)) => {
                tracing::error!(user_id = %user, error = %error, "claim failed at persistence");
                messages::persistence_failed()
            }
        };
        self.dm(user, &reply).await;
    }

    async fn dm(&self, user: UserId, text: &str) {
        if let Err(error) = self.gateway.send_direct_message(user, text).await {
            tracing::warn!(user_id = %user, error = %error, "reply delivery failed");
        }
    }
}

/// Split a leading bot command off a message, dropping any `@botname` suffix.
fn split_command(text: &str) -> (Option<&str>, &str) {
    if !text.starts_with('/') {
        return (None, text);
    }
    let (head, rest) = match text.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (text, ""),
    };
    let command = head.split('@').next().unwrap_or(head);
    (Some(command), rest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        InMemoryGroupGateway, InMemoryLedger, InMemorySubscriptionStore, InMemoryTransactionStore,
    };
    use crate::application::{
        LedgerVerifier, LifecycleSettings, SubscriptionLifecycle,
    };
    use crate::domain::foundation::{ChatId, TxId, TXID_LEN};
    use crate::ports::TransferEntry;

    const ADMIN: UserId = UserId::new(1);
    const GROUP: ChatId = ChatId::new(-100_500);
    const WALLET: &str = "TXYZa1b2c3d4e5f6g7h8i9j0k1l2m3n4o5";

    struct Harness {
        router: BotRouter,
        gateway: Arc<InMemoryGroupGateway>,
        ledger: Arc<InMemoryLedger>,
    }

    fn harness() -> Harness {
        let transactions = Arc::new(InMemoryTransactionStore::new());
        let subscriptions = Arc::new(InMemorySubscriptionStore::new());
        let gateway = Arc::new(InMemoryGroupGateway::new());
        let ledger = Arc::new(InMemoryLedger::new());

        let price = UsdtAmount::from_whole(25);
        let verifier = LedgerVerifier::new(ledger.clone(), WALLET.to_string(), price);
        let lifecycle = Arc::new(SubscriptionLifecycle::new(
            subscriptions.clone(),
            gateway.clone(),
            LifecycleSettings {
                group_id: GROUP,
                admin_id: ADMIN,
                period_days: 30,
                reminder_window_hours: 12,
                invite_ttl_secs: 3600,
            },
        ));
        let processor = Arc::new(PaymentProcessor::new(
            transactions.clone(),
            verifier,
            lifecycle,
        ));
        let reporter = AdminReporter::new(transactions, subscriptions.clone());

        let router = BotRouter::new(
            processor,
            subscriptions,
            reporter,
            gateway.clone(),
            RouterSettings {
                admin_id: ADMIN,
                wallet_address: WALLET.to_string(),
                price,
                period_days: 30,
            },
        );

        Harness {
            router,
            gateway,
            ledger,
        }
    }

    fn private(user: UserId, text: &str) -> IncomingMessage {
        IncomingMessage {
            profile: SubscriberProfile::new(user, Some("ada".into()), Some("Ada".into())),
            is_private: true,
            text: text.to_string(),
        }
    }

    fn in_group(user: UserId, text: &str) -> IncomingMessage {
        IncomingMessage {
            is_private: false,
            ..private(user, text)
        }
    }

    async fn texts_for(gateway: &InMemoryGroupGateway, user: UserId) -> Vec<String> {
        gateway
            .sent_messages()
            .await
            .into_iter()
            .filter(|m| m.user == user)
            .map(|m| m.text)
            .collect()
    }

    #[test]
    fn command_splitting_handles_bot_suffix_and_arguments() {
        assert_eq!(split_command("/start"), (Some("/start"), ""));
        assert_eq!(split_command("/start@my_bot"), (Some("/start"), ""));
        assert_eq!(split_command("/sendtx abc"), (Some("/sendtx"), "abc"));
        assert_eq!(split_command("deadbeef"), (None, "deadbeef"));
    }

    #[tokio::test]
    async fn start_replies_with_payment_instructions() {
        let h = harness();
        let user = UserId::new(7);
        h.router.handle(private(user, "/start")).await;

        let texts = texts_for(&h.gateway, user).await;
        assert_eq!(texts.len(), 1);
        assert!(texts[0].contains(WALLET));
        assert!(texts[0].contains("25.00 USDT"));
    }

    #[tokio::test]
    async fn status_without_subscription_says_so() {
        let h = harness();
        let user = UserId::new(7);
        h.router.handle(private(user, "/status")).await;

        let texts = texts_for(&h.gateway, user).await;
        assert_eq!(texts, vec![messages::status_none()]);
    }

    #[tokio::test]
    async fn admin_command_rejects_non_admin() {
        let h = harness();
        let user = UserId::new(7);
        h.router.handle(private(user, "/admin")).await;

        let texts = texts_for(&h.gateway, user).await;
        assert_eq!(texts, vec![messages::not_authorized()]);
    }

    #[tokio::test]
    async fn admin_command_summarizes_for_admin() {
        let h = harness();
        h.router.handle(private(ADMIN, "/admin")).await;

        let texts = texts_for(&h.gateway, ADMIN).await;
        assert_eq!(texts.len(), 1);
        assert!(texts[0].contains("Active subscribers: 0"));
    }

    #[tokio::test]
    async fn sendtx_without_argument_shows_usage() {
        let h = harness();
        let user = UserId::new(7);
        h.router.handle(private(user, "/sendtx")).await;

        let texts = texts_for(&h.gateway, user).await;
        assert_eq!(texts, vec![messages::sendtx_usage()]);
    }

    #[tokio::test]
    async fn group_text_is_ignored_entirely() {
        let h = harness();
        let user = UserId::new(7);
        h.router.handle(in_group(user, &"a".repeat(TXID_LEN))).await;

        assert!(h.gateway.sent_messages().await.is_empty());
    }

    #[tokio::test]
    async fn group_command_points_at_private_chat() {
        let h = harness();
        let user = UserId::new(7);
        h.router.handle(in_group(user, "/start")).await;

        let texts = texts_for(&h.gateway, user).await;
        assert_eq!(texts, vec![messages::private_only()]);
    }

    #[tokio::test]
    async fn passive_text_with_bad_format_reports_invalid_without_progress_note() {
        let h = harness();
        let user = UserId::new(7);
        h.router.handle(private(user, "not-a-txid")).await;

        // No "checking payment" first; the format error is the only reply.
        let texts = texts_for(&h.gateway, user).await;
        assert_eq!(texts, vec![messages::invalid_format()]);
    }

    #[tokio::test]
    async fn verified_claim_sends_invite_then_confirmation() {
        let h = harness();
        let user = UserId::new(7);
        let raw = "b".repeat(TXID_LEN);
        let txid = TxId::parse(&raw).unwrap();
        h.ledger
            .record_transaction(
                &txid,
                vec![TransferEntry {
                    to_address: WALLET.to_string(),
                    amount: UsdtAmount::from_whole(25),
                }],
            )
            .await;

        h.router.handle(private(user, &raw)).await;

        let texts = texts_for(&h.gateway, user).await;
        assert_eq!(texts.len(), 3);
        assert_eq!(texts[0], messages::checking_payment());
        assert!(texts[1].contains("invite link"));
        assert!(texts[2].contains("Payment confirmed"));

        // The admin hears about the new member.
        let admin_texts = texts_for(&h.gateway, ADMIN).await;
        assert_eq!(admin_texts.len(), 1);
        assert!(admin_texts[0].contains("New member"));
    }

    #[tokio::test]
    async fn sendtx_and_passive_text_share_the_funnel() {
        let h = harness();
        let user = UserId::new(7);
        let raw = "c".repeat(TXID_LEN);
        let txid = TxId::parse(&raw).unwrap();
        h.ledger
            .record_transaction(
                &txid,
                vec![TransferEntry {
                    to_address: WALLET.to_string(),
                    amount: UsdtAmount::from_whole(25),
                }],
            )
            .await;

        h.router
            .handle(private(user, &format!("/sendtx {raw}")))
            .await;
        let texts = texts_for(&h.gateway, user).await;
        assert!(texts.last().unwrap().contains("Payment confirmed"));

        // The same hash through the passive path is now consumed.
        h.router.handle(private(user, &raw)).await;
        let texts = texts_for(&h.gateway, user).await;
        assert_eq!(texts.last().unwrap(), &messages::already_used());
    }

    #[tokio::test]
    async fn unverified_claim_reports_failure() {
        let h = harness();
        let user = UserId::new(7);
        h.router.handle(private(user, &"d".repeat(TXID_LEN))).await;

        let texts = texts_for(&h.gateway, user).await;
        assert_eq!(texts.len(), 2);
        assert!(texts[1].contains("Payment not found"));
    }
}
