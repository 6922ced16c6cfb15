//! Subscription lifecycle manager.
//!
//! Owns the grant/renew transition triggered by a verified payment, and
//! the reminder and expiry transitions driven by the sweep scheduler.

use std::sync::Arc;

use chrono::Duration;

use crate::domain::foundation::{ChatId, Timestamp, TxId, UserId};
use crate::domain::subscription::{ClaimError, SubscriberProfile, Subscription};
use crate::messages;
use crate::ports::{GatewayError, GroupGateway, InviteLink, StoreError, SubscriptionStore};

/// How access was extended to the user during membership reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InviteDelivery {
    /// The user was already in the group; no new invite was minted.
    AlreadyMember,

    /// A fresh single-use invite link was delivered privately.
    InviteSent(InviteLink),
}

/// Result of a successful grant/renew transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantOutcome {
    pub delivery: InviteDelivery,
    pub end_date: Timestamp,
}

/// Failures inside one sweep pass.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SweepError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Fixed settings for the lifecycle manager.
#[derive(Debug, Clone)]
pub struct LifecycleSettings {
    /// The restricted group being sold.
    pub group_id: ChatId,

    /// Administrator receiving member/expiry notifications.
    pub admin_id: UserId,

    /// Subscription period granted per verified payment.
    pub period_days: i64,

    /// Look-ahead window for expiry reminders.
    pub reminder_window_hours: i64,

    /// Validity window of a freshly minted invite link.
    pub invite_ttl_secs: u64,
}

/// State machine per user: no subscription, active, expiring soon
/// (informational), expired. Grants come from the payment processor;
/// reminder and expiry transitions only ever come from the sweep.
pub struct SubscriptionLifecycle {
    subscriptions: Arc<dyn SubscriptionStore>,
    gateway: Arc<dyn GroupGateway>,
    settings: LifecycleSettings,
}

impl SubscriptionLifecycle {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionStore>,
        gateway: Arc<dyn GroupGateway>,
        settings: LifecycleSettings,
    ) -> Self {
        Self {
            subscriptions,
            gateway,
            settings,
        }
    }

    /// Grant or renew access after a verified payment.
    ///
    /// Membership is reconciled first; if that fails with anything other
    /// than "user absent from group", no subscription row is written, so
    /// the store never records access that was not actually extended. The
    /// row upsert always restarts the period from now and re-arms the
    /// reminder.
    pub async fn grant_access(
        &self,
        profile: SubscriberProfile,
        txid: &TxId,
    ) -> Result<GrantOutcome, ClaimError> {
        let delivery = self.reconcile_membership(profile.user_id).await?;

        let now = Timestamp::now();
        let subscription = Subscription::grant(
            profile.clone(),
            txid.clone(),
            now,
            self.settings.period_days,
        );
        self.subscriptions
            .upsert(&subscription)
            .await
            .map_err(|e| ClaimError::persistence(e.to_string()))?;

        tracing::info!(
            user_id = %profile.user_id,
            end_date = %subscription.end_date,
            "subscription granted"
        );

        self.notify_admin(&messages::admin_new_member(
            profile.display_name.as_deref(),
            profile.username.as_deref(),
            txid,
        ))
        .await;

        Ok(GrantOutcome {
            delivery,
            end_date: subscription.end_date,
        })
    }

    /// Confirm the user is in the group, or invite them.
    ///
    /// Already-present users are confirmed without minting a new link.
    /// Absent users get a single-use, time-limited invite link delivered
    /// privately. Any other gateway failure aborts the grant.
    async fn reconcile_membership(&self, user: UserId) -> Result<InviteDelivery, ClaimError> {
        let status = self
            .gateway
            .member_status(self.settings.group_id, user)
            .await
            .map_err(|e| ClaimError::membership(e.to_string()))?;

        if status.is_present() {
            return Ok(InviteDelivery::AlreadyMember);
        }

        let expires_at = Timestamp::now().plus_secs(self.settings.invite_ttl_secs);
        let link = self
            .gateway
            .create_invite_link(self.settings.group_id, expires_at)
            .await
            .map_err(|e| ClaimError::membership(e.to_string()))?;

        self.gateway
            .send_direct_message(
                user,
                &messages::invite(&link.url, self.settings.invite_ttl_secs),
            )
            .await
            .map_err(|e| ClaimError::membership(e.to_string()))?;

        Ok(InviteDelivery::InviteSent(link))
    }

    /// Reminder transition: one-time notice for subscriptions ending within
    /// the look-ahead window. Returns how many reminders went out.
    ///
    /// Per-row failures are logged and skipped so one unreachable user
    /// cannot stall the rest of the pass.
    pub async fn run_reminder_pass(&self, now: Timestamp) -> Result<usize, SweepError> {
        let window = Duration::hours(self.settings.reminder_window_hours);
        let due = self.subscriptions.due_for_reminder(now, window).await?;

        let mut sent = 0;
        for subscription in due {
            match self.remind_one(&subscription).await {
                Ok(()) => {
                    tracing::info!(user_id = %subscription.user_id, "expiry reminder sent");
                    sent += 1;
                }
                Err(error) => {
                    tracing::error!(
                        user_id = %subscription.user_id,
                        error = %error,
                        "failed to send expiry reminder"
                    );
                }
            }
        }
        Ok(sent)
    }

    async fn remind_one(&self, subscription: &Subscription) -> Result<(), SweepError> {
        self.gateway
            .send_direct_message(subscription.user_id, &messages::reminder())
            .await?;
        // Flag after the send: a failed delivery stays eligible for the
        // next cycle rather than silently never reminding.
        self.subscriptions
            .mark_reminder_sent(subscription.user_id)
            .await?;
        Ok(())
    }

    /// Expiry transition: revoke access for every active subscription whose
    /// end date has passed. Returns how many members were removed.
    ///
    /// Removal is a ban immediately followed by an unban, so the user can
    /// rejoin with a future payment. The administrator gets one batch
    /// notification per pass that removed anyone.
    pub async fn run_expiry_pass(&self, now: Timestamp) -> Result<usize, SweepError> {
        let expired = self.subscriptions.expired_as_of(now).await?;

        let mut removed = 0;
        for subscription in expired {
            match self.expire_one(&subscription).await {
                Ok(()) => {
                    tracing::info!(user_id = %subscription.user_id, "expired member removed");
                    removed += 1;
                }
                Err(error) => {
                    tracing::error!(
                        user_id = %subscription.user_id,
                        error = %error,
                        "failed to remove expired member"
                    );
                }
            }
        }

        if removed > 0 {
            self.notify_admin(&messages::admin_expired_batch(removed)).await;
        }
        Ok(removed)
    }

    async fn expire_one(&self, subscription: &Subscription) -> Result<(), SweepError> {
        let group = self.settings.group_id;
        let user = subscription.user_id;

        self.gateway.ban_member(group, user).await?;
        self.gateway.unban_member(group, user).await?;
        self.subscriptions.deactivate(user).await?;
        self.gateway
            .send_direct_message(user, &messages::expiry_notice())
            .await?;
        Ok(())
    }

    /// Best-effort admin notification; failures are logged, never surfaced.
    async fn notify_admin(&self, text: &str) {
        if let Err(error) = self
            .gateway
            .send_direct_message(self.settings.admin_id, text)
            .await
        {
            tracing::error!(error = %error, "failed to notify admin");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::TXID_LEN;
    use crate::ports::MemberStatus;
    use async_trait::async_trait;
    use tokio::sync::RwLock;

    const GROUP: ChatId = ChatId::new(-100_500);
    const ADMIN: UserId = UserId::new(1);

    fn settings() -> LifecycleSettings {
        LifecycleSettings {
            group_id: GROUP,
            admin_id: ADMIN,
            period_days: 30,
            reminder_window_hours: 12,
            invite_ttl_secs: 3600,
        }
    }

    fn txid(fill: char) -> TxId {
        TxId::parse(&fill.to_string().repeat(TXID_LEN)).unwrap()
    }

    fn profile(id: i64) -> SubscriberProfile {
        SubscriberProfile::new(UserId::new(id), Some("bob".into()), Some("Bob".into()))
    }

    // ── Mock subscription store ──────────────────────────────────────────

    #[derive(Default)]
    struct MockSubscriptionStore {
        rows: RwLock<Vec<Subscription>>,
        fail_upsert: bool,
    }

    impl MockSubscriptionStore {
        fn with_rows(rows: Vec<Subscription>) -> Self {
            Self {
                rows: RwLock::new(rows),
                fail_upsert: false,
            }
        }

        fn failing_upsert() -> Self {
            Self {
                rows: RwLock::new(Vec::new()),
                fail_upsert: true,
            }
        }

        async fn rows(&self) -> Vec<Subscription> {
            self.rows.read().await.clone()
        }
    }

    #[async_trait]
    impl SubscriptionStore for MockSubscriptionStore {
        async fn upsert(&self, subscription: &Subscription) -> Result<(), StoreError> {
            if self.fail_upsert {
                return Err(StoreError::backend("simulated upsert failure"));
            }
            let mut rows = self.rows.write().await;
            rows.retain(|row| row.user_id != subscription.user_id);
            rows.push(subscription.clone());
            Ok(())
        }

        async fn find_by_user(&self, user_id: UserId) -> Result<Option<Subscription>, StoreError> {
            Ok(self
                .rows
                .read()
                .await
                .iter()
                .find(|row| row.user_id == user_id)
                .cloned())
        }

        async fn due_for_reminder(
            &self,
            now: Timestamp,
            window: Duration,
        ) -> Result<Vec<Subscription>, StoreError> {
            Ok(self
                .rows
                .read()
                .await
                .iter()
                .filter(|row| row.needs_reminder_at(now, window))
                .cloned()
                .collect())
        }

        async fn expired_as_of(&self, now: Timestamp) -> Result<Vec<Subscription>, StoreError> {
            Ok(self
                .rows
                .read()
                .await
                .iter()
                .filter(|row| row.is_expired_at(now))
                .cloned()
                .collect())
        }

        async fn mark_reminder_sent(&self, user_id: UserId) -> Result<(), StoreError> {
            let mut rows = self.rows.write().await;
            for row in rows.iter_mut().filter(|row| row.user_id == user_id) {
                row.mark_reminder_sent();
            }
            Ok(())
        }

        async fn deactivate(&self, user_id: UserId) -> Result<(), StoreError> {
            let mut rows = self.rows.write().await;
            for row in rows.iter_mut().filter(|row| row.user_id == user_id) {
                row.deactivate();
            }
            Ok(())
        }

        async fn count_active(&self) -> Result<u64, StoreError> {
            Ok(self.rows.read().await.iter().filter(|r| r.is_active).count() as u64)
        }

        async fn count_all(&self) -> Result<u64, StoreError> {
            Ok(self.rows.read().await.len() as u64)
        }
    }

    // ── Mock group gateway ───────────────────────────────────────────────

    struct MockGateway {
        status: Result<MemberStatus, GatewayError>,
        fail_invite: bool,
        messages: RwLock<Vec<(UserId, String)>>,
        bans: RwLock<Vec<UserId>>,
        unbans: RwLock<Vec<UserId>>,
        invites_created: RwLock<usize>,
    }

    impl MockGateway {
        fn with_status(status: MemberStatus) -> Self {
            Self {
                status: Ok(status),
                fail_invite: false,
                messages: RwLock::new(Vec::new()),
                bans: RwLock::new(Vec::new()),
                unbans: RwLock::new(Vec::new()),
                invites_created: RwLock::new(0),
            }
        }

        fn failing_status() -> Self {
            Self {
                status: Err(GatewayError::api("chat not found")),
                ..Self::with_status(MemberStatus::Left)
            }
        }

        fn failing_invite() -> Self {
            Self {
                fail_invite: true,
                ..Self::with_status(MemberStatus::Left)
            }
        }

        async fn messages_to(&self, user: UserId) -> Vec<String> {
            self.messages
                .read()
                .await
                .iter()
                .filter(|(to, _)| *to == user)
                .map(|(_, text)| text.clone())
                .collect()
        }
    }

    #[async_trait]
    impl GroupGateway for MockGateway {
        async fn member_status(
            &self,
            _chat: ChatId,
            _user: UserId,
        ) -> Result<MemberStatus, GatewayError> {
            self.status.clone()
        }

        async fn create_invite_link(
            &self,
            _chat: ChatId,
            expires_at: Timestamp,
        ) -> Result<InviteLink, GatewayError> {
            if self.fail_invite {
                return Err(GatewayError::api("not enough rights"));
            }
            *self.invites_created.write().await += 1;
            Ok(InviteLink {
                url: "https://t.me/+invite".to_string(),
                expires_at,
            })
        }

        async fn send_direct_message(&self, user: UserId, text: &str) -> Result<(), GatewayError> {
            self.messages.write().await.push((user, text.to_string()));
            Ok(())
        }

        async fn ban_member(&self, _chat: ChatId, user: UserId) -> Result<(), GatewayError> {
            self.bans.write().await.push(user);
            Ok(())
        }

        async fn unban_member(&self, _chat: ChatId, user: UserId) -> Result<(), GatewayError> {
            self.unbans.write().await.push(user);
            Ok(())
        }
    }

    fn lifecycle(
        store: Arc<MockSubscriptionStore>,
        gateway: Arc<MockGateway>,
    ) -> SubscriptionLifecycle {
        SubscriptionLifecycle::new(store, gateway, settings())
    }

    // ── Grant path ───────────────────────────────────────────────────────

    #[tokio::test]
    async fn grant_invites_absent_user_and_upserts_row() {
        let store = Arc::new(MockSubscriptionStore::default());
        let gateway = Arc::new(MockGateway::with_status(MemberStatus::Left));
        let lc = lifecycle(store.clone(), gateway.clone());

        let outcome = lc.grant_access(profile(100), &txid('a')).await.unwrap();

        assert!(matches!(outcome.delivery, InviteDelivery::InviteSent(_)));
        assert_eq!(*gateway.invites_created.read().await, 1);

        let rows = store.rows().await;
        assert_eq!(rows.len(), 1);
        assert!(rows[0].is_active);
        assert!(!rows[0].reminder_sent);
        assert_eq!(rows[0].last_txid, txid('a'));

        // Invite delivered privately, admin notified.
        assert_eq!(gateway.messages_to(UserId::new(100)).await.len(), 1);
        assert_eq!(gateway.messages_to(ADMIN).await.len(), 1);
    }

    #[tokio::test]
    async fn grant_confirms_existing_member_without_new_invite() {
        let store = Arc::new(MockSubscriptionStore::default());
        let gateway = Arc::new(MockGateway::with_status(MemberStatus::Member));
        let lc = lifecycle(store.clone(), gateway.clone());

        let outcome = lc.grant_access(profile(100), &txid('a')).await.unwrap();

        assert_eq!(outcome.delivery, InviteDelivery::AlreadyMember);
        assert_eq!(*gateway.invites_created.read().await, 0);
        assert_eq!(store.rows().await.len(), 1);
    }

    #[tokio::test]
    async fn membership_query_failure_aborts_without_subscription_write() {
        let store = Arc::new(MockSubscriptionStore::default());
        let gateway = Arc::new(MockGateway::failing_status());
        let lc = lifecycle(store.clone(), gateway);

        let err = lc.grant_access(profile(100), &txid('a')).await.unwrap_err();

        assert!(matches!(err, ClaimError::Membership(_)));
        assert!(store.rows().await.is_empty());
    }

    #[tokio::test]
    async fn invite_creation_failure_aborts_without_subscription_write() {
        let store = Arc::new(MockSubscriptionStore::default());
        let gateway = Arc::new(MockGateway::failing_invite());
        let lc = lifecycle(store.clone(), gateway);

        let err = lc.grant_access(profile(100), &txid('a')).await.unwrap_err();

        assert!(matches!(err, ClaimError::Membership(_)));
        assert!(store.rows().await.is_empty());
    }

    #[tokio::test]
    async fn upsert_failure_surfaces_as_persistence() {
        let store = Arc::new(MockSubscriptionStore::failing_upsert());
        let gateway = Arc::new(MockGateway::with_status(MemberStatus::Member));
        let lc = lifecycle(store, gateway);

        let err = lc.grant_access(profile(100), &txid('a')).await.unwrap_err();
        assert!(matches!(err, ClaimError::Persistence(_)));
    }

    #[tokio::test]
    async fn renewal_runs_period_from_now_and_rearms_reminder() {
        let now = Timestamp::now();
        let mut existing = Subscription::grant(
            SubscriberProfile::new(UserId::new(100), None, None),
            txid('a'),
            now.plus_days(-20),
            30,
        );
        existing.mark_reminder_sent();
        let old_end = existing.end_date;

        let store = Arc::new(MockSubscriptionStore::with_rows(vec![existing]));
        let gateway = Arc::new(MockGateway::with_status(MemberStatus::Member));
        let lc = lifecycle(store.clone(), gateway);

        lc.grant_access(profile(100), &txid('b')).await.unwrap();

        let rows = store.rows().await;
        assert_eq!(rows.len(), 1, "renewal replaces, never duplicates");
        let renewed = &rows[0];

        assert!(renewed.end_date > old_end);
        // end = now + 30d, not old_end + 30d.
        assert!(renewed.end_date < old_end.plus_days(30));
        assert!(!renewed.reminder_sent);
        assert_eq!(renewed.last_txid, txid('b'));
    }

    // ── Reminder pass ────────────────────────────────────────────────────

    fn expiring_soon(id: i64, now: Timestamp) -> Subscription {
        let mut sub = Subscription::grant(
            SubscriberProfile::new(UserId::new(id), None, None),
            txid('a'),
            now,
            30,
        );
        sub.end_date = now.plus_hours(6);
        sub
    }

    #[tokio::test]
    async fn reminder_pass_sends_once_and_sets_flag() {
        let now = Timestamp::now();
        let store = Arc::new(MockSubscriptionStore::with_rows(vec![expiring_soon(
            100, now,
        )]));
        let gateway = Arc::new(MockGateway::with_status(MemberStatus::Member));
        let lc = lifecycle(store.clone(), gateway.clone());

        let sent = lc.run_reminder_pass(now).await.unwrap();
        assert_eq!(sent, 1);
        assert!(store.rows().await[0].reminder_sent);
        assert_eq!(gateway.messages_to(UserId::new(100)).await.len(), 1);

        // Second cycle: nothing more for the same end_date.
        let sent = lc.run_reminder_pass(now).await.unwrap();
        assert_eq!(sent, 0);
        assert_eq!(gateway.messages_to(UserId::new(100)).await.len(), 1);
    }

    #[tokio::test]
    async fn reminder_pass_ignores_far_future_subscriptions() {
        let now = Timestamp::now();
        let fresh = Subscription::grant(
            SubscriberProfile::new(UserId::new(100), None, None),
            txid('a'),
            now,
            30,
        );
        let store = Arc::new(MockSubscriptionStore::with_rows(vec![fresh]));
        let gateway = Arc::new(MockGateway::with_status(MemberStatus::Member));
        let lc = lifecycle(store, gateway);

        assert_eq!(lc.run_reminder_pass(now).await.unwrap(), 0);
    }

    // ── Expiry pass ──────────────────────────────────────────────────────

    fn lapsed(id: i64, now: Timestamp) -> Subscription {
        Subscription::grant(
            SubscriberProfile::new(UserId::new(id), None, None),
            txid('a'),
            now.plus_days(-31),
            30,
        )
    }

    #[tokio::test]
    async fn expiry_pass_revokes_deactivates_and_notifies() {
        let now = Timestamp::now();
        let store = Arc::new(MockSubscriptionStore::with_rows(vec![lapsed(100, now)]));
        let gateway = Arc::new(MockGateway::with_status(MemberStatus::Member));
        let lc = lifecycle(store.clone(), gateway.clone());

        let removed = lc.run_expiry_pass(now).await.unwrap();
        assert_eq!(removed, 1);

        // Ban then unban, so the user can rejoin later.
        assert_eq!(gateway.bans.read().await.as_slice(), &[UserId::new(100)]);
        assert_eq!(gateway.unbans.read().await.as_slice(), &[UserId::new(100)]);

        assert!(!store.rows().await[0].is_active);
        assert_eq!(gateway.messages_to(UserId::new(100)).await.len(), 1);
        // Batch admin notification with the count.
        let admin_msgs = gateway.messages_to(ADMIN).await;
        assert_eq!(admin_msgs.len(), 1);
        assert!(admin_msgs[0].contains('1'));
    }

    #[tokio::test]
    async fn expiry_pass_is_idempotent_across_cycles() {
        let now = Timestamp::now();
        let store = Arc::new(MockSubscriptionStore::with_rows(vec![lapsed(100, now)]));
        let gateway = Arc::new(MockGateway::with_status(MemberStatus::Member));
        let lc = lifecycle(store, gateway.clone());

        assert_eq!(lc.run_expiry_pass(now).await.unwrap(), 1);
        assert_eq!(lc.run_expiry_pass(now).await.unwrap(), 0);
        assert_eq!(gateway.bans.read().await.len(), 1);
    }

    #[tokio::test]
    async fn expiry_pass_without_lapsed_rows_skips_admin_notice() {
        let now = Timestamp::now();
        let store = Arc::new(MockSubscriptionStore::default());
        let gateway = Arc::new(MockGateway::with_status(MemberStatus::Member));
        let lc = lifecycle(store, gateway.clone());

        assert_eq!(lc.run_expiry_pass(now).await.unwrap(), 0);
        assert!(gateway.messages_to(ADMIN).await.is_empty());
    }
}
