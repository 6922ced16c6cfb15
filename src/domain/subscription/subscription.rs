//! Subscription aggregate entity.
//!
//! One row per user, keyed by `user_id`. A verified payment creates or
//! replaces the row; the periodic sweep flips `is_active` off once
//! `end_date` passes and fires the one-time expiry reminder before that.

use crate::domain::foundation::{Timestamp, TxId, UserId};
use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Who the subscriber is, as last seen by the messaging front end.
///
/// Username and display name are denormalized onto the subscription row so
/// sweep notifications and admin reports don't need a profile lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriberProfile {
    pub user_id: UserId,
    pub username: Option<String>,
    pub display_name: Option<String>,
}

impl SubscriberProfile {
    pub fn new(
        user_id: UserId,
        username: Option<String>,
        display_name: Option<String>,
    ) -> Self {
        Self {
            user_id,
            username,
            display_name,
        }
    }
}

/// A user's current access grant.
///
/// # Invariants
///
/// - At most one row per `user_id` (upsert semantics in the store).
/// - `end_date = start_date + subscription period`.
/// - `reminder_sent` is scoped to the current `end_date`; any renewal that
///   moves `end_date` resets it to false.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub user_id: UserId,
    pub username: Option<String>,
    pub display_name: Option<String>,

    /// Transaction that most recently (re)granted access.
    pub last_txid: TxId,

    pub start_date: Timestamp,
    pub end_date: Timestamp,
    pub is_active: bool,
    pub reminder_sent: bool,
}

impl Subscription {
    /// Grant or renew access following a verified payment.
    ///
    /// The period always runs from `now`; renewing early does not stack the
    /// unused remainder onto the new period.
    pub fn grant(profile: SubscriberProfile, txid: TxId, now: Timestamp, period_days: i64) -> Self {
        Self {
            user_id: profile.user_id,
            username: profile.username,
            display_name: profile.display_name,
            last_txid: txid,
            start_date: now,
            end_date: now.plus_days(period_days),
            is_active: true,
            reminder_sent: false,
        }
    }

    /// Whether the expiry sweep should revoke this subscription.
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        self.is_active && self.end_date <= now
    }

    /// Whether the reminder sweep should fire for this subscription.
    ///
    /// True when the subscription is active, no reminder has gone out for
    /// the current `end_date`, and the end falls inside the look-ahead
    /// window starting at `now`.
    pub fn needs_reminder_at(&self, now: Timestamp, window: Duration) -> bool {
        self.is_active
            && !self.reminder_sent
            && self.end_date >= now
            && self.end_date <= Timestamp::from_datetime(*now.as_datetime() + window)
    }

    /// Record that the one-time reminder for the current `end_date` went out.
    pub fn mark_reminder_sent(&mut self) {
        self.reminder_sent = true;
    }

    /// Revoke the grant. Only the sweep performs this transition.
    pub fn deactivate(&mut self) {
        self.is_active = false;
    }

    /// Whole days left until expiry, clamped at zero.
    pub fn days_remaining(&self, now: Timestamp) -> i64 {
        self.end_date.duration_since(&now).num_days().max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::TXID_LEN;

    fn txid(fill: char) -> TxId {
        TxId::parse(&fill.to_string().repeat(TXID_LEN)).unwrap()
    }

    fn profile() -> SubscriberProfile {
        SubscriberProfile::new(UserId::new(100), Some("alice".into()), Some("Alice".into()))
    }

    #[test]
    fn grant_runs_period_from_now() {
        let now = Timestamp::now();
        let sub = Subscription::grant(profile(), txid('a'), now, 30);

        assert_eq!(sub.start_date, now);
        assert_eq!(sub.end_date, now.plus_days(30));
        assert!(sub.is_active);
        assert!(!sub.reminder_sent);
    }

    #[test]
    fn regrant_does_not_stack_unused_days() {
        let now = Timestamp::now();
        let first = Subscription::grant(profile(), txid('a'), now, 30);

        // Renew 10 days in: the new end is 30 days from the renewal moment,
        // not 30 days past the old end.
        let renewal_time = now.plus_days(10);
        let renewed = Subscription::grant(profile(), txid('b'), renewal_time, 30);

        assert_eq!(renewed.end_date, renewal_time.plus_days(30));
        assert!(renewed.end_date < first.end_date.plus_days(30));
    }

    #[test]
    fn regrant_resets_reminder_flag() {
        let now = Timestamp::now();
        let mut sub = Subscription::grant(profile(), txid('a'), now, 30);
        sub.mark_reminder_sent();

        let renewed = Subscription::grant(profile(), txid('b'), now.plus_days(1), 30);
        assert!(!renewed.reminder_sent);
    }

    #[test]
    fn regrant_records_latest_txid() {
        let now = Timestamp::now();
        let renewed = Subscription::grant(profile(), txid('b'), now, 30);
        assert_eq!(renewed.last_txid, txid('b'));
    }

    #[test]
    fn expired_when_end_date_passed() {
        let now = Timestamp::now();
        let mut sub = Subscription::grant(profile(), txid('a'), now.plus_days(-31), 30);
        assert!(sub.is_expired_at(now));

        sub.deactivate();
        assert!(!sub.is_active);
        // An already-deactivated row is not expired again.
        assert!(!sub.is_expired_at(now));
    }

    #[test]
    fn not_expired_before_end_date() {
        let now = Timestamp::now();
        let sub = Subscription::grant(profile(), txid('a'), now, 30);
        assert!(!sub.is_expired_at(now.plus_days(29)));
    }

    #[test]
    fn reminder_due_inside_window() {
        let now = Timestamp::now();
        // Ends in 6 hours; the 12-hour window catches it.
        let mut sub = Subscription::grant(profile(), txid('a'), now, 30);
        sub.end_date = now.plus_hours(6);

        assert!(sub.needs_reminder_at(now, Duration::hours(12)));
    }

    #[test]
    fn reminder_not_due_outside_window() {
        let now = Timestamp::now();
        let mut sub = Subscription::grant(profile(), txid('a'), now, 30);
        sub.end_date = now.plus_hours(13);

        assert!(!sub.needs_reminder_at(now, Duration::hours(12)));
    }

    #[test]
    fn reminder_fires_only_once_per_end_date() {
        let now = Timestamp::now();
        let mut sub = Subscription::grant(profile(), txid('a'), now, 30);
        sub.end_date = now.plus_hours(6);

        assert!(sub.needs_reminder_at(now, Duration::hours(12)));
        sub.mark_reminder_sent();
        assert!(!sub.needs_reminder_at(now, Duration::hours(12)));
    }

    #[test]
    fn reminder_not_due_for_inactive_subscription() {
        let now = Timestamp::now();
        let mut sub = Subscription::grant(profile(), txid('a'), now, 30);
        sub.end_date = now.plus_hours(6);
        sub.deactivate();

        assert!(!sub.needs_reminder_at(now, Duration::hours(12)));
    }

    #[test]
    fn days_remaining_clamps_at_zero() {
        let now = Timestamp::now();
        let sub = Subscription::grant(profile(), txid('a'), now.plus_days(-60), 30);
        assert_eq!(sub.days_remaining(now), 0);

        let fresh = Subscription::grant(profile(), txid('b'), now, 30);
        assert_eq!(fresh.days_remaining(now), 30);
    }
}
