//! User-facing message templates.
//!
//! Every outbound text lives here so the engine and the command router
//! never embed copy inline. Messages are short and specific; raw provider
//! errors are never interpolated into anything a user sees.

use crate::domain::foundation::{Timestamp, TxId, UsdtAmount};
use crate::domain::subscription::Subscription;

/// `/start` payment instructions.
pub fn payment_instructions(price: UsdtAmount, period_days: i64, wallet_address: &str) -> String {
    format!(
        "PREMIUM CLUB SUBSCRIPTION\n\n\
         Price: {price} USDT\n\
         Period: {period_days} days\n\
         Network: TRC-20 (Tron)\n\n\
         Payment address:\n{wallet_address}\n\n\
         1. Send {price} USDT to the address above\n\
         2. Reply with the transaction ID (TXID)\n\
         3. Once the payment is verified you will receive an invite link\n\n\
         Important: the payment must be made on the TRC-20 network.\n\
         Wait until all blocks are confirmed before sending the TXID."
    )
}

/// Progress note sent before the ledger lookup runs.
pub fn checking_payment() -> String {
    "Checking your payment, please wait...".to_string()
}

pub fn invalid_format() -> String {
    "Invalid TXID format. A TXID must be 64 characters long.".to_string()
}

pub fn already_used() -> String {
    "This TXID has already been used. Each TXID can only be used once.".to_string()
}

pub fn verification_failed(price: UsdtAmount) -> String {
    format!(
        "Payment not found or not valid.\n\
         Please check that:\n\
         - the TXID is correct\n\
         - the payment is {price} USDT\n\
         - the TRC-20 network was used\n\
         - the payment went to the right address\n\
         If the problem persists, contact support."
    )
}

pub fn membership_failed() -> String {
    "Could not add you to the group. Please contact an administrator.".to_string()
}

pub fn persistence_failed() -> String {
    "Something went wrong while recording your subscription. Please contact an administrator."
        .to_string()
}

pub fn payment_confirmed(period_days: i64, end_date: Timestamp) -> String {
    format!(
        "Payment confirmed!\n\
         You now have Premium access for {period_days} days.\n\
         Subscription ends: {end_date}"
    )
}

/// Private delivery of a freshly minted single-use invite link.
pub fn invite(url: &str, ttl_secs: u64) -> String {
    let validity = if ttl_secs % 3600 == 0 {
        let hours = ttl_secs / 3600;
        format!("{} hour{}", hours, if hours == 1 { "" } else { "s" })
    } else {
        format!("{} minutes", ttl_secs / 60)
    };
    format!(
        "Your personal invite link:\n{url}\n\n\
         The link is valid for {validity} and can be used once."
    )
}

pub fn reminder() -> String {
    "Your Premium subscription ends today. To keep your access, please make \
     a new payment before it expires."
        .to_string()
}

pub fn expiry_notice() -> String {
    "Your Premium subscription has expired.\n\
     Use /start to purchase a new subscription."
        .to_string()
}

pub fn admin_new_member(
    display_name: Option<&str>,
    username: Option<&str>,
    txid: &TxId,
) -> String {
    format!(
        "New member: {} (@{})\nTXID: {}",
        display_name.unwrap_or("unknown"),
        username.unwrap_or("no username"),
        txid
    )
}

pub fn admin_expired_batch(count: usize) -> String {
    format!("Removed {count} member(s) with expired subscriptions.")
}

pub fn status_active(subscription: &Subscription, now: Timestamp) -> String {
    format!(
        "Your subscription:\n\n\
         Status: active\n\
         Ends: {}\n\
         Days left: {}\n\
         TXID: {}",
        subscription.end_date,
        subscription.days_remaining(now),
        subscription.last_txid
    )
}

pub fn status_none() -> String {
    "You have no active subscription. Use /start to purchase one.".to_string()
}

pub fn admin_summary(active: u64, total: u64, today_revenue: UsdtAmount) -> String {
    format!(
        "Admin panel:\n\n\
         Active subscribers: {active}\n\
         Total subscribers: {total}\n\
         Today's revenue: {today_revenue} USDT\n\n\
         Commands:\n\
         /start - payment instructions\n\
         /status - subscription status\n\
         /admin - this panel"
    )
}

pub fn sendtx_usage() -> String {
    "Please provide the TXID:\n/sendtx <TXID>".to_string()
}

pub fn private_only() -> String {
    "This command can only be used in a private chat with the bot.".to_string()
}

pub fn not_authorized() -> String {
    "Not authorized.".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::TXID_LEN;

    #[test]
    fn instructions_mention_price_and_address() {
        let text = payment_instructions(UsdtAmount::from_whole(25), 30, "TWalletAddr");
        assert!(text.contains("25.00 USDT"));
        assert!(text.contains("30 days"));
        assert!(text.contains("TWalletAddr"));
    }

    #[test]
    fn invite_renders_hours_for_round_ttl() {
        let text = invite("https://t.me/+abc", 3600);
        assert!(text.contains("1 hour"));
        assert!(text.contains("https://t.me/+abc"));
    }

    #[test]
    fn invite_renders_minutes_otherwise() {
        let text = invite("https://t.me/+abc", 1800);
        assert!(text.contains("30 minutes"));
    }

    #[test]
    fn admin_new_member_handles_missing_names() {
        let txid = TxId::parse(&"f".repeat(TXID_LEN)).unwrap();
        let text = admin_new_member(None, None, &txid);
        assert!(text.contains("unknown"));
        assert!(text.contains("no username"));
    }
}
