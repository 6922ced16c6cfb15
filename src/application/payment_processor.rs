//! Payment processor - turns an inbound TXID claim into an access grant.
//!
//! Both TXID-bearing entry points (the passive free-text message and the
//! explicit submit command) funnel into [`PaymentProcessor::process_claim`]
//! so the two paths can never diverge.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::foundation::{Timestamp, TxId, UsdtAmount, UserId};
use crate::domain::subscription::{ClaimError, SubscriberProfile, TransactionRecord};
use crate::ports::{StoreError, TransactionStore};

use super::ledger_verifier::LedgerVerifier;
use super::lifecycle::{GrantOutcome, SubscriptionLifecycle};

/// Everything the front end needs to confirm a successful claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimGrant {
    pub txid: TxId,
    pub amount: UsdtAmount,
    pub outcome: GrantOutcome,
}

/// Orchestrates format validation, idempotency, ledger verification,
/// transaction recording and the grant transition for one claim.
pub struct PaymentProcessor {
    transactions: Arc<dyn TransactionStore>,
    verifier: LedgerVerifier,
    lifecycle: Arc<SubscriptionLifecycle>,
    /// Per-user serialization of the grant path, so two concurrent claims
    /// by the same user cannot both reach membership reconciliation.
    user_locks: Mutex<HashMap<UserId, Arc<Mutex<()>>>>,
}

impl PaymentProcessor {
    pub fn new(
        transactions: Arc<dyn TransactionStore>,
        verifier: LedgerVerifier,
        lifecycle: Arc<SubscriptionLifecycle>,
    ) -> Self {
        Self {
            transactions,
            verifier,
            lifecycle,
            user_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Process one claimed payment.
    ///
    /// Steps, strictly in order for a single claim:
    ///
    /// 1. Format gate: trim and require the fixed 64-character length.
    ///    Nothing touches the network or a store before this passes.
    /// 2. Idempotency: a TXID found in the transaction store is consumed
    ///    forever, regardless of who submitted it first.
    /// 3. Ledger verification, fail-closed.
    /// 4. Record the transaction. This write is the gate that spends the
    ///    TXID: if anything after it fails, the hash stays consumed and
    ///    the user is pointed at an administrator for remediation.
    /// 5. Grant or renew the subscription.
    pub async fn process_claim(
        &self,
        profile: SubscriberProfile,
        raw_text: &str,
    ) -> Result<ClaimGrant, ClaimError> {
        let txid = TxId::parse(raw_text)?;
        let user = profile.user_id;

        let lock = self.lock_for(user).await;
        let result = {
            let _guard = lock.lock().await;
            self.claim_locked(profile, txid).await
        };
        drop(lock);
        self.prune_lock(user).await;
        result
    }

    async fn claim_locked(
        &self,
        profile: SubscriberProfile,
        txid: TxId,
    ) -> Result<ClaimGrant, ClaimError> {
        let existing = self
            .transactions
            .find(&txid)
            .await
            .map_err(|e| ClaimError::persistence(e.to_string()))?;
        if existing.is_some() {
            return Err(ClaimError::AlreadyUsed);
        }

        let amount = self
            .verifier
            .verify(&txid)
            .await
            .ok_or(ClaimError::VerificationFailed)?;

        let record = TransactionRecord::new(
            txid.clone(),
            profile.user_id,
            amount,
            Timestamp::now(),
        );
        match self.transactions.insert(&record).await {
            Ok(()) => {}
            // Lost a race against a concurrent claim for the same hash.
            Err(StoreError::Conflict { .. }) => return Err(ClaimError::AlreadyUsed),
            Err(error) => return Err(ClaimError::persistence(error.to_string())),
        }

        tracing::info!(txid = %txid, user_id = %profile.user_id, amount = %amount, "payment verified");

        // From here on the TXID is spent even if the grant fails.
        let outcome = self.lifecycle.grant_access(profile, &txid).await?;

        Ok(ClaimGrant {
            txid,
            amount,
            outcome,
        })
    }

    async fn lock_for(&self, user: UserId) -> Arc<Mutex<()>> {
        let mut locks = self.user_locks.lock().await;
        locks.entry(user).or_default().clone()
    }

    /// Drop the map entry once no in-flight claim holds it, so the map
    /// stays bounded by concurrency rather than by distinct users seen.
    async fn prune_lock(&self, user: UserId) {
        let mut locks = self.user_locks.lock().await;
        if let Some(lock) = locks.get(&user) {
            if Arc::strong_count(lock) == 1 {
                locks.remove(&user);
            }
        }
    }
}
