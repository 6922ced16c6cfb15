//! Ledger verifier - decides whether a claimed transaction pays for access.

use std::sync::Arc;

use crate::domain::foundation::{TxId, UsdtAmount};
use crate::ports::LedgerLookup;

/// Checks a transaction hash against the destination-address and
/// minimum-amount rules.
///
/// Fail-closed by construction: any lookup failure is reported as "no
/// qualifying transfer" rather than an error, and no retry happens here.
pub struct LedgerVerifier {
    ledger: Arc<dyn LedgerLookup>,
    wallet_address: String,
    price: UsdtAmount,
}

impl LedgerVerifier {
    pub fn new(ledger: Arc<dyn LedgerLookup>, wallet_address: String, price: UsdtAmount) -> Self {
        Self {
            ledger,
            wallet_address,
            price,
        }
    }

    /// Resolve the hash and return the first qualifying transfer's amount.
    ///
    /// A transfer qualifies when its destination equals the configured
    /// wallet and its amount is at least the subscription price. Entries
    /// are not ranked; the first match wins. `None` means the claim is not
    /// verified, whether because no entry qualified or because the lookup
    /// itself failed.
    pub async fn verify(&self, txid: &TxId) -> Option<UsdtAmount> {
        let entries = match self.ledger.transfers(txid).await {
            Ok(entries) => entries,
            Err(error) => {
                tracing::warn!(txid = %txid, error = %error, "ledger lookup failed");
                return None;
            }
        };

        entries
            .into_iter()
            .find(|entry| entry.to_address == self.wallet_address && entry.amount >= self.price)
            .map(|entry| entry.amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::TXID_LEN;
    use crate::ports::{LedgerError, TransferEntry};
    use async_trait::async_trait;

    const WALLET: &str = "TOurWalletAddress";

    struct FixedLedger {
        result: Result<Vec<TransferEntry>, LedgerError>,
    }

    #[async_trait]
    impl LedgerLookup for FixedLedger {
        async fn transfers(&self, _txid: &TxId) -> Result<Vec<TransferEntry>, LedgerError> {
            self.result.clone()
        }
    }

    fn verifier(result: Result<Vec<TransferEntry>, LedgerError>) -> LedgerVerifier {
        LedgerVerifier::new(
            Arc::new(FixedLedger { result }),
            WALLET.to_string(),
            UsdtAmount::from_whole(25),
        )
    }

    fn txid() -> TxId {
        TxId::parse(&"d".repeat(TXID_LEN)).unwrap()
    }

    fn entry(to: &str, micros: i64) -> TransferEntry {
        TransferEntry {
            to_address: to.to_string(),
            amount: UsdtAmount::from_micros(micros),
        }
    }

    #[tokio::test]
    async fn accepts_exact_price_to_our_wallet() {
        let v = verifier(Ok(vec![entry(WALLET, 25_000_000)]));
        assert_eq!(v.verify(&txid()).await, Some(UsdtAmount::from_whole(25)));
    }

    #[tokio::test]
    async fn rejects_one_smallest_unit_below_price() {
        let v = verifier(Ok(vec![entry(WALLET, 24_999_999)]));
        assert_eq!(v.verify(&txid()).await, None);
    }

    #[tokio::test]
    async fn rejects_transfer_to_other_address() {
        let v = verifier(Ok(vec![entry("TSomeoneElse", 25_000_000)]));
        assert_eq!(v.verify(&txid()).await, None);
    }

    #[tokio::test]
    async fn first_qualifying_entry_wins() {
        let v = verifier(Ok(vec![
            entry("TSomeoneElse", 100_000_000),
            entry(WALLET, 26_000_000),
            entry(WALLET, 99_000_000),
        ]));
        // The first match is taken; no largest-transfer ranking.
        assert_eq!(
            v.verify(&txid()).await,
            Some(UsdtAmount::from_micros(26_000_000))
        );
    }

    #[tokio::test]
    async fn preserves_overpayment_amount() {
        let v = verifier(Ok(vec![entry(WALLET, 30_000_000)]));
        assert_eq!(v.verify(&txid()).await, Some(UsdtAmount::from_whole(30)));
    }

    #[tokio::test]
    async fn empty_transfer_list_is_not_verified() {
        let v = verifier(Ok(vec![]));
        assert_eq!(v.verify(&txid()).await, None);
    }

    #[tokio::test]
    async fn lookup_failure_is_fail_closed() {
        let v = verifier(Err(LedgerError::Status(502)));
        assert_eq!(v.verify(&txid()).await, None);

        let v = verifier(Err(LedgerError::Transport("timeout".into())));
        assert_eq!(v.verify(&txid()).await, None);

        let v = verifier(Err(LedgerError::Malformed("bad json".into())));
        assert_eq!(v.verify(&txid()).await, None);
    }
}
