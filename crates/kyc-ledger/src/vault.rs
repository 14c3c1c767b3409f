//! # The Vault — Durable Transaction Storage
//!
//! One durable entry per finalized transaction id, plus an index from
//! linear identifier to the latest transaction carrying it. Recording is
//! atomic and idempotent: both parties record the same notarized
//! transaction, and replays (the acceptor receives the finalized
//! transaction it already holds) must not create duplicates.

use std::collections::HashMap;
use std::sync::Mutex;

use tracing::{debug, info};

use kyc_contract::{KycRecord, SignedTransaction, TransactionId};
use kyc_core::LinearId;

use crate::error::LedgerError;

#[derive(Debug, Default)]
struct VaultInner {
    transactions: HashMap<TransactionId, SignedTransaction>,
    latest_by_linear_id: HashMap<LinearId, TransactionId>,
}

/// In-process durable store for notarized transactions.
#[derive(Debug, Default)]
pub struct Vault {
    inner: Mutex<VaultInner>,
}

impl Vault {
    /// An empty vault.
    pub fn new() -> Self {
        Self::default()
    }

    /// Persist a notarized transaction.
    ///
    /// Returns `true` when the transaction was newly recorded and `false`
    /// when the id was already present (idempotent no-op). Storage
    /// failures are surfaced, never swallowed.
    pub fn record(&self, ntx: &SignedTransaction) -> Result<bool, LedgerError> {
        let id = ntx.id()?;
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| LedgerError::Storage("vault lock poisoned".into()))?;

        if inner.transactions.contains_key(&id) {
            debug!(tx = %id, "already recorded, no-op");
            return Ok(false);
        }

        for output in &ntx.payload.outputs {
            inner
                .latest_by_linear_id
                .insert(output.linear_id.clone(), id);
        }
        inner.transactions.insert(id, ntx.clone());
        info!(tx = %id, "transaction recorded");
        Ok(true)
    }

    /// Fetch a recorded transaction by id.
    pub fn transaction(&self, id: &TransactionId) -> Result<Option<SignedTransaction>, LedgerError> {
        let inner = self
            .inner
            .lock()
            .map_err(|_| LedgerError::Storage("vault lock poisoned".into()))?;
        Ok(inner.transactions.get(id).cloned())
    }

    /// Number of recorded transactions.
    pub fn len(&self) -> Result<usize, LedgerError> {
        let inner = self
            .inner
            .lock()
            .map_err(|_| LedgerError::Storage("vault lock poisoned".into()))?;
        Ok(inner.transactions.len())
    }

    /// Whether the vault holds no transactions.
    pub fn is_empty(&self) -> Result<bool, LedgerError> {
        Ok(self.len()? == 0)
    }

    /// The latest transaction id recorded for a linear identifier.
    pub fn latest_for_linear_id(
        &self,
        linear_id: &LinearId,
    ) -> Result<Option<TransactionId>, LedgerError> {
        let inner = self
            .inner
            .lock()
            .map_err(|_| LedgerError::Storage("vault lock poisoned".into()))?;
        Ok(inner.latest_by_linear_id.get(linear_id).copied())
    }

    /// Every recorded KYC record for a subject, matched case-insensitively.
    pub fn records_for_subject(&self, user_id: &str) -> Result<Vec<KycRecord>, LedgerError> {
        let inner = self
            .inner
            .lock()
            .map_err(|_| LedgerError::Storage("vault lock poisoned".into()))?;
        let mut records: Vec<KycRecord> = inner
            .transactions
            .values()
            .flat_map(|tx| tx.payload.outputs.iter())
            .filter(|state| state.record.user_id.matches(user_id))
            .map(|state| state.record.clone())
            .collect();
        records.sort_by(|a, b| (a.kyc_date, a.valid_until).cmp(&(b.kyc_date, b.valid_until)));
        Ok(records)
    }

    /// The most recent record for a subject: maximum KYC date, ties
    /// broken by validity date.
    pub fn latest_record_for_subject(
        &self,
        user_id: &str,
    ) -> Result<Option<KycRecord>, LedgerError> {
        Ok(self.records_for_subject(user_id)?.pop())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kyc_contract::{build_agreement, LedgerState, Party};
    use kyc_core::TimeWindow;
    use kyc_crypto::Ed25519KeyPair;

    fn keypair(seed: u8) -> Ed25519KeyPair {
        Ed25519KeyPair::from_seed(&[seed; 32])
    }

    fn party(name: &str, seed: u8) -> Party {
        Party::new(name, keypair(seed).public_key())
    }

    fn record(kyc_id: u64, user_id: &str, kyc_date: &str) -> KycRecord {
        KycRecord::new(
            kyc_id,
            user_id,
            "Jiya Sen",
            kyc_date.parse().unwrap(),
            "2029-09-15".parse().unwrap(),
            "A001",
        )
    }

    fn notarized(rec: KycRecord) -> SignedTransaction {
        let state = LedgerState::issue(rec, party("BankA", 1), party("BankB", 2)).unwrap();
        build_agreement(state, party("Notary", 3), None)
            .with_time_window(TimeWindow::around_now())
            .sign(&keypair(2))
            .unwrap()
            .plus_signature(&keypair(1))
            .unwrap()
            .plus_signature(&keypair(3))
            .unwrap()
    }

    #[test]
    fn recording_twice_is_a_noop() {
        let vault = Vault::new();
        let ntx = notarized(record(111, "biksen", "2017-02-09"));
        assert!(vault.record(&ntx).unwrap());
        assert!(!vault.record(&ntx).unwrap());
        assert_eq!(vault.len().unwrap(), 1);
    }

    #[test]
    fn poisoned_lock_surfaces_storage_error() {
        let vault = std::sync::Arc::new(Vault::new());
        let poisoner = std::sync::Arc::clone(&vault);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.inner.lock().unwrap();
            panic!("poison the vault lock");
        })
        .join();
        assert!(matches!(
            vault.len().unwrap_err(),
            LedgerError::Storage(_)
        ));
        assert!(vault.is_empty().is_err());
        assert!(vault
            .latest_record_for_subject("biksen")
            .is_err());
    }

    #[test]
    fn transaction_retrievable_by_id() {
        let vault = Vault::new();
        let ntx = notarized(record(111, "biksen", "2017-02-09"));
        vault.record(&ntx).unwrap();
        let got = vault.transaction(&ntx.id().unwrap()).unwrap().unwrap();
        assert_eq!(got, ntx);
    }

    #[test]
    fn linear_id_index_tracks_latest() {
        let vault = Vault::new();
        let ntx = notarized(record(111, "biksen", "2017-02-09"));
        let linear_id = ntx.payload.outputs[0].linear_id.clone();
        vault.record(&ntx).unwrap();
        assert_eq!(
            vault.latest_for_linear_id(&linear_id).unwrap(),
            Some(ntx.id().unwrap())
        );
    }

    #[test]
    fn latest_record_picks_maximum_kyc_date() {
        let vault = Vault::new();
        vault.record(&notarized(record(111, "biksen", "2017-02-09"))).unwrap();
        vault.record(&notarized(record(112, "biksen", "2019-05-01"))).unwrap();
        vault.record(&notarized(record(113, "biksen", "2018-03-15"))).unwrap();

        let latest = vault.latest_record_for_subject("biksen").unwrap().unwrap();
        assert_eq!(latest.kyc_id, 112);
        assert_eq!(vault.records_for_subject("biksen").unwrap().len(), 3);
    }

    #[test]
    fn subject_lookup_is_case_insensitive() {
        let vault = Vault::new();
        vault.record(&notarized(record(111, "Biksen", "2017-02-09"))).unwrap();
        assert!(vault.latest_record_for_subject("BIKSEN").unwrap().is_some());
    }

    #[test]
    fn unknown_subject_is_none() {
        let vault = Vault::new();
        assert!(vault.latest_record_for_subject("nobody").unwrap().is_none());
    }
}
