//! # Ledger State — A Record Bound to Its Owning Parties
//!
//! `LedgerState` wraps one `KycRecord` with the two parties that jointly
//! own it and the linear identifier that names the relationship across
//! versions.
//!
//! ## Invariants
//!
//! - The two owning parties differ. Construction rejects self-dealing,
//!   and because wire payloads are deserialized rather than constructed,
//!   the clause engine re-checks the same rule during verification.
//! - All versions of one logical relationship share one `LinearId`; the
//!   state consumed by an update and the state it produces carry the
//!   identical linear id.

use serde::{Deserialize, Serialize};

use kyc_core::{LinearId, PartyName};
use kyc_crypto::Ed25519PublicKey;

use crate::error::{rules, ContractError};
use crate::record::KycRecord;

/// A negotiating party: a registered legal name and its owning key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Party {
    /// The party's registered legal name.
    pub name: PartyName,
    /// The party's Ed25519 owning key.
    pub key: Ed25519PublicKey,
}

impl Party {
    /// Assemble a party identity.
    pub fn new(name: impl Into<String>, key: Ed25519PublicKey) -> Self {
        Self {
            name: PartyName::new(name),
            key,
        }
    }
}

impl std::fmt::Display for Party {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name.as_str())
    }
}

/// One version of a KYC relationship as it appears on the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerState {
    /// The KYC fact.
    pub record: KycRecord,
    /// The party requesting the record (initiating node).
    pub buyer: Party,
    /// The party attesting the record (counterparty node).
    pub seller: Party,
    /// Stable identity of the relationship across versions.
    pub linear_id: LinearId,
}

impl LedgerState {
    /// Build the initial version of a relationship, minting a fresh
    /// linear id from the record's numeric id.
    ///
    /// # Errors
    ///
    /// Rejects `buyer == seller` — a party cannot attest its own record.
    pub fn issue(record: KycRecord, buyer: Party, seller: Party) -> Result<Self, ContractError> {
        let linear_id = LinearId::new(record.kyc_id.to_string());
        Self::with_linear_id(record, buyer, seller, linear_id)
    }

    /// Build a successor version under an existing linear id (an update
    /// consuming the previous version).
    pub fn with_linear_id(
        record: KycRecord,
        buyer: Party,
        seller: Party,
        linear_id: LinearId,
    ) -> Result<Self, ContractError> {
        if buyer == seller {
            return Err(ContractError::Violation(rules::DISTINCT_PARTIES));
        }
        Ok(Self {
            record,
            buyer,
            seller,
            linear_id,
        })
    }

    /// The owning keys of both parties, in buyer/seller order.
    ///
    /// Every participant must appear in the signer set of the Place
    /// command for the transaction to verify.
    pub fn participants(&self) -> Vec<Ed25519PublicKey> {
        vec![self.buyer.key, self.seller.key]
    }

    /// Whether the given key belongs to one of the owning parties.
    pub fn is_participant(&self, key: &Ed25519PublicKey) -> bool {
        self.buyer.key == *key || self.seller.key == *key
    }
}
