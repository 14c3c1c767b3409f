//! # Transaction Maturity Ladder
//!
//! A transaction moves through well-defined maturity levels: unsigned
//! payload → partially signed → fully party-signed → notarized. Each
//! level is a new immutable value carrying the prior payload plus one
//! additional signature — signatures are never removed or replaced.
//!
//! The transaction id is the SHA-256 digest of the canonical payload
//! bytes. Both parties re-derive it independently from the payload they
//! hold, so a signature over the id commits the signer to every field of
//! the payload.

use rand::Rng;
use serde::{Deserialize, Serialize};

use kyc_core::{sha256_digest, CanonicalBytes, ContentDigest, TimeWindow};
use kyc_crypto::{verify_with_public_key, AttachmentId, Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};

use crate::error::ContractError;
use crate::state::{LedgerState, Party};

/// Physical identity of a transaction: the digest of its canonical payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TransactionId(pub ContentDigest);

impl TransactionId {
    /// Lowercase hex rendering.
    pub fn to_hex(&self) -> String {
        self.0.to_hex()
    }
}

impl std::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Reference to the output of a prior transaction, the unit of
/// consumption the notary guards against double-spending.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StateRef {
    /// The transaction that produced the state.
    pub tx_id: TransactionId,
    /// Index into that transaction's outputs.
    pub index: u32,
}

/// An input to a transaction: the consumed reference together with the
/// resolved state, so verification needs no vault lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumedState {
    /// Where the state was produced.
    pub state_ref: StateRef,
    /// The state being consumed.
    pub state: LedgerState,
}

/// The intent of a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandValue {
    /// Place a KYC record on the ledger (issuance).
    ///
    /// The nonce keeps two issuances of byte-identical records from
    /// colliding on the same transaction id.
    Place {
        /// Random discriminator.
        nonce: u64,
    },
}

/// A command: an intent plus the keys required to sign for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    /// What the transaction intends.
    pub value: CommandValue,
    /// Every key that must sign the transaction.
    pub signers: Vec<Ed25519PublicKey>,
}

impl Command {
    /// A Place command over the given signer set, with a fresh nonce.
    pub fn place(signers: Vec<Ed25519PublicKey>) -> Self {
        // JCS numbers must stay within IEEE double precision, so the
        // nonce is capped at 53 bits.
        let nonce = rand::thread_rng().gen::<u64>() >> 11;
        Self {
            value: CommandValue::Place { nonce },
            signers,
        }
    }

    /// Whether this is a Place command.
    pub fn is_place(&self) -> bool {
        matches!(self.value, CommandValue::Place { .. })
    }
}

/// The unsigned content of a transaction — the bottom of the maturity
/// ladder. Immutable once its id has been derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionPayload {
    /// Consumed states (empty for issuance).
    pub inputs: Vec<ConsumedState>,
    /// Produced states.
    pub outputs: Vec<LedgerState>,
    /// The commands and their required signers.
    pub commands: Vec<Command>,
    /// Validity window stamped by the acceptor; checked by the notary
    /// and by the Timestamp clause.
    pub time_window: Option<TimeWindow>,
    /// The notary whose signature finalizes the transaction.
    pub notary: Party,
    /// Optional content address of a bound document.
    pub attachment: Option<AttachmentId>,
}

impl TransactionPayload {
    /// Derive the transaction id from the canonical payload bytes.
    pub fn id(&self) -> Result<TransactionId, ContractError> {
        let canonical = CanonicalBytes::new(self)?;
        Ok(TransactionId(sha256_digest(&canonical)))
    }

    /// Stamp a validity window, producing a new payload (and therefore a
    /// new transaction id).
    pub fn with_time_window(mut self, window: TimeWindow) -> Self {
        self.time_window = Some(window);
        self
    }

    /// Sign the payload, producing the first rung of the signed ladder.
    pub fn sign(self, keypair: &Ed25519KeyPair) -> Result<SignedTransaction, ContractError> {
        let id = self.id()?;
        let signature = PartySignature {
            key: keypair.public_key(),
            signature: keypair.sign(&id.0),
        };
        Ok(SignedTransaction {
            payload: self,
            signatures: vec![signature],
        })
    }
}

/// One signature over a transaction id, tagged with the signing key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartySignature {
    /// The key that produced the signature.
    pub key: Ed25519PublicKey,
    /// Signature over the transaction id bytes.
    pub signature: Ed25519Signature,
}

/// A transaction at any signed maturity level: partially signed, fully
/// party-signed, or notarized. The level is determined by which keys
/// appear in `signatures`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    /// The immutable payload.
    pub payload: TransactionPayload,
    /// Accumulated signatures, in signing order.
    pub signatures: Vec<PartySignature>,
}

impl SignedTransaction {
    /// The transaction id, re-derived from the payload.
    pub fn id(&self) -> Result<TransactionId, ContractError> {
        self.payload.id()
    }

    /// Climb one rung: a new value with one more signature appended.
    ///
    /// Existing signatures are carried over untouched.
    pub fn plus_signature(&self, keypair: &Ed25519KeyPair) -> Result<SignedTransaction, ContractError> {
        let id = self.id()?;
        let mut signatures = self.signatures.clone();
        signatures.push(PartySignature {
            key: keypair.public_key(),
            signature: keypair.sign(&id.0),
        });
        Ok(SignedTransaction {
            payload: self.payload.clone(),
            signatures,
        })
    }

    /// Whether the given key has a signature on this transaction.
    pub fn is_signed_by(&self, key: &Ed25519PublicKey) -> bool {
        self.signatures.iter().any(|s| s.key == *key)
    }

    /// Verify every signature and require that each listed key is present.
    ///
    /// All attached signatures are checked for validity — a surplus
    /// signature that fails to verify is as fatal as a missing required
    /// one, since it means the value was tampered with in transit.
    pub fn verify_signatures(
        &self,
        required: &[Ed25519PublicKey],
    ) -> Result<(), SignatureCheckError> {
        let id = self.id().map_err(|e| SignatureCheckError::Id(e.to_string()))?;
        for sig in &self.signatures {
            verify_with_public_key(&id.0, &sig.signature, &sig.key)
                .map_err(|_| SignatureCheckError::Invalid { key: sig.key })?;
        }
        for key in required {
            if !self.is_signed_by(key) {
                return Err(SignatureCheckError::Missing { key: *key });
            }
        }
        Ok(())
    }
}

/// Outcome of signature verification over a signed transaction.
#[derive(Debug, thiserror::Error)]
pub enum SignatureCheckError {
    /// A signature failed cryptographic verification.
    #[error("invalid signature by {key:?}")]
    Invalid {
        /// The key whose signature failed.
        key: Ed25519PublicKey,
    },
    /// A required signer has not signed.
    #[error("missing required signature by {key:?}")]
    Missing {
        /// The absent key.
        key: Ed25519PublicKey,
    },
    /// The transaction id could not be derived.
    #[error("transaction id derivation failed: {0}")]
    Id(String),
}

/// Construct the agreed transaction shape for placing a ledger state.
///
/// This is the single construction path used by both negotiation roles:
/// the initiator builds its proposal with it, and the acceptor re-derives
/// the transaction from the received state rather than trusting the
/// proposal's shape. Issuance consumes no inputs and produces exactly one
/// output, with both participants in the Place command's signer set.
pub fn build_agreement(
    state: LedgerState,
    notary: Party,
    attachment: Option<AttachmentId>,
) -> TransactionPayload {
    let signers = state.participants();
    TransactionPayload {
        inputs: Vec::new(),
        outputs: vec![state],
        commands: vec![Command::place(signers)],
        time_window: None,
        notary,
        attachment,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::KycRecord;
    use kyc_core::Timestamp;

    fn keypair(seed: u8) -> Ed25519KeyPair {
        Ed25519KeyPair::from_seed(&[seed; 32])
    }

    fn party(name: &str, seed: u8) -> Party {
        Party::new(name, keypair(seed).public_key())
    }

    fn record() -> KycRecord {
        KycRecord::new(
            111,
            "biksen",
            "Jiya Sen",
            "2017-02-09".parse().unwrap(),
            "2019-09-15".parse().unwrap(),
            "A001",
        )
    }

    fn payload() -> TransactionPayload {
        let state = LedgerState::issue(record(), party("BankA", 1), party("BankB", 2)).unwrap();
        build_agreement(state, party("Notary", 3), None)
            .with_time_window(TimeWindow::new(Timestamp::parse("2026-01-15T12:00:00Z").unwrap(), 30))
    }

    #[test]
    fn id_is_stable_for_same_payload() {
        let p = payload();
        assert_eq!(p.id().unwrap(), p.id().unwrap());
    }

    #[test]
    fn nonce_distinguishes_identical_records() {
        // Two independently built agreements over the same record differ
        // in linear id and nonce, so their ids differ.
        assert_ne!(payload().id().unwrap(), payload().id().unwrap());
    }

    #[test]
    fn ladder_accumulates_signatures() {
        let acceptor = keypair(2);
        let initiator = keypair(1);
        let notary = keypair(3);

        let ptx = payload().sign(&acceptor).unwrap();
        assert_eq!(ptx.signatures.len(), 1);

        let vtx = ptx.plus_signature(&initiator).unwrap();
        assert_eq!(vtx.signatures.len(), 2);
        // The earlier signature is carried over untouched.
        assert_eq!(vtx.signatures[0], ptx.signatures[0]);

        let ntx = vtx.plus_signature(&notary).unwrap();
        assert_eq!(ntx.signatures.len(), 3);
        assert!(ntx.is_signed_by(&acceptor.public_key()));
        assert!(ntx.is_signed_by(&initiator.public_key()));
        assert!(ntx.is_signed_by(&notary.public_key()));
    }

    #[test]
    fn verify_signatures_accepts_valid_ladder() {
        let acceptor = keypair(2);
        let initiator = keypair(1);
        let stx = payload().sign(&acceptor).unwrap().plus_signature(&initiator).unwrap();
        stx.verify_signatures(&[acceptor.public_key(), initiator.public_key()])
            .expect("both signatures valid and present");
    }

    #[test]
    fn verify_signatures_rejects_missing_signer() {
        let acceptor = keypair(2);
        let initiator = keypair(1);
        let stx = payload().sign(&acceptor).unwrap();
        let err = stx
            .verify_signatures(&[acceptor.public_key(), initiator.public_key()])
            .unwrap_err();
        assert!(matches!(err, SignatureCheckError::Missing { .. }));
    }

    #[test]
    fn verify_signatures_rejects_tampered_payload() {
        let acceptor = keypair(2);
        let mut stx = payload().sign(&acceptor).unwrap();
        // Mutate the payload after signing; the signature now covers a
        // different transaction id.
        stx.payload.outputs[0].record.user_name = "Someone Else".into();
        let err = stx.verify_signatures(&[acceptor.public_key()]).unwrap_err();
        assert!(matches!(err, SignatureCheckError::Invalid { .. }));
    }

    #[test]
    fn build_agreement_shape() {
        let p = payload();
        assert!(p.inputs.is_empty());
        assert_eq!(p.outputs.len(), 1);
        assert_eq!(p.commands.len(), 1);
        assert!(p.commands[0].is_place());
        assert_eq!(p.commands[0].signers, p.outputs[0].participants());
    }

    #[test]
    fn signed_transaction_serde_roundtrip() {
        let stx = payload().sign(&keypair(2)).unwrap();
        let json = serde_json::to_string(&stx).unwrap();
        let back: SignedTransaction = serde_json::from_str(&json).unwrap();
        assert_eq!(stx, back);
        assert_eq!(stx.id().unwrap(), back.id().unwrap());
    }
}
