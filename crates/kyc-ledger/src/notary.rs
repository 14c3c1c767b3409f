//! # The Uniqueness/Timestamp Notary
//!
//! The neutral third party that finalizes every negotiated transaction.
//! It guarantees exactly two things:
//!
//! 1. **Uniqueness** — no input state reference is ever consumed by two
//!    different transactions. Of two racing updates over the same prior
//!    version, exactly one receives the notary signature.
//! 2. **Timestamp ordering** — the transaction's validity window midpoint
//!    must fall within the notary's tolerance of its own clock.
//!
//! The notary validates party signatures before signing but never runs
//! contract verification — the parties own that. Its consensus internals
//! are out of scope; `SimpleNotary` is a single-process stand-in with the
//! same observable contract.

use std::collections::HashMap;
use std::sync::Mutex;

use tracing::{info, warn};

use kyc_contract::{Party, SignedTransaction, StateRef, TransactionId};
use kyc_core::Timestamp;
use kyc_crypto::Ed25519KeyPair;

use crate::error::NotaryError;

/// The notary seam the flows depend on.
///
/// `notarize` is submit-and-wait from the flow's perspective; rejections
/// are final and never retried automatically.
pub trait NotaryService: Send + Sync {
    /// The notary's public identity, checked by the initiator against
    /// the payload's declared notary.
    fn identity(&self) -> Party;

    /// Append the uniqueness/timestamp signature, or reject.
    fn notarize(&self, stx: &SignedTransaction) -> Result<SignedTransaction, NotaryError>;
}

/// In-process notary with a consumed-input ledger behind a mutex.
pub struct SimpleNotary {
    keypair: Ed25519KeyPair,
    name: String,
    consumed: Mutex<HashMap<StateRef, TransactionId>>,
}

impl SimpleNotary {
    /// Stand up a notary under the given service name with a fresh key.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            keypair: Ed25519KeyPair::generate(),
            name: name.into(),
            consumed: Mutex::new(HashMap::new()),
        }
    }

    /// Check every signer demanded by the commands has a valid signature.
    fn check_fully_signed(&self, stx: &SignedTransaction) -> Result<(), NotaryError> {
        let required: Vec<_> = stx
            .payload
            .commands
            .iter()
            .flat_map(|c| c.signers.iter().copied())
            .collect();
        stx.verify_signatures(&required)
            .map_err(|e| match e {
                kyc_contract::SignatureCheckError::Missing { .. } => {
                    NotaryError::NotFullySigned(e.to_string())
                }
                other => NotaryError::SignatureInvalid(other.to_string()),
            })
    }
}

impl std::fmt::Debug for SimpleNotary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SimpleNotary({})", self.name)
    }
}

impl NotaryService for SimpleNotary {
    fn identity(&self) -> Party {
        Party::new(self.name.clone(), self.keypair.public_key())
    }

    fn notarize(&self, stx: &SignedTransaction) -> Result<SignedTransaction, NotaryError> {
        let id = stx
            .id()
            .map_err(|e| NotaryError::Internal(e.to_string()))?;

        self.check_fully_signed(stx)?;

        let window = stx
            .payload
            .time_window
            .ok_or(NotaryError::MissingTimeWindow)?;
        let now = Timestamp::now();
        if !window.contains(&now) {
            warn!(tx = %id, midpoint = %window.midpoint, "window outside tolerance");
            return Err(NotaryError::WindowOutOfTolerance {
                midpoint: window.midpoint.to_iso8601(),
            });
        }

        // Uniqueness: check-then-mark under one lock acquisition so two
        // racing transactions cannot both pass the check.
        let mut consumed = self
            .consumed
            .lock()
            .map_err(|_| NotaryError::Internal("consumed-set lock poisoned".into()))?;
        for input in &stx.payload.inputs {
            if let Some(prior) = consumed.get(&input.state_ref) {
                if *prior != id {
                    warn!(tx = %id, conflicting = %prior, "double consumption rejected");
                    return Err(NotaryError::Conflict {
                        by: prior.to_hex(),
                    });
                }
            }
        }
        for input in &stx.payload.inputs {
            consumed.insert(input.state_ref.clone(), id);
        }
        drop(consumed);

        info!(tx = %id, "notarized");
        stx.plus_signature(&self.keypair)
            .map_err(|e| NotaryError::Internal(e.to_string()))
    }
}
