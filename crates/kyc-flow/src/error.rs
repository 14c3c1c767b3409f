//! # Flow Error Taxonomy and Terminal Outcomes
//!
//! Every failure a negotiation can hit is a `FlowError` variant, and a
//! flow never lets one escape: the state machine catches it and resolves
//! to `FlowOutcome::Failure(reason)`. External callers always receive a
//! terminal outcome value, never a raw fault.

use thiserror::Error;

use kyc_contract::{ContractError, SignatureCheckError, TransactionId};
use kyc_ledger::{LedgerError, NotaryError};

/// Failure classes of a negotiation flow.
#[derive(Error, Debug)]
pub enum FlowError {
    /// The counterparty name does not resolve to a known identity.
    /// Caller-correctable; reported before any flow instance exists.
    #[error("counterparty identity unknown: {0}")]
    InputRejected(String),

    /// No notary is registered with the network map.
    #[error("no notary available")]
    NoNotaryAvailable,

    /// A named contract rule was violated. Fatal to the negotiation,
    /// never retried automatically.
    #[error(transparent)]
    ContractViolation(#[from] ContractError),

    /// A forged, corrupted, or mismatched transaction was received.
    /// Security-relevant; the observability layer should log it.
    #[error("signature invalid: {0}")]
    SignatureInvalid(String),

    /// The notary refused to finalize — a genuine conflicting concurrent
    /// update or a stale window, not a bug. Fatal for this negotiation.
    #[error("notary rejected: {0}")]
    NotaryRejected(String),

    /// A receive point elapsed without a matching message. Safe to retry
    /// with a fresh flow instance; nothing was recorded.
    #[error("timeout")]
    Timeout,

    /// The peer's session endpoint is gone.
    #[error("peer unreachable")]
    Unreachable,

    /// The peer sent a message of the wrong kind for this suspension
    /// point.
    #[error("unexpected message: expected {expected}")]
    UnexpectedMessage {
        /// The message kind this suspension point awaits.
        expected: &'static str,
    },

    /// Local durable storage failed. Process-fatal in deployment;
    /// surfaced, never swallowed.
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<SignatureCheckError> for FlowError {
    fn from(e: SignatureCheckError) -> Self {
        Self::SignatureInvalid(e.to_string())
    }
}

impl From<NotaryError> for FlowError {
    fn from(e: NotaryError) -> Self {
        Self::NotaryRejected(e.to_string())
    }
}

impl From<LedgerError> for FlowError {
    fn from(e: LedgerError) -> Self {
        Self::Storage(e.to_string())
    }
}

/// Terminal result of one negotiation flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowOutcome {
    /// The transaction was notarized and recorded.
    Success {
        /// Id of the recorded transaction.
        tx_id: TransactionId,
        /// Human-readable confirmation.
        message: String,
    },
    /// The negotiation aborted; nothing was recorded by this flow.
    Failure {
        /// Why the negotiation failed.
        reason: String,
    },
}

impl FlowOutcome {
    /// Wrap a flow body's result, converting any error into `Failure`.
    pub fn capture(result: Result<TransactionId, FlowError>) -> Self {
        match result {
            Ok(tx_id) => Self::Success {
                message: format!("Transaction id {tx_id} committed to ledger."),
                tx_id,
            },
            Err(e) => Self::Failure {
                reason: e.to_string(),
            },
        }
    }

    /// Whether the negotiation succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// The recorded transaction id, when successful.
    pub fn tx_id(&self) -> Option<TransactionId> {
        match self {
            Self::Success { tx_id, .. } => Some(*tx_id),
            Self::Failure { .. } => None,
        }
    }
}

impl std::fmt::Display for FlowOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success { message, .. } => write!(f, "Success({message})"),
            Self::Failure { reason } => write!(f, "Failure({reason})"),
        }
    }
}
