//! Errors for the ledger platform services.

use thiserror::Error;

/// Errors from the durable vault.
///
/// Storage failures are the one class the protocol treats as
/// process-fatal rather than negotiation-local; they are surfaced,
/// never swallowed.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// The storage backend failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// A payload could not be canonicalized for id derivation.
    #[error("contract error: {0}")]
    Contract(#[from] kyc_contract::ContractError),
}

/// Rejections from the notary.
///
/// `Conflict` is distinguished from every other failure because it
/// indicates a genuine concurrent update racing over the same prior
/// state, not a bug. No rejection is ever retried automatically.
#[derive(Error, Debug)]
pub enum NotaryError {
    /// An input state was already consumed by a different transaction.
    #[error("input state already consumed by transaction {by}")]
    Conflict {
        /// Hex id of the transaction that consumed the input first.
        by: String,
    },

    /// The transaction carries no validity window.
    #[error("transaction has no validity window")]
    MissingTimeWindow,

    /// The window's midpoint is outside the notary's tolerance of its
    /// own clock.
    #[error("validity window midpoint {midpoint} outside notary tolerance")]
    WindowOutOfTolerance {
        /// The rejected midpoint.
        midpoint: String,
    },

    /// Not every required party has signed.
    #[error("transaction is not fully party-signed: {0}")]
    NotFullySigned(String),

    /// A signature on the submitted transaction failed verification.
    #[error("invalid signature on submitted transaction: {0}")]
    SignatureInvalid(String),

    /// Internal notary state failure.
    #[error("notary state error: {0}")]
    Internal(String),
}
