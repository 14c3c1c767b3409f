//! Contract-layer errors and the named rule texts the clause engine
//! reports. A violation always carries the specific rule that failed,
//! never a generic message.

use thiserror::Error;

use kyc_core::error::CanonicalizationError;

/// The rule texts enforced by the Place clause.
///
/// These strings are part of the protocol's observable behavior: both
/// parties report the identical text for the identical violation, and the
/// end-to-end tests assert on them.
pub mod rules {
    /// Issuance consumes nothing; re-issuing an already-placed
    /// relationship is a different transaction shape.
    pub const NO_INPUTS_ON_ISSUE: &str = "no inputs should be consumed when issuing a kyc record";
    /// One logical relationship, one new version.
    pub const SINGLE_OUTPUT_PER_GROUP: &str = "only one output state should be created for each group";
    /// A party cannot attest its own KYC record.
    pub const DISTINCT_PARTIES: &str = "the buyer and the seller cannot be the same entity";
    /// Both owning keys must appear in the command's signer set.
    pub const PARTICIPANTS_MUST_SIGN: &str = "all of the participants must be signers";
    /// The Place clause is only selectable when a Place command is present.
    pub const SINGLE_PLACE_COMMAND: &str = "exactly one place command must be present";
    /// Every command on the transaction must be claimed by some clause.
    pub const UNMATCHED_COMMANDS: &str = "no clause validated the supplied commands";
}

/// Errors raised by the contract layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContractError {
    /// The transaction carries no validity window.
    #[error("must be timestamped")]
    MissingTimestamp,

    /// A named verification rule was violated.
    #[error("contract violation: {0}")]
    Violation(&'static str),

    /// Canonical serialization of a payload failed.
    #[error("canonicalization error: {0}")]
    Canonicalization(String),
}

impl From<CanonicalizationError> for ContractError {
    fn from(e: CanonicalizationError) -> Self {
        Self::Canonicalization(e.to_string())
    }
}
