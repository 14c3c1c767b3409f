//! # Wire Messages Between Negotiation Peers
//!
//! The protocol defines message content and ordering only; framing and
//! transport belong to the messaging layer. Three message kinds flow
//! through a session, always in the same order: a proposal travels from
//! initiator to acceptor, a partially-signed transaction comes back, and
//! the notarized transaction closes the exchange.

use serde::{Deserialize, Serialize};

use kyc_contract::{LedgerState, Party, SignedTransaction};
use kyc_crypto::AttachmentId;

/// The initiator's opening offer: the proposed ledger state, the notary
/// that will finalize it, and an optional bound document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalMessage {
    /// The state the initiator wants placed on the ledger.
    pub state: LedgerState,
    /// The notary whose signature will finalize the transaction.
    pub notary: Party,
    /// Content address of a document bound to the record, if any.
    pub attachment: Option<AttachmentId>,
}

/// A message exchanged inside one negotiation session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowMessage {
    /// Initiator → acceptor: the opening proposal.
    Proposal(ProposalMessage),
    /// Acceptor → initiator: the transaction carrying the acceptor's
    /// signature.
    PartiallySigned(SignedTransaction),
    /// Initiator → acceptor: the fully notarized transaction.
    Notarized(SignedTransaction),
}

impl FlowMessage {
    /// The kind name, used in unexpected-message errors and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Proposal(_) => "Proposal",
            Self::PartiallySigned(_) => "PartiallySigned",
            Self::Notarized(_) => "Notarized",
        }
    }
}
