//! # kyc-flow — The Two-Party Negotiation Protocol
//!
//! Drives a KYC record from proposal to notarized, vault-recorded
//! transaction between two parties:
//!
//! - **Initiator** constructs the offer, collects the counterparty's
//!   signature, co-signs, obtains notarization, records, and forwards the
//!   finalized transaction.
//! - **Acceptor** re-derives the transaction from the proposed state,
//!   verifies it through the clause engine before signing, and records
//!   its own copy once the notarized transaction returns.
//!
//! Both roles are sequential state machines over a correlated [`Session`]
//! pair; each publishes its progress on a watch channel. Every failure
//! resolves to a terminal [`FlowOutcome`], never a raw error, and a
//! failed negotiation leaves both vaults untouched.
//!
//! ## Security Invariants
//!
//! - The acceptor signs only its own derivation of the transaction,
//!   never initiator-supplied bytes.
//! - Contract verification runs on both sides before their respective
//!   signatures are produced or accepted.
//! - Messages from concurrent negotiations cannot cross-deliver; each
//!   session pair is private to one negotiation.

pub mod acceptor;
pub mod error;
pub mod initiator;
pub mod message;
pub mod node;
pub mod session;
pub mod stage;

pub use acceptor::AcceptorFlow;
pub use error::{FlowError, FlowOutcome};
pub use initiator::InitiatorFlow;
pub use message::{FlowMessage, ProposalMessage};
pub use node::{Network, Node, DEFAULT_FLOW_TIMEOUT};
pub use session::{session_pair, Session};
pub use stage::{AcceptorStage, InitiatorStage, StageTracker};
