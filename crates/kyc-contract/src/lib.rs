//! # kyc-contract — Record Model, Transactions, and Verification Clauses
//!
//! The contract layer of the KYC ledger. It owns:
//!
//! - **`KycRecord`** — the immutable KYC fact about a subject.
//! - **`LedgerState`** — a record bound to its two owning parties and a
//!   linear identifier; the unit the clause engine groups over.
//! - **The transaction maturity ladder** — an unsigned payload acquires
//!   party signatures one at a time, then the notary's; every level is a
//!   new immutable value, signatures are never removed or replaced.
//! - **The verification clause engine** — a tree of composable clause
//!   combinators evaluated by a single interpreter. Verification is
//!   deterministic and side-effect-free, re-runnable by either party and
//!   by any auditor replaying the ledger.
//!
//! ## Crate Policy
//!
//! - No I/O, no clocks, no channels. Everything here is pure data and
//!   pure functions over it; the flow layer supplies time and transport.

pub mod clause;
pub mod error;
pub mod record;
pub mod state;
pub mod transaction;

pub use clause::{verify_transaction, Clause, StateGroup};
pub use error::{rules, ContractError};
pub use record::KycRecord;
pub use state::{LedgerState, Party};
pub use transaction::{
    build_agreement, Command, CommandValue, ConsumedState, PartySignature, SignatureCheckError,
    SignedTransaction, StateRef, TransactionId, TransactionPayload,
};
