//! # kyc-ledger — Platform Services Behind the Negotiation Flows
//!
//! The services a negotiation flow calls into but does not own:
//!
//! - **Identity directory** — resolves counterparty names to party
//!   identities before a flow is ever started.
//! - **Notary** — the neutral third party granting uniqueness (no input
//!   state is ever consumed twice) and timestamp ordering.
//! - **Vault** — durable, idempotent per-transaction-id storage with a
//!   linear-id index and the "most recent record for subject" read path.
//!
//! The implementations here are in-process; the flow layer depends only
//! on the `NotaryService` trait and the concrete `Vault`/`IdentityDirectory`
//! handles, so a networked deployment swaps services without touching the
//! protocol.

pub mod directory;
pub mod error;
pub mod notary;
pub mod vault;

pub use directory::IdentityDirectory;
pub use error::{LedgerError, NotaryError};
pub use notary::{NotaryService, SimpleNotary};
pub use vault::Vault;
