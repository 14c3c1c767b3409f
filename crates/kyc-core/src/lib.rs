//! # kyc-core — Foundational Types for the KYC Ledger
//!
//! This crate is the bedrock of the KYC ledger workspace. It defines the
//! type-system primitives every other crate builds on; it depends on
//! nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** `PartyName`, `SubjectId`,
//!    `LinearId`, `SessionId` — all newtypes. No bare strings for
//!    identifiers.
//!
//! 2. **`CanonicalBytes` newtype.** All digest computation and signing
//!    flows through `CanonicalBytes::new()`. No raw `serde_json::to_vec()`
//!    for digests, ever. Two nodes that independently serialize the same
//!    transaction payload must produce byte-identical input to the hash.
//!
//! 3. **UTC-only timestamps.** `Timestamp` enforces UTC with Z suffix and
//!    seconds precision; `TimeWindow` models the notary's timestamp
//!    tolerance around a midpoint.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `kyc-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod digest;
pub mod error;
pub mod identity;
pub mod temporal;

pub use canonical::CanonicalBytes;
pub use digest::{sha256_digest, sha256_hex, ContentDigest, DigestAlgorithm};
pub use error::CoreError;
pub use identity::{LinearId, PartyName, SessionId, SubjectId};
pub use temporal::{TimeWindow, Timestamp};
