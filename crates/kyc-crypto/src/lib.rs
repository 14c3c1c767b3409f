//! # kyc-crypto — Cryptographic Primitives
//!
//! The cryptographic building blocks of the KYC ledger:
//!
//! - **Ed25519** signing and verification. Party signatures over
//!   transaction ids are Ed25519; the notary's uniqueness/timestamp
//!   signature is the same primitive under a different key.
//! - **Attachment store** — content-addressed document blobs. An
//!   attachment's identity is the SHA-256 of its bytes; upload is
//!   idempotent and resolve verifies integrity.
//!
//! ## Crate Policy
//!
//! - Depends only on `kyc-core` internally.
//! - No mocking of cryptographic operations in tests — real Ed25519,
//!   real SHA-256.

pub mod attachment;
pub mod ed25519;

pub use attachment::{AttachmentError, AttachmentId, AttachmentStore, InMemoryAttachmentStore};
pub use ed25519::{verify, verify_with_public_key, Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};
pub use ed25519::CryptoError;
