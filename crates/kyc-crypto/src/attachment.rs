//! # Attachment Store — Content-Addressed Document Blobs
//!
//! A KYC record may bind an external document (a scanned passport, a
//! proof-of-address archive) to the negotiated transaction. The document
//! itself never enters a transaction payload; only its content address
//! does. Both parties can later fetch the bytes and re-derive the id to
//! confirm they hold the same document.
//!
//! ## Security Invariant
//!
//! Identity is the SHA-256 of the bytes. Resolve re-hashes the stored
//! bytes and refuses to return content whose digest no longer matches the
//! requested id — substitution inside the store surfaces as an error, not
//! as silently wrong bytes.

use std::collections::HashMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use kyc_core::ContentDigest;

/// Content address of an attachment: the SHA-256 of its bytes.
///
/// Two uploads of identical bytes always produce the same id. Flows treat
/// the id as an opaque reference bound into transaction metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AttachmentId(pub ContentDigest);

impl AttachmentId {
    /// Compute the attachment id for a byte sequence without storing it.
    pub fn of_bytes(bytes: &[u8]) -> Self {
        Self(ContentDigest::of_bytes(bytes))
    }

    /// Lowercase hex rendering of the underlying digest.
    pub fn to_hex(&self) -> String {
        self.0.to_hex()
    }
}

impl std::fmt::Display for AttachmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "attachment:{}", self.0.to_hex())
    }
}

/// Errors raised by an attachment store.
#[derive(Error, Debug)]
pub enum AttachmentError {
    /// Stored bytes no longer hash to the requested id.
    #[error("attachment integrity violation for {id}: stored bytes hash to {actual}")]
    IntegrityViolation {
        /// The requested attachment id.
        id: AttachmentId,
        /// Hex digest of what the store actually holds.
        actual: String,
    },
}

/// Store and resolve operations over content-addressed attachments.
///
/// `upload` is idempotent: uploading identical bytes twice yields the same
/// id and the second call must not error.
pub trait AttachmentStore: Send + Sync {
    /// Store a document, returning its content address.
    fn upload(&self, bytes: &[u8]) -> AttachmentId;

    /// Fetch a document by content address, verifying integrity.
    ///
    /// Returns `Ok(None)` when the id is unknown to this store.
    fn resolve(&self, id: &AttachmentId) -> Result<Option<Vec<u8>>, AttachmentError>;
}

/// In-memory attachment store shared by the nodes of one process.
#[derive(Debug, Default)]
pub struct InMemoryAttachmentStore {
    blobs: Mutex<HashMap<AttachmentId, Vec<u8>>>,
}

impl InMemoryAttachmentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct attachments held.
    pub fn len(&self) -> usize {
        self.blobs.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Whether the store holds no attachments.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AttachmentStore for InMemoryAttachmentStore {
    fn upload(&self, bytes: &[u8]) -> AttachmentId {
        let id = AttachmentId::of_bytes(bytes);
        let mut blobs = self.blobs.lock().unwrap_or_else(|e| e.into_inner());
        // Idempotent: identical bytes land under the identical key.
        if blobs.insert(id, bytes.to_vec()).is_none() {
            debug!(%id, size = bytes.len(), "attachment stored");
        }
        id
    }

    fn resolve(&self, id: &AttachmentId) -> Result<Option<Vec<u8>>, AttachmentError> {
        let blobs = self.blobs.lock().unwrap_or_else(|e| e.into_inner());
        match blobs.get(id) {
            None => Ok(None),
            Some(bytes) => {
                let actual = AttachmentId::of_bytes(bytes);
                if actual != *id {
                    return Err(AttachmentError::IntegrityViolation {
                        id: *id,
                        actual: actual.to_hex(),
                    });
                }
                Ok(Some(bytes.clone()))
            }
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// upload(b) == upload(b) for arbitrary byte sequences.
        #[test]
        fn upload_idempotent(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
            let store = InMemoryAttachmentStore::new();
            prop_assert_eq!(store.upload(&bytes), store.upload(&bytes));
        }

        /// Distinct byte sequences get distinct ids.
        #[test]
        fn distinct_inputs_distinct_ids(
            a in prop::collection::vec(any::<u8>(), 0..256),
            b in prop::collection::vec(any::<u8>(), 0..256),
        ) {
            prop_assume!(a != b);
            let store = InMemoryAttachmentStore::new();
            prop_assert_ne!(store.upload(&a), store.upload(&b));
        }

        /// Resolve round-trips the exact uploaded bytes.
        #[test]
        fn resolve_roundtrip(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
            let store = InMemoryAttachmentStore::new();
            let id = store.upload(&bytes);
            prop_assert_eq!(store.resolve(&id).unwrap().unwrap(), bytes);
        }
    }
}
