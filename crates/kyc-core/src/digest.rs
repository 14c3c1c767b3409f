//! # Content Digest — Content-Addressed Identifiers
//!
//! `ContentDigest` is the identity of everything content-addressed in the
//! ledger: transaction ids are digests of canonical payload bytes, and
//! attachment ids are digests of the attached document bytes.
//!
//! ## Security Invariant
//!
//! `sha256_digest()` accepts only `&CanonicalBytes`, so every digest in the
//! system is computed over canonicalized input. Attachments are the one
//! deliberate exception — their identity is the hash of the raw document
//! bytes, computed via [`ContentDigest::of_bytes`].

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::canonical::CanonicalBytes;
use crate::error::CoreError;

/// The hash algorithm used to produce a content digest.
///
/// SHA-256 only for now; the tag exists so persisted digests remain
/// self-describing if another algorithm is ever admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DigestAlgorithm {
    /// SHA-256 — standard content addressing.
    Sha256,
}

impl DigestAlgorithm {
    /// The algorithm identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
        }
    }
}

impl std::fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A content-addressed digest with its algorithm tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContentDigest {
    /// The hash algorithm that produced this digest.
    pub algorithm: DigestAlgorithm,
    /// The raw 32-byte digest value.
    pub bytes: [u8; 32],
}

impl ContentDigest {
    /// Create a content digest from raw bytes and algorithm.
    ///
    /// Prefer [`sha256_digest()`] for digests over canonical payloads.
    pub fn new(algorithm: DigestAlgorithm, bytes: [u8; 32]) -> Self {
        Self { algorithm, bytes }
    }

    /// Hash raw (non-canonical) bytes — the attachment identity path.
    ///
    /// Document blobs are opaque; their identity is the hash of the bytes
    /// as uploaded, with no serialization step in between.
    pub fn of_bytes(data: &[u8]) -> Self {
        let hash = Sha256::digest(data);
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&hash);
        Self::new(DigestAlgorithm::Sha256, bytes)
    }

    /// Render the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Parse a digest from a 64-character hex string.
    pub fn from_hex(hex: &str) -> Result<Self, CoreError> {
        let hex = hex.trim().to_lowercase();
        // Reject non-ASCII before slicing; byte offsets must be char
        // boundaries.
        if !hex.is_ascii() {
            return Err(CoreError::InvalidIdentifier(
                "digest hex must be ascii".into(),
            ));
        }
        if hex.len() != 64 {
            return Err(CoreError::InvalidIdentifier(format!(
                "digest hex must be 64 chars, got {}",
                hex.len()
            )));
        }
        let mut bytes = [0u8; 32];
        for (i, chunk) in bytes.iter_mut().enumerate() {
            let pos = i * 2;
            *chunk = u8::from_str_radix(&hex[pos..pos + 2], 16).map_err(|e| {
                CoreError::InvalidIdentifier(format!("invalid hex at position {pos}: {e}"))
            })?;
        }
        Ok(Self::new(DigestAlgorithm::Sha256, bytes))
    }
}

impl std::fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.to_hex())
    }
}

/// Compute a SHA-256 content digest from canonical bytes.
pub fn sha256_digest(data: &CanonicalBytes) -> ContentDigest {
    ContentDigest::of_bytes(data.as_bytes())
}

/// Compute a SHA-256 hex string from canonical bytes.
pub fn sha256_hex(data: &CanonicalBytes) -> String {
    sha256_digest(data).to_hex()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_deterministic() {
        let cb = CanonicalBytes::new(&serde_json::json!({"a": 1, "b": 2})).unwrap();
        assert_eq!(sha256_digest(&cb), sha256_digest(&cb));
    }

    #[test]
    fn different_inputs_different_digests() {
        let cb1 = CanonicalBytes::new(&serde_json::json!({"a": 1})).unwrap();
        let cb2 = CanonicalBytes::new(&serde_json::json!({"a": 2})).unwrap();
        assert_ne!(sha256_digest(&cb1), sha256_digest(&cb2));
    }

    #[test]
    fn known_sha256_vector() {
        // SHA256 of "{}" — verified against sha256sum.
        let cb = CanonicalBytes::new(&serde_json::json!({})).unwrap();
        assert_eq!(
            sha256_hex(&cb),
            "44136fa355b3678a1146ad16f7e8649e94fb4fc21fe77e8310c060f61caaff8a"
        );
    }

    #[test]
    fn display_prefixed_with_algorithm() {
        let cb = CanonicalBytes::new(&serde_json::json!({"a": 1})).unwrap();
        let s = sha256_digest(&cb).to_string();
        assert!(s.starts_with("sha256:"));
        assert_eq!(s.len(), 7 + 64);
    }

    #[test]
    fn hex_roundtrip() {
        let d = ContentDigest::of_bytes(b"some document bytes");
        let d2 = ContentDigest::from_hex(&d.to_hex()).unwrap();
        assert_eq!(d, d2);
    }

    #[test]
    fn from_hex_rejects_bad_input() {
        assert!(ContentDigest::from_hex("abc").is_err());
        assert!(ContentDigest::from_hex(&"zz".repeat(32)).is_err());
    }

    #[test]
    fn from_hex_rejects_multibyte_utf8() {
        // 64 bytes, but the second char is two bytes wide; must error,
        // never panic on a slice boundary.
        let crafted = format!("a\u{c9}{}", "a".repeat(61));
        assert_eq!(crafted.len(), 64);
        assert!(ContentDigest::from_hex(&crafted).is_err());
    }

    #[test]
    fn digests_order_by_bytes() {
        let a = ContentDigest::new(DigestAlgorithm::Sha256, [0u8; 32]);
        let b = ContentDigest::new(DigestAlgorithm::Sha256, [1u8; 32]);
        assert!(a < b);
        let set: std::collections::BTreeSet<_> = [b, a, b].into_iter().collect();
        assert_eq!(set.len(), 2);
    }
}
