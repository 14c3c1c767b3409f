//! # Ed25519 Signing and Verification
//!
//! Key generation, signing, and verification for party and notary
//! signatures. A signature in the negotiation protocol is always over a
//! transaction id — the SHA-256 content digest of the canonical payload —
//! so the signable input type is `ContentDigest`, never raw bytes.
//!
//! ## Security Invariant
//!
//! - Private keys are never serialized or logged. `Ed25519KeyPair` does
//!   not implement `Serialize` and its `Debug` output is redacted.
//! - Public keys and signatures serialize as hex strings for JSON
//!   interoperability.

use ed25519_dalek::{Signer, Verifier};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use kyc_core::ContentDigest;

/// Error in cryptographic operations.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// Signature verification failed.
    #[error("signature verification failed: {0}")]
    VerificationFailed(String),

    /// Key generation or parsing failed.
    #[error("key error: {0}")]
    KeyError(String),
}

/// An Ed25519 public key (32 bytes), the owning key of a party.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ed25519PublicKey(pub [u8; 32]);

/// An Ed25519 signature (64 bytes) over a transaction id.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Ed25519Signature(pub [u8; 64]);

/// An Ed25519 key pair for signing operations.
///
/// Does not implement `Serialize` — key material must not leak into
/// logs, wire messages, or persisted transactions.
pub struct Ed25519KeyPair {
    signing_key: ed25519_dalek::SigningKey,
}

impl Ed25519PublicKey {
    /// Create a public key from raw 32 bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// The raw 32-byte public key.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex rendering.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Parse from a 64-character hex string.
    pub fn from_hex(hex: &str) -> Result<Self, CryptoError> {
        let bytes = hex_to_array::<32>(hex)
            .map_err(CryptoError::KeyError)?;
        Ok(Self(bytes))
    }

    fn to_verifying_key(self) -> Result<ed25519_dalek::VerifyingKey, CryptoError> {
        ed25519_dalek::VerifyingKey::from_bytes(&self.0)
            .map_err(|e| CryptoError::KeyError(format!("invalid public key: {e}")))
    }
}

impl Serialize for Ed25519PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Ed25519PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Self::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Debug for Ed25519PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ed25519PublicKey({}...)", hex_prefix(&self.0))
    }
}

impl std::fmt::Display for Ed25519PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Ed25519Signature {
    /// Create a signature from raw 64 bytes.
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// The raw 64-byte signature.
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// Lowercase hex rendering.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Parse from a 128-character hex string.
    pub fn from_hex(hex: &str) -> Result<Self, CryptoError> {
        let bytes = hex_to_array::<64>(hex)
            .map_err(CryptoError::VerificationFailed)?;
        Ok(Self(bytes))
    }
}

impl Serialize for Ed25519Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Ed25519Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Self::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Debug for Ed25519Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ed25519Signature({}...)", hex_prefix(&self.0))
    }
}

impl Ed25519KeyPair {
    /// Generate a new random key pair.
    pub fn generate() -> Self {
        let mut csprng = rand::rngs::OsRng;
        Self {
            signing_key: ed25519_dalek::SigningKey::generate(&mut csprng),
        }
    }

    /// Deterministic key pair from a 32-byte seed (tests, fixtures).
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: ed25519_dalek::SigningKey::from_bytes(seed),
        }
    }

    /// The public key of this pair.
    pub fn public_key(&self) -> Ed25519PublicKey {
        Ed25519PublicKey(self.signing_key.verifying_key().to_bytes())
    }

    /// Sign a transaction id.
    ///
    /// The digest itself was computed over canonical payload bytes, so the
    /// signed message is canonical by construction.
    pub fn sign(&self, digest: &ContentDigest) -> Ed25519Signature {
        let sig = self.signing_key.sign(&digest.bytes);
        Ed25519Signature(sig.to_bytes())
    }
}

impl std::fmt::Debug for Ed25519KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ed25519KeyPair(<private>)")
    }
}

/// Verify an Ed25519 signature over a transaction id.
pub fn verify(
    digest: &ContentDigest,
    signature: &Ed25519Signature,
    verifying_key: &ed25519_dalek::VerifyingKey,
) -> Result<(), CryptoError> {
    let sig = ed25519_dalek::Signature::from_bytes(&signature.0);
    verifying_key
        .verify(&digest.bytes, &sig)
        .map_err(|e| CryptoError::VerificationFailed(format!("ed25519 verification failed: {e}")))
}

/// Verification from a wrapped public key instead of a dalek key.
pub fn verify_with_public_key(
    digest: &ContentDigest,
    signature: &Ed25519Signature,
    public_key: &Ed25519PublicKey,
) -> Result<(), CryptoError> {
    let vk = public_key.to_verifying_key()?;
    verify(digest, signature, &vk)
}

fn hex_prefix(bytes: &[u8]) -> String {
    bytes.iter().take(4).map(|b| format!("{b:02x}")).collect()
}

fn hex_to_array<const N: usize>(hex: &str) -> Result<[u8; N], String> {
    let hex = hex.trim().to_lowercase();
    // Reject non-ASCII before slicing; byte offsets must be char
    // boundaries.
    if !hex.is_ascii() {
        return Err("hex must be ascii".to_string());
    }
    if hex.len() != N * 2 {
        return Err(format!("hex must be {} chars, got {}", N * 2, hex.len()));
    }
    let mut out = [0u8; N];
    for (i, byte) in out.iter_mut().enumerate() {
        let pos = i * 2;
        *byte = u8::from_str_radix(&hex[pos..pos + 2], 16)
            .map_err(|e| format!("invalid hex at position {pos}: {e}"))?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digest_of(label: &str) -> ContentDigest {
        ContentDigest::of_bytes(label.as_bytes())
    }

    #[test]
    fn sign_and_verify() {
        let kp = Ed25519KeyPair::generate();
        let d = digest_of("tx-payload");
        let sig = kp.sign(&d);
        verify_with_public_key(&d, &sig, &kp.public_key()).expect("valid signature verifies");
    }

    #[test]
    fn verify_wrong_key_fails() {
        let kp1 = Ed25519KeyPair::generate();
        let kp2 = Ed25519KeyPair::generate();
        let d = digest_of("tx-payload");
        let sig = kp1.sign(&d);
        assert!(verify_with_public_key(&d, &sig, &kp2.public_key()).is_err());
    }

    #[test]
    fn verify_wrong_digest_fails() {
        let kp = Ed25519KeyPair::generate();
        let sig = kp.sign(&digest_of("original"));
        assert!(verify_with_public_key(&digest_of("tampered"), &sig, &kp.public_key()).is_err());
    }

    #[test]
    fn deterministic_from_seed() {
        let seed = [7u8; 32];
        let kp1 = Ed25519KeyPair::from_seed(&seed);
        let kp2 = Ed25519KeyPair::from_seed(&seed);
        assert_eq!(kp1.public_key(), kp2.public_key());
        let d = digest_of("same message");
        assert_eq!(kp1.sign(&d), kp2.sign(&d));
    }

    #[test]
    fn public_key_hex_roundtrip() {
        let pk = Ed25519KeyPair::generate().public_key();
        assert_eq!(Ed25519PublicKey::from_hex(&pk.to_hex()).unwrap(), pk);
    }

    #[test]
    fn signature_serde_roundtrip() {
        let kp = Ed25519KeyPair::generate();
        let sig = kp.sign(&digest_of("x"));
        let json = serde_json::to_string(&sig).unwrap();
        assert_eq!(json.len(), 128 + 2);
        let back: Ed25519Signature = serde_json::from_str(&json).unwrap();
        assert_eq!(sig, back);
    }

    #[test]
    fn invalid_hex_rejected() {
        assert!(Ed25519PublicKey::from_hex("not-hex").is_err());
        assert!(Ed25519Signature::from_hex(&"zz".repeat(64)).is_err());
    }

    #[test]
    fn multibyte_hex_rejected_not_panicked() {
        // 64 bytes with a two-byte char inside; a slice at a non-char
        // boundary would panic, the parser must error instead.
        let crafted = format!("a\u{c9}{}", "a".repeat(61));
        assert_eq!(crafted.len(), 64);
        assert!(Ed25519PublicKey::from_hex(&crafted).is_err());
        let crafted_sig = format!("a\u{c9}{}", "a".repeat(125));
        assert_eq!(crafted_sig.len(), 128);
        assert!(Ed25519Signature::from_hex(&crafted_sig).is_err());
    }

    #[test]
    fn deserialize_multibyte_key_is_typed_error() {
        // Malformed wire input surfaces as a serde error, never a crash.
        let json = format!("\"a\u{c9}{}\"", "a".repeat(61));
        assert!(serde_json::from_str::<Ed25519PublicKey>(&json).is_err());
    }

    #[test]
    fn debug_does_not_leak_private_key() {
        let kp = Ed25519KeyPair::generate();
        assert_eq!(format!("{kp:?}"), "Ed25519KeyPair(<private>)");
    }
}
