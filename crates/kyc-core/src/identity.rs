//! # Domain Identity Newtypes
//!
//! Newtype wrappers for the identifiers of the KYC ledger. Type-level
//! distinction between identifier namespaces means a `SubjectId` can never
//! be passed where a `SessionId` is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The legal name of a negotiating party (e.g., a bank), as registered in
/// the identity directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartyName(pub String);

/// The user id of a KYC subject (the person the record is about).
///
/// Read-path lookups match subject ids case-insensitively; the original
/// casing is preserved for display.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubjectId(pub String);

/// The stable logical identity of one KYC relationship.
///
/// Every version of the same relationship carries the same `LinearId`:
/// an update consumes the previous ledger state and produces a new one
/// under the identical linear id, while the physical transaction id
/// changes with every update. The external id carries the human-facing
/// record id; the UUID guarantees global uniqueness.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LinearId {
    /// Human-facing reference, here the numeric record id as a string.
    pub external_id: String,
    /// Globally unique component.
    pub id: Uuid,
}

/// Correlation key for one negotiation instance.
///
/// Messages are delivered per-session; two concurrent negotiations between
/// the same pair of parties never cross-deliver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl PartyName {
    /// Wrap a party name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl SubjectId {
    /// Wrap a subject user id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive equality, the read-path matching rule.
    pub fn matches(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}

impl LinearId {
    /// Mint a fresh linear id for a new logical relationship.
    pub fn new(external_id: impl Into<String>) -> Self {
        Self {
            external_id: external_id.into(),
            id: Uuid::new_v4(),
        }
    }
}

impl SessionId {
    /// Mint a fresh session correlation id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PartyName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Display for SubjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Display for LinearId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.external_id, self.id)
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "session:{}", self.0)
    }
}
