//! # Identity Directory
//!
//! Resolves registered party names to their identities. An unknown
//! counterparty name is caller-correctable input: the service rejects it
//! before any flow instance exists, so nothing is signed or persisted.

use std::collections::BTreeMap;

use kyc_contract::Party;
use kyc_core::PartyName;

/// A registry of the parties known to this node.
///
/// Lookups are case-insensitive on the registered name.
#[derive(Debug, Default, Clone)]
pub struct IdentityDirectory {
    parties: BTreeMap<String, Party>,
}

impl IdentityDirectory {
    /// An empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a party under its legal name. Re-registration replaces
    /// the previous entry.
    pub fn register(&mut self, party: Party) {
        self.parties
            .insert(party.name.as_str().to_lowercase(), party);
    }

    /// Resolve a name to a party identity, or `None` when unknown.
    pub fn resolve(&self, name: &str) -> Option<Party> {
        self.parties.get(&name.to_lowercase()).cloned()
    }

    /// All registered names except the caller's own.
    pub fn peers(&self, me: &PartyName) -> Vec<PartyName> {
        self.parties
            .values()
            .filter(|p| p.name != *me)
            .map(|p| p.name.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kyc_crypto::Ed25519KeyPair;

    fn party(name: &str, seed: u8) -> Party {
        Party::new(name, Ed25519KeyPair::from_seed(&[seed; 32]).public_key())
    }

    #[test]
    fn resolve_is_case_insensitive() {
        let mut dir = IdentityDirectory::new();
        dir.register(party("HDFC", 1));
        assert_eq!(dir.resolve("hdfc").unwrap().name.as_str(), "HDFC");
        assert!(dir.resolve("unknown-bank").is_none());
    }

    #[test]
    fn peers_excludes_self() {
        let mut dir = IdentityDirectory::new();
        dir.register(party("HDFC", 1));
        dir.register(party("ICICI", 2));
        let peers = dir.peers(&PartyName::new("HDFC"));
        assert_eq!(peers, vec![PartyName::new("ICICI")]);
    }
}
