//! # Nodes and the In-Process Network
//!
//! A `Network` hosts the shared services every node sees: the identity
//! directory, at most one notary, and the attachment store. A `Node` is
//! one party's endpoint: its signing key, its vault, and the service
//! entry points that launch negotiations.
//!
//! Sessions here are in-process channel pairs. The flow logic is
//! transport-agnostic; a wire transport slots in behind `Session` without
//! touching either role's state machine.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, Weak};
use std::time::Duration;

use tracing::{debug, warn};

use kyc_contract::{KycRecord, LedgerState, Party};
use kyc_core::PartyName;
use kyc_crypto::{AttachmentId, AttachmentStore, Ed25519KeyPair, InMemoryAttachmentStore};
use kyc_ledger::{IdentityDirectory, NotaryService, SimpleNotary, Vault};

use crate::acceptor::AcceptorFlow;
use crate::error::{FlowError, FlowOutcome};
use crate::initiator::InitiatorFlow;
use crate::session::session_pair;

/// How long a flow waits at each receive point before giving up.
pub const DEFAULT_FLOW_TIMEOUT: Duration = Duration::from_secs(5);

/// The shared services of one in-process network.
pub struct Network {
    directory: RwLock<IdentityDirectory>,
    notary: Option<Arc<dyn NotaryService>>,
    attachments: Arc<InMemoryAttachmentStore>,
    nodes: RwLock<HashMap<String, Arc<Node>>>,
}

impl Network {
    /// A network with one notary registered under `notary_name`.
    pub fn new(notary_name: impl Into<String>) -> Arc<Self> {
        let notary = SimpleNotary::new(notary_name);
        let mut directory = IdentityDirectory::new();
        directory.register(notary.identity());
        Arc::new(Self {
            directory: RwLock::new(directory),
            notary: Some(Arc::new(notary)),
            attachments: Arc::new(InMemoryAttachmentStore::new()),
            nodes: RwLock::new(HashMap::new()),
        })
    }

    /// A degenerate network with no notary. Every negotiation on it
    /// fails at construction with a no-notary outcome.
    pub fn without_notary() -> Arc<Self> {
        Arc::new(Self {
            directory: RwLock::new(IdentityDirectory::new()),
            notary: None,
            attachments: Arc::new(InMemoryAttachmentStore::new()),
            nodes: RwLock::new(HashMap::new()),
        })
    }

    /// Bring up a node under `name` with a freshly generated signing key
    /// and register its identity with the directory.
    pub fn add_node(self: &Arc<Self>, name: impl Into<String>) -> Arc<Node> {
        let name = name.into();
        let keypair = Arc::new(Ed25519KeyPair::generate());
        let party = Party::new(name.clone(), keypair.public_key());
        let node = Arc::new(Node {
            party: party.clone(),
            keypair,
            vault: Arc::new(Vault::new()),
            network: Arc::downgrade(self),
        });
        self.directory
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .register(party);
        self.nodes
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(name.to_lowercase(), Arc::clone(&node));
        node
    }

    /// The notary, when this network has one.
    pub fn lookup_notary(&self) -> Option<Arc<dyn NotaryService>> {
        self.notary.clone()
    }

    /// The network-wide attachment store.
    pub fn attachments(&self) -> Arc<InMemoryAttachmentStore> {
        Arc::clone(&self.attachments)
    }

    fn resolve(&self, name: &str) -> Option<Party> {
        self.directory
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .resolve(name)
    }

    fn node(&self, name: &str) -> Option<Arc<Node>> {
        self.nodes
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&name.to_lowercase())
            .cloned()
    }
}

/// One party's endpoint on the network.
pub struct Node {
    party: Party,
    keypair: Arc<Ed25519KeyPair>,
    vault: Arc<Vault>,
    network: Weak<Network>,
}

impl Node {
    /// This node's registered identity.
    pub fn party(&self) -> &Party {
        &self.party
    }

    /// This node's vault.
    pub fn vault(&self) -> &Vault {
        &self.vault
    }

    /// All registered party names other than our own.
    pub fn peers(&self) -> Vec<PartyName> {
        match self.network.upgrade() {
            Some(network) => network
                .directory
                .read()
                .unwrap_or_else(|e| e.into_inner())
                .peers(&self.party.name),
            None => Vec::new(),
        }
    }

    /// Negotiate a KYC record onto the ledger with `counterparty_name`
    /// as the attesting party.
    pub async fn create_kyc(&self, record: KycRecord, counterparty_name: &str) -> FlowOutcome {
        self.negotiate(record, counterparty_name, None).await
    }

    /// As [`create_kyc`](Self::create_kyc), with the supporting document
    /// hashed and uploaded first so its content address rides inside the
    /// transaction.
    pub async fn create_kyc_with_attachment(
        &self,
        record: KycRecord,
        counterparty_name: &str,
        document: &[u8],
    ) -> FlowOutcome {
        let Some(network) = self.network.upgrade() else {
            return FlowOutcome::capture(Err(FlowError::Unreachable));
        };
        let attachment = network.attachments.upload(document);
        self.negotiate(record, counterparty_name, Some(attachment))
            .await
    }

    async fn negotiate(
        &self,
        record: KycRecord,
        counterparty_name: &str,
        attachment: Option<AttachmentId>,
    ) -> FlowOutcome {
        let Some(network) = self.network.upgrade() else {
            return FlowOutcome::capture(Err(FlowError::Unreachable));
        };

        // Unknown counterparty is caller-correctable input: reject it
        // here, before any flow instance exists.
        let (counterparty, peer) = match (
            network.resolve(counterparty_name),
            network.node(counterparty_name),
        ) {
            (Some(party), Some(node)) => (party, node),
            _ => {
                return FlowOutcome::capture(Err(FlowError::InputRejected(
                    counterparty_name.to_string(),
                )));
            }
        };

        let state = match LedgerState::issue(record, self.party.clone(), counterparty.clone()) {
            Ok(state) => state,
            Err(e) => return FlowOutcome::capture(Err(e.into())),
        };

        let (initiator_session, acceptor_session) = session_pair();
        let acceptor = AcceptorFlow::new(
            self.party.clone(),
            Arc::clone(&peer.keypair),
            Arc::clone(&peer.vault),
            acceptor_session,
            DEFAULT_FLOW_TIMEOUT,
        );
        let acceptor_task = tokio::spawn(acceptor.run());

        let initiator = InitiatorFlow::new(
            state,
            counterparty,
            network.lookup_notary(),
            attachment,
            Arc::clone(&self.keypair),
            Arc::clone(&self.vault),
            initiator_session,
            DEFAULT_FLOW_TIMEOUT,
        );
        let outcome = initiator.run().await;

        match acceptor_task.await {
            Ok(acceptor_outcome) => debug!(%acceptor_outcome, "acceptor resolved"),
            Err(e) => warn!(error = %e, "acceptor task aborted"),
        }

        outcome
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node").field("party", &self.party).finish()
    }
}
