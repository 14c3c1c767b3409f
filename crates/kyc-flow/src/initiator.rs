//! # The Initiating Role
//!
//! Drives a negotiation from proposal to recorded transaction. The
//! stages run strictly in order; the flow suspends at its two network
//! boundaries (awaiting the counter-signed transaction, and — inside the
//! notary service — awaiting finalization) and resumes only on matching
//! session delivery.
//!
//! Any error at any stage is captured into the terminal outcome; callers
//! never see a raw fault. Nothing is retried automatically — a failed
//! negotiation is re-initiated, if at all, as a fresh instance.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, instrument, warn};

use kyc_contract::{verify_transaction, LedgerState, Party, TransactionId};
use kyc_crypto::{AttachmentId, Ed25519KeyPair};
use kyc_ledger::{NotaryService, Vault};

use crate::error::{FlowError, FlowOutcome};
use crate::message::{FlowMessage, ProposalMessage};
use crate::session::Session;
use crate::stage::{InitiatorStage, StageTracker};

/// One initiating negotiation instance.
pub struct InitiatorFlow {
    state: LedgerState,
    counterparty: Party,
    notary: Option<Arc<dyn NotaryService>>,
    attachment: Option<AttachmentId>,
    keypair: Arc<Ed25519KeyPair>,
    vault: Arc<Vault>,
    session: Session,
    timeout: Duration,
    stages: StageTracker<InitiatorStage>,
}

impl InitiatorFlow {
    /// Assemble a flow instance. `notary` is the result of the network
    /// map lookup; `None` resolves to a fatal no-notary failure once the
    /// flow runs.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        state: LedgerState,
        counterparty: Party,
        notary: Option<Arc<dyn NotaryService>>,
        attachment: Option<AttachmentId>,
        keypair: Arc<Ed25519KeyPair>,
        vault: Arc<Vault>,
        session: Session,
        timeout: Duration,
    ) -> Self {
        Self {
            state,
            counterparty,
            notary,
            attachment,
            keypair,
            vault,
            session,
            timeout,
            stages: StageTracker::new(InitiatorStage::ConstructingOffer),
        }
    }

    /// Subscribe to this flow's stage transitions.
    pub fn stages(&self) -> tokio::sync::watch::Receiver<InitiatorStage> {
        self.stages.subscribe()
    }

    /// Run the negotiation to its terminal outcome.
    #[instrument(skip(self), fields(session = %self.session.id(), counterparty = %self.counterparty))]
    pub async fn run(mut self) -> FlowOutcome {
        let outcome = FlowOutcome::capture(self.call().await);
        info!(%outcome, "initiator finished");
        outcome
    }

    async fn call(&mut self) -> Result<TransactionId, FlowError> {
        // CONSTRUCTING: bind the notary and, if present, the attachment
        // into the proposal.
        self.stages.set(InitiatorStage::ConstructingOffer);
        let notary = self.notary.clone().ok_or(FlowError::NoNotaryAvailable)?;
        let notary_identity = notary.identity();
        let proposal = ProposalMessage {
            state: self.state.clone(),
            notary: notary_identity.clone(),
            attachment: self.attachment,
        };

        // OFFERING: send, then suspend until the counter-signed
        // transaction arrives.
        self.stages.set(InitiatorStage::SendingOffer);
        self.session.send(FlowMessage::Proposal(proposal)).await?;
        let ptx = match self.session.receive(self.timeout).await? {
            FlowMessage::PartiallySigned(stx) => stx,
            other => {
                warn!(kind = other.kind(), "wrong message at offer exchange");
                return Err(FlowError::UnexpectedMessage {
                    expected: "PartiallySigned",
                });
            }
        };

        // VERIFYING: counterparty signature, expected notary, and the
        // full clause composition. The acceptor re-derived the payload,
        // so confirm it still carries exactly what we proposed.
        self.stages.set(InitiatorStage::Verifying);
        ptx.verify_signatures(&[self.counterparty.key])?;
        if ptx.payload.notary.key != notary_identity.key {
            return Err(FlowError::SignatureInvalid(
                "transaction names an unexpected notary".into(),
            ));
        }
        if ptx.payload.outputs.as_slice() != std::slice::from_ref(&self.state) {
            return Err(FlowError::SignatureInvalid(
                "returned transaction does not carry the proposed state".into(),
            ));
        }
        if ptx.payload.attachment != self.attachment {
            return Err(FlowError::SignatureInvalid(
                "returned transaction does not carry the proposed attachment".into(),
            ));
        }
        verify_transaction(&ptx.payload)?;

        // SIGNING: co-sign over the transaction id.
        self.stages.set(InitiatorStage::Signing);
        let vtx = ptx.plus_signature(&self.keypair)?;

        // NOTARIZING: rejection here is a genuine conflict or stale
        // window; fatal, never retried.
        self.stages.set(InitiatorStage::Notarizing);
        let ntx = notary.notarize(&vtx)?;

        // RECORDING: storage failure is surfaced, not swallowed.
        self.stages.set(InitiatorStage::Recording);
        self.vault.record(&ntx)?;
        let tx_id = ntx.id()?;

        // FINALIZING: fire-and-forget; the acceptor records on its side
        // and we do not block on an acknowledgement.
        self.stages.set(InitiatorStage::SendingFinal);
        if let Err(e) = self.session.send(FlowMessage::Notarized(ntx)).await {
            warn!(error = %e, "counterparty unreachable for final transaction");
        }

        Ok(tx_id)
    }
}
