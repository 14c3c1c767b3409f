//! # The Accepting Role
//!
//! The counter-side of a negotiation. The acceptor never trusts the
//! initiator's transaction bytes: it re-derives the full payload from the
//! proposed state through the public builder, runs the clause engine over
//! its own derivation, and only then signs. A proposal that violates a
//! contract rule dies here, before any signature exists.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, instrument, warn};

use kyc_contract::{build_agreement, verify_transaction, Party, TransactionId};
use kyc_core::TimeWindow;
use kyc_crypto::Ed25519KeyPair;
use kyc_ledger::Vault;

use crate::error::{FlowError, FlowOutcome};
use crate::message::FlowMessage;
use crate::session::Session;
use crate::stage::{AcceptorStage, StageTracker};

/// One accepting negotiation instance.
pub struct AcceptorFlow {
    counterparty: Party,
    keypair: Arc<Ed25519KeyPair>,
    vault: Arc<Vault>,
    session: Session,
    timeout: Duration,
    stages: StageTracker<AcceptorStage>,
}

impl AcceptorFlow {
    /// Assemble a flow instance for a session opened by `counterparty`.
    pub fn new(
        counterparty: Party,
        keypair: Arc<Ed25519KeyPair>,
        vault: Arc<Vault>,
        session: Session,
        timeout: Duration,
    ) -> Self {
        Self {
            counterparty,
            keypair,
            vault,
            session,
            timeout,
            stages: StageTracker::new(AcceptorStage::ReceivingProposal),
        }
    }

    /// Subscribe to this flow's stage transitions.
    pub fn stages(&self) -> tokio::sync::watch::Receiver<AcceptorStage> {
        self.stages.subscribe()
    }

    /// Run the negotiation to its terminal outcome.
    #[instrument(skip(self), fields(session = %self.session.id(), counterparty = %self.counterparty))]
    pub async fn run(mut self) -> FlowOutcome {
        let outcome = FlowOutcome::capture(self.call().await);
        info!(%outcome, "acceptor finished");
        outcome
    }

    async fn call(&mut self) -> Result<TransactionId, FlowError> {
        // RECEIVING: suspend until the opening proposal arrives.
        self.stages.set(AcceptorStage::ReceivingProposal);
        let proposal = match self.session.receive(self.timeout).await? {
            FlowMessage::Proposal(p) => p,
            other => {
                warn!(kind = other.kind(), "wrong message at session open");
                return Err(FlowError::UnexpectedMessage {
                    expected: "Proposal",
                });
            }
        };
        let notary = proposal.notary.clone();

        // GENERATING: re-derive the payload ourselves and pin a fresh
        // validity window centred on our clock. The clause engine runs
        // over our derivation, never over initiator-supplied bytes, and
        // it runs before we sign anything.
        self.stages.set(AcceptorStage::GeneratingTransaction);
        let proposed_state = proposal.state.clone();
        let payload = build_agreement(proposal.state, notary.clone(), proposal.attachment)
            .with_time_window(TimeWindow::around_now());
        verify_transaction(&payload)?;
        if proposed_state.buyer.key != self.counterparty.key {
            return Err(FlowError::SignatureInvalid(
                "proposal does not originate from the session counterparty".into(),
            ));
        }
        if proposed_state.seller.key != self.keypair.public_key() {
            return Err(FlowError::SignatureInvalid(
                "proposal does not name this node as the attesting party".into(),
            ));
        }

        // SIGNING: our signature over the transaction id.
        self.stages.set(AcceptorStage::Signing);
        let stx = payload.sign(&self.keypair)?;
        let our_id = stx.id()?;

        // EXCHANGING: return the partial transaction, then suspend until
        // the notarized one comes back.
        self.stages.set(AcceptorStage::Exchanging);
        self.session.send(FlowMessage::PartiallySigned(stx)).await?;
        let ntx = match self.session.receive(self.timeout).await? {
            FlowMessage::Notarized(ntx) => ntx,
            other => {
                warn!(kind = other.kind(), "wrong message at finalization");
                return Err(FlowError::UnexpectedMessage {
                    expected: "Notarized",
                });
            }
        };

        // VERIFYING: the finalized transaction must be the one we signed,
        // now carrying all three signatures, and must still verify.
        self.stages.set(AcceptorStage::Verifying);
        if ntx.id()? != our_id {
            return Err(FlowError::SignatureInvalid(
                "finalized transaction does not match the transaction we signed".into(),
            ));
        }
        ntx.verify_signatures(&[
            self.counterparty.key,
            self.keypair.public_key(),
            notary.key,
        ])?;
        verify_transaction(&ntx.payload)?;

        // RECORDING: our own durable copy.
        self.stages.set(AcceptorStage::Recording);
        self.vault.record(&ntx)?;

        Ok(our_id)
    }
}
